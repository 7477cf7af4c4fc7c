//! Client for the external image builder.
//! The builder receives package lists and wallpapers, assembles ISOs and
//! publishes them under `/download-iso/{predefined|target}/{filename}`.
use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::error::{AppError, AppResult};
use crate::services::storage::StoredFile;

pub const PREDEFINED_KIND: &str = "predefined";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateIsoResponse {
    #[serde(default, alias = "filename")]
    pub iso_filename: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Result of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedIso {
    pub target: String,
    pub iso_filename: String,
}

#[async_trait]
pub trait IsoBuilder: Send + Sync {
    async fn upload_wallpaper(&self, file: &StoredFile) -> AppResult<()>;

    async fn upload_packages(&self, file: &StoredFile) -> AppResult<()>;

    async fn generate_iso(&self, target: &str) -> AppResult<GeneratedIso>;
}

#[derive(Debug, Clone)]
pub struct HttpIsoBuilder {
    client: Client,
    base_url: String,
}

impl HttpIsoBuilder {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn upload(&self, path: &str, field: &str, file: &StoredFile) -> AppResult<()> {
        let url = format!("{}/{}", self.base_url, path);
        let data = tokio::fs::read(&file.path).await?;

        let part = multipart::Part::bytes(data)
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;
        let form = multipart::Form::new().part(field.to_string(), part);

        let response = self.client.post(&url).multipart(form).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response).await;
            tracing::error!("Builder rejected {} upload ({}): {}", field, status, detail);
            return Err(AppError::Builder(format!(
                "Failed to upload {} to builder ({}): {}",
                field, status, detail
            )));
        }

        tracing::info!("Uploaded {} {} to builder", field, file.file_name);
        Ok(())
    }
}

#[async_trait]
impl IsoBuilder for HttpIsoBuilder {
    async fn upload_wallpaper(&self, file: &StoredFile) -> AppResult<()> {
        self.upload("upload-wallpaper", "wallpaper", file).await
    }

    async fn upload_packages(&self, file: &StoredFile) -> AppResult<()> {
        self.upload("upload-package", "package", file).await
    }

    async fn generate_iso(&self, target: &str) -> AppResult<GeneratedIso> {
        let url = format!("{}/generate-iso/{}", self.base_url, target);
        tracing::info!("Requesting ISO build for {}", target);

        let response = self.client.post(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response).await;
            tracing::error!("Builder failed to generate {} ({}): {}", target, status, detail);
            return Err(AppError::Builder(detail));
        }

        let text = response.text().await?;
        let body: GenerateIsoResponse = serde_json::from_str(&text).unwrap_or_default();

        if let Some(ref message) = body.message {
            tracing::info!("Builder says for {}: {}", target, message);
        }

        if let Some(error) = body.error.filter(|e| !e.trim().is_empty()) {
            tracing::error!("Builder reported an error for {}: {}", target, error);
            return Err(AppError::Builder(error));
        }

        let iso_filename = body
            .iso_filename
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("{}.iso", target));

        Ok(GeneratedIso {
            target: target.to_string(),
            iso_filename,
        })
    }
}

/// Prefers the builder's JSON `error`/`detail`/`message` field, falling back to the raw body.
async fn error_detail(response: Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    let from_json = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|value| {
            ["error", "detail", "message"]
                .iter()
                .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        });

    match from_json {
        Some(detail) => detail,
        None if !text.trim().is_empty() => text.trim().to_string(),
        None => format!("Builder returned {}", status),
    }
}

/// `{public_base}/download-iso/{kind}/{filename}` with each segment percent-encoded.
pub fn download_iso_url(public_base: &str, kind: &str, filename: &str) -> AppResult<String> {
    let mut url = Url::parse(public_base)
        .map_err(|e| AppError::Internal(format!("Invalid builder URL {}: {}", public_base, e)))?;

    url.path_segments_mut()
        .map_err(|_| AppError::Internal(format!("Invalid builder URL {}", public_base)))?
        .pop_if_empty()
        .extend(["download-iso", kind, filename]);

    Ok(url.to_string())
}
