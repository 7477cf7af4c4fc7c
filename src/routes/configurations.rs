use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::{
    http::header::{self, ContentDisposition, DispositionParam, DispositionType},
    web, HttpRequest, HttpResponse,
};
use futures::StreamExt;

use crate::config::DownloadMode;
use crate::error::{AppError, AppResult};
use crate::models::os_configuration::{ConfigurationSubmission, OsConfigurationModel};
use crate::services::builder::{download_iso_url, PREDEFINED_KIND};
use crate::services::configuration::ConfigurationService;
use crate::services::os_configuration::OsConfigurationService;
use crate::services::submission::{SubmissionService, WallpaperUpload};
use crate::AppState;

pub const RECENT_CONFIGURATIONS_LIMIT: i64 = 5;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/submit", web::post().to(submit_configuration))
        .route("/recent", web::get().to(get_recent_configurations))
        .route("/{id}/download-iso", web::get().to(download_iso));
}

// POST /submit - JSON body, or multipart with a `config` JSON field and optional `wallpaper`
async fn submit_configuration(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    let limit = state.config.max_upload_bytes();

    let (submission, wallpaper) = if is_multipart(&req) {
        read_multipart(Multipart::new(req.headers(), payload), limit).await?
    } else {
        let body = read_body(payload, limit).await?;
        (parse_submission(&body)?, None)
    };

    tracing::info!(
        "Received {} configuration for {} (wallpaper: {})",
        submission.config_type,
        submission.operating_system,
        wallpaper.is_some()
    );

    let response = SubmissionService::new(&state)
        .submit(submission, wallpaper)
        .await?;

    Ok(HttpResponse::Created().json(response))
}

// GET /recent - latest configurations, newest first
async fn get_recent_configurations(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let records = OsConfigurationService::new(&state.db)
        .get_recent(RECENT_CONFIGURATIONS_LIMIT)
        .await?;

    let response: Vec<OsConfigurationModel> =
        records.into_iter().map(OsConfigurationModel::from).collect();

    Ok(HttpResponse::Ok().json(response))
}

// GET /{id}/download-iso - predefined configurations only
async fn download_iso(
    state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let record = OsConfigurationService::new(&state.db)
        .get_by_id(id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Configuration not found.".to_string()))?;

    if !record.is_predefined() {
        return Err(AppError::BadRequest(
            "ISO download is only available for Predefined configurations.".to_string(),
        ));
    }

    let predefined_type = record.configuration_type.as_deref().ok_or_else(|| {
        AppError::Internal(format!("Configuration {} has no predefined type", record.id))
    })?;
    let filename =
        ConfigurationService::predefined_iso_filename(record.operating_system.parse()?, predefined_type)?;

    match state.config.download_mode {
        DownloadMode::Redirect => {
            let location =
                download_iso_url(&state.config.builder_public_url, PREDEFINED_KIND, &filename)?;
            tracing::info!("Redirecting configuration {} to {}", record.id, location);
            Ok(HttpResponse::Found()
                .insert_header((header::LOCATION, location))
                .finish())
        }
        DownloadMode::Local => {
            let path = state.config.predefined_iso_dir.join(&filename);
            let is_file = tokio::fs::metadata(&path)
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false);
            if !is_file {
                tracing::warn!("ISO file not found at {}", path.display());
                return Err(AppError::NotFound("ISO file not found.".to_string()));
            }

            tracing::info!("Serving {} for configuration {}", path.display(), record.id);
            let file = NamedFile::open_async(&path)
                .await?
                .set_content_type(mime::APPLICATION_OCTET_STREAM)
                .set_content_disposition(ContentDisposition {
                    disposition: DispositionType::Attachment,
                    parameters: vec![DispositionParam::Filename(filename)],
                });

            Ok(file.into_response(&req))
        }
    }
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

fn parse_submission(data: &[u8]) -> AppResult<ConfigurationSubmission> {
    serde_json::from_slice(data)
        .map_err(|e| AppError::Validation(format!("Invalid configuration: {}", e)))
}

fn too_large(limit: usize) -> AppError {
    AppError::PayloadTooLarge(format!(
        "Upload exceeds the {} MB limit",
        limit / (1024 * 1024)
    ))
}

async fn read_body(mut payload: web::Payload, limit: usize) -> AppResult<Vec<u8>> {
    let mut body = Vec::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Payload error: {}", e)))?;
        if body.len() + chunk.len() > limit {
            return Err(too_large(limit));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

async fn read_multipart(
    mut payload: Multipart,
    limit: usize,
) -> AppResult<(ConfigurationSubmission, Option<WallpaperUpload>)> {
    let mut config: Option<ConfigurationSubmission> = None;
    let mut wallpaper: Option<WallpaperUpload> = None;
    let mut total = 0usize;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;
        let field_name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(|s| s.to_string());
        let content_type = field.content_type().map(|m| m.essence_str().to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| AppError::BadRequest(format!("Chunk error: {}", e)))?;
            total += chunk.len();
            if total > limit {
                return Err(too_large(limit));
            }
            data.extend_from_slice(&chunk);
        }

        match field_name.as_str() {
            "config" => config = Some(parse_submission(&data)?),
            "wallpaper" if !data.is_empty() => {
                let file_name = filename.unwrap_or_else(|| "wallpaper".to_string());
                let content_type = content_type
                    .filter(|ct| ct != "application/octet-stream")
                    .unwrap_or_else(|| {
                        mime_guess::from_path(&file_name)
                            .first_or_octet_stream()
                            .essence_str()
                            .to_string()
                    });
                wallpaper = Some(WallpaperUpload {
                    file_name,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    let config =
        config.ok_or_else(|| AppError::Validation("config field is required".to_string()))?;
    Ok((config, wallpaper))
}
