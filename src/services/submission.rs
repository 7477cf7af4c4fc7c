//! Orchestrates one configuration submission: package resolution, the builder
//! round-trip for custom images, and the append-only record.

use uuid::Uuid;

use crate::config::Config;
use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::os_configuration::{
    ConfigType, ConfigurationDetails, ConfigurationResponse, ConfigurationSubmission,
    NewOsConfiguration, OperatingSystem, PredefinedType,
};
use crate::services::builder::{download_iso_url, IsoBuilder, PREDEFINED_KIND};
use crate::services::configuration::ConfigurationService;
use crate::services::os_configuration::OsConfigurationService;
use crate::services::storage::SharedStorage;
use crate::AppState;

/// Wallpaper file received alongside a multipart submission.
#[derive(Debug, Clone)]
pub struct WallpaperUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

pub struct SubmissionService<'a> {
    db: &'a Database,
    config: &'a Config,
    builder: &'a dyn IsoBuilder,
    storage: &'a SharedStorage,
}

impl<'a> SubmissionService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        SubmissionService {
            db: &state.db,
            config: &state.config,
            builder: state.builder.as_ref(),
            storage: &state.storage,
        }
    }

    pub async fn submit(
        &self,
        submission: ConfigurationSubmission,
        wallpaper: Option<WallpaperUpload>,
    ) -> AppResult<ConfigurationResponse> {
        let os: OperatingSystem = submission.operating_system.parse()?;

        let record = match ConfigType::from_submission(&submission.config_type) {
            ConfigType::Predefined => {
                if wallpaper.is_some() {
                    tracing::debug!("Ignoring wallpaper sent with a predefined configuration");
                }
                self.predefined(os, &submission.configuration)?
            }
            ConfigType::Custom => self.custom(os, &submission.configuration, wallpaper).await?,
        };

        let created = OsConfigurationService::new(self.db).insert(&record).await?;
        tracing::info!(
            "Stored configuration {} ({} {})",
            created.id,
            created.config_type,
            created.operating_system
        );

        Ok(ConfigurationResponse {
            id: created.id,
            operating_system: submission.operating_system,
            config_type: submission.config_type,
            configuration: ConfigurationDetails {
                config_type: record.configuration_type,
                packages: record.packages,
                has_custom_wallpaper: record.has_custom_wallpaper,
            },
            download_iso_url: record.download_iso_url,
        })
    }

    /// Predefined images already exist on the builder, so only the link is built here.
    fn predefined(
        &self,
        os: OperatingSystem,
        details: &ConfigurationDetails,
    ) -> AppResult<NewOsConfiguration> {
        let requested = details.config_type.as_deref().ok_or_else(|| {
            AppError::Validation(
                "configuration.type is required for Predefined configurations".to_string(),
            )
        })?;
        let kind: PredefinedType = requested.parse()?;
        let image = ConfigurationService::predefined(os, requested)?;
        let url = download_iso_url(
            &self.config.builder_public_url,
            PREDEFINED_KIND,
            &image.iso_filename,
        )?;

        Ok(NewOsConfiguration {
            operating_system: os,
            config_type: ConfigType::Predefined,
            configuration_type: Some(kind.as_str().to_string()),
            packages: image.packages.clone(),
            has_custom_wallpaper: false,
            download_iso_url: Some(url),
        })
    }

    async fn custom(
        &self,
        os: OperatingSystem,
        details: &ConfigurationDetails,
        wallpaper: Option<WallpaperUpload>,
    ) -> AppResult<NewOsConfiguration> {
        let target = os.build_target();
        let packages = ConfigurationService::customized_packages(&details.packages)?;
        let submission_id = Uuid::new_v4();

        let has_custom_wallpaper = wallpaper.is_some();
        if let Some(wallpaper) = wallpaper {
            if !wallpaper.content_type.starts_with("image/") {
                return Err(AppError::Validation(format!(
                    "Wallpaper must be an image, got {}",
                    wallpaper.content_type
                )));
            }
            let stored = self
                .storage
                .save_wallpaper(
                    submission_id,
                    &wallpaper.file_name,
                    &wallpaper.content_type,
                    &wallpaper.data,
                )
                .await?;
            self.builder.upload_wallpaper(&stored).await?;
        }

        let package_file = self.storage.save_packages(submission_id, &packages).await?;
        self.builder.upload_packages(&package_file).await?;

        let generated = self.builder.generate_iso(target).await?;
        let url = download_iso_url(
            &self.config.builder_public_url,
            &generated.target,
            &generated.iso_filename,
        )?;
        tracing::info!("Builder produced {} for {}", generated.iso_filename, target);

        Ok(NewOsConfiguration {
            operating_system: os,
            config_type: ConfigType::Custom,
            configuration_type: None,
            packages,
            has_custom_wallpaper,
            download_iso_url: Some(url),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_app, BuilderCall, RecordingBuilder};
    use actix_web::ResponseError;

    fn submission(os: &str, config_type: &str, details: serde_json::Value) -> ConfigurationSubmission {
        serde_json::from_value(serde_json::json!({
            "operating_system": os,
            "config_type": config_type,
            "configuration": details,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_predefined_never_calls_builder() {
        let app = test_app(RecordingBuilder::default(), |_| {}).await;
        let service = SubmissionService::new(&app.state);

        let response = service
            .submit(
                submission("ubuntu", "Predefined", serde_json::json!({ "type": "standard" })),
                None,
            )
            .await
            .unwrap();

        assert_eq!(
            response.download_iso_url.as_deref(),
            Some("http://builder.example.com/download-iso/predefined/ubuntu-standard.iso")
        );
        assert_eq!(response.configuration.config_type.as_deref(), Some("Standard"));
        assert!(response.configuration.packages.contains(&"ubuntu-standard".to_string()));
        assert!(app.builder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_custom_flow_order() {
        let app = test_app(RecordingBuilder::default(), |_| {}).await;
        let service = SubmissionService::new(&app.state);

        let wallpaper = WallpaperUpload {
            file_name: "sunset.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![0x89, b'P', b'N', b'G'],
        };
        let response = service
            .submit(
                submission(
                    "Arch-Linux",
                    "Custom",
                    serde_json::json!({ "packages": ["Vim", "git", "vim"] }),
                ),
                Some(wallpaper),
            )
            .await
            .unwrap();

        let calls = app.builder.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(&calls[0], BuilderCall::Wallpaper(name) if name.ends_with("-sunset.png")));
        assert_eq!(calls[1], BuilderCall::Packages("vim\ngit\n".to_string()));
        assert_eq!(calls[2], BuilderCall::Generate("custom-arch".to_string()));

        assert!(response.configuration.has_custom_wallpaper);
        assert_eq!(response.configuration.packages, vec!["vim", "git"]);
        assert_eq!(
            response.download_iso_url.as_deref(),
            Some("http://builder.example.com/download-iso/custom-arch/custom-arch-build.iso")
        );
    }

    #[tokio::test]
    async fn test_failed_package_upload_stops_before_build() {
        let builder = RecordingBuilder {
            fail_packages: true,
            ..Default::default()
        };
        let app = test_app(builder, |_| {}).await;
        let service = SubmissionService::new(&app.state);

        let err = service
            .submit(
                submission("ubuntu", "Custom", serde_json::json!({ "packages": ["htop"] })),
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Builder(_)));
        assert_eq!(app.builder.calls().len(), 1);

        let recent = OsConfigurationService::new(&app.state.db)
            .get_recent(5)
            .await
            .unwrap();
        assert!(recent.is_empty());
    }

    #[tokio::test]
    async fn test_failed_wallpaper_upload_stops_submission() {
        let builder = RecordingBuilder {
            fail_wallpaper: true,
            ..Default::default()
        };
        let app = test_app(builder, |_| {}).await;
        let service = SubmissionService::new(&app.state);

        let wallpaper = WallpaperUpload {
            file_name: "sunset.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![0x89, b'P', b'N', b'G'],
        };
        let err = service
            .submit(
                submission("ubuntu", "Custom", serde_json::json!({ "packages": ["htop"] })),
                Some(wallpaper),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Builder(_)));
        assert_eq!(
            err.status_code(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );

        let calls = app.builder.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(&calls[0], BuilderCall::Wallpaper(name) if name.ends_with("-sunset.png")));

        let recent = OsConfigurationService::new(&app.state.db)
            .get_recent(5)
            .await
            .unwrap();
        assert!(recent.is_empty());
    }

    #[tokio::test]
    async fn test_non_image_wallpaper_rejected() {
        let app = test_app(RecordingBuilder::default(), |_| {}).await;
        let service = SubmissionService::new(&app.state);

        let wallpaper = WallpaperUpload {
            file_name: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            data: b"hello".to_vec(),
        };
        let err = service
            .submit(
                submission("ubuntu", "Custom", serde_json::json!({ "packages": ["htop"] })),
                Some(wallpaper),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(app.builder.calls().is_empty());
    }
}
