//! Shared fixtures for handler and service tests.

use actix_web::web;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::config::Config;
use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::services::builder::{GeneratedIso, IsoBuilder};
use crate::services::storage::{SharedStorage, StoredFile};
use crate::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderCall {
    Wallpaper(String),
    Packages(String),
    Generate(String),
}

/// In-process builder that records every call and can be told to fail one step.
#[derive(Default)]
pub struct RecordingBuilder {
    pub calls: Mutex<Vec<BuilderCall>>,
    pub fail_wallpaper: bool,
    pub fail_packages: bool,
    pub generate_error: Option<String>,
}

impl RecordingBuilder {
    pub fn calls(&self) -> Vec<BuilderCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl IsoBuilder for RecordingBuilder {
    async fn upload_wallpaper(&self, file: &StoredFile) -> AppResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(BuilderCall::Wallpaper(file.file_name.clone()));
        if self.fail_wallpaper {
            return Err(AppError::Builder("Failed to upload wallpaper to builder".into()));
        }
        Ok(())
    }

    async fn upload_packages(&self, file: &StoredFile) -> AppResult<()> {
        let contents = std::fs::read_to_string(&file.path)?;
        self.calls.lock().unwrap().push(BuilderCall::Packages(contents));
        if self.fail_packages {
            return Err(AppError::Builder("Failed to upload package to builder".into()));
        }
        Ok(())
    }

    async fn generate_iso(&self, target: &str) -> AppResult<GeneratedIso> {
        self.calls
            .lock()
            .unwrap()
            .push(BuilderCall::Generate(target.to_string()));
        if let Some(ref error) = self.generate_error {
            return Err(AppError::Builder(error.clone()));
        }
        Ok(GeneratedIso {
            target: target.to_string(),
            iso_filename: format!("{}-build.iso", target),
        })
    }
}

pub struct TestApp {
    pub state: web::Data<AppState>,
    pub builder: Arc<RecordingBuilder>,
    pub dir: TempDir,
}

/// State backed by an in-memory database and a temp directory for shared files and ISOs.
pub async fn test_app(builder: RecordingBuilder, configure: impl FnOnce(&mut Config)) -> TestApp {
    let dir = tempfile::tempdir().unwrap();

    let mut config = Config {
        builder_url: "http://builder.internal:5001".to_string(),
        builder_public_url: "http://builder.example.com".to_string(),
        shared_dir: dir.path().join("shared"),
        predefined_iso_dir: dir.path().join("iso"),
        static_dir: dir.path().join("build"),
        ..Config::default()
    };
    configure(&mut config);

    let builder = Arc::new(builder);
    let state = web::Data::new(AppState {
        db: Database::for_tests().await,
        storage: SharedStorage::new(config.shared_dir.clone()),
        config: Arc::new(config),
        builder: builder.clone(),
    });

    TestApp { state, builder, dir }
}
