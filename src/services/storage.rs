use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::AppResult;

/// A file written to the shared directory, ready to be forwarded to the builder.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: String,
}

/// Directory shared with the image builder. Every submission gets its own file names.
#[derive(Debug, Clone)]
pub struct SharedStorage {
    root: PathBuf,
}

impl SharedStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SharedStorage { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn save_wallpaper(
        &self,
        submission_id: Uuid,
        original_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> AppResult<StoredFile> {
        let file_name = format!("{}-{}", submission_id, sanitize_file_name(original_name));
        let path = self.write("wallpapers", &file_name, data).await?;

        tracing::info!("Stored wallpaper {} ({} bytes)", path.display(), data.len());

        Ok(StoredFile {
            path,
            file_name,
            content_type: content_type.to_string(),
        })
    }

    /// Writes one package name per line.
    pub async fn save_packages(
        &self,
        submission_id: Uuid,
        packages: &[String],
    ) -> AppResult<StoredFile> {
        let file_name = format!("{}-packages.txt", submission_id);
        let mut contents = packages.join("\n");
        contents.push('\n');
        let path = self.write("packages", &file_name, contents.as_bytes()).await?;

        tracing::info!("Stored package list {} ({} packages)", path.display(), packages.len());

        Ok(StoredFile {
            path,
            file_name,
            content_type: "text/plain".to_string(),
        })
    }

    async fn write(&self, subdir: &str, file_name: &str, data: &[u8]) -> AppResult<PathBuf> {
        let dir = self.root.join(subdir);
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(file_name);
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }
}

/// Keeps only the final path component and replaces anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "wallpaper".to_string()
    } else {
        cleaned.to_string()
    }
}
