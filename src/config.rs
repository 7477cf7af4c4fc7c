use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,

    // Database
    pub database_url: String,
    pub database_pool_size: u32,

    pub cors_allow_origin: String,

    // Image builder
    pub builder_url: String,
    /// Base URL handed out to clients in download links. Falls back to `builder_url`.
    pub builder_public_url: String,
    pub builder_timeout_secs: u64,

    // Filesystem
    pub shared_dir: PathBuf,
    pub predefined_iso_dir: PathBuf,
    pub static_dir: PathBuf,

    pub download_mode: DownloadMode,
    pub max_upload_mb: usize,
}

/// How `GET /api/configurations/{id}/download-iso` hands out predefined images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    /// Stream the image from `predefined_iso_dir`.
    Local,
    /// Redirect to the builder's download path.
    Redirect,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,

            database_url: "sqlite://osmaker.db".to_string(),
            database_pool_size: 10,

            cors_allow_origin: "*".to_string(),

            builder_url: "http://localhost:5001".to_string(),
            builder_public_url: "http://localhost:5001".to_string(),
            builder_timeout_secs: 300,

            shared_dir: PathBuf::from("./shared"),
            predefined_iso_dir: PathBuf::from("./iso"),
            static_dir: PathBuf::from("./build"),

            download_mode: DownloadMode::Redirect,
            max_upload_mb: 20,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let mut config = Config::default();

        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }

        if let Ok(port) = env::var("PORT") {
            config.port = port.parse().map_err(|e| format!("Invalid port: {}", e))?;
        }

        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = url;
        }

        if let Ok(size) = env::var("DATABASE_POOL_SIZE") {
            config.database_pool_size = size
                .parse()
                .map_err(|e| format!("Invalid database_pool_size: {}", e))?;
        }

        if let Ok(origin) = env::var("CORS_ALLOW_ORIGIN") {
            config.cors_allow_origin = origin;
        }

        if let Ok(url) = env::var("BUILDER_URL") {
            config.builder_url = url.trim_end_matches('/').to_string();
        }

        // Public URL defaults to whatever the internal URL ended up as
        config.builder_public_url = match env::var("BUILDER_PUBLIC_URL") {
            Ok(url) => url.trim_end_matches('/').to_string(),
            Err(_) => config.builder_url.clone(),
        };

        if let Ok(timeout) = env::var("BUILDER_TIMEOUT_SECS") {
            config.builder_timeout_secs = timeout
                .parse()
                .map_err(|e| format!("Invalid builder_timeout_secs: {}", e))?;
        }

        if let Ok(dir) = env::var("SHARED_DIR") {
            config.shared_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = env::var("PREDEFINED_ISO_DIR") {
            config.predefined_iso_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = env::var("STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }

        if let Ok(mode) = env::var("DOWNLOAD_MODE") {
            config.download_mode = match mode.to_lowercase().as_str() {
                "local" => DownloadMode::Local,
                "redirect" => DownloadMode::Redirect,
                _ => return Err(format!("Invalid download mode: {}", mode)),
            };
        }

        if let Ok(max_upload) = env::var("MAX_UPLOAD_MB") {
            config.max_upload_mb = max_upload
                .parse()
                .map_err(|e| format!("Invalid max_upload_mb: {}", e))?;
        }

        Ok(config)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}
