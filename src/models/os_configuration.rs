use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Distributions the builder knows how to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
    Ubuntu,
    Arch,
}

impl OperatingSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingSystem::Ubuntu => "ubuntu",
            OperatingSystem::Arch => "arch",
        }
    }

    /// Builder distro key for custom builds.
    pub fn build_target(&self) -> &'static str {
        match self {
            OperatingSystem::Ubuntu => "custom-ubuntu",
            OperatingSystem::Arch => "custom-arch",
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatingSystem {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ubuntu" => Ok(OperatingSystem::Ubuntu),
            "arch" | "arch-linux" | "archlinux" => Ok(OperatingSystem::Arch),
            _ => Err(AppError::UnsupportedOs(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigType {
    Predefined,
    Custom,
}

impl ConfigType {
    /// Anything other than `Predefined` goes down the custom path.
    pub fn from_submission(value: &str) -> Self {
        if value == "Predefined" {
            ConfigType::Predefined
        } else {
            ConfigType::Custom
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigType::Predefined => "Predefined",
            ConfigType::Custom => "Custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredefinedType {
    Minimal,
    Standard,
    Workstation,
    #[serde(rename = "RAM-Efficient")]
    RamEfficient,
}

impl PredefinedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredefinedType::Minimal => "Minimal",
            PredefinedType::Standard => "Standard",
            PredefinedType::Workstation => "Workstation",
            PredefinedType::RamEfficient => "RAM-Efficient",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            PredefinedType::Minimal => "minimal",
            PredefinedType::Standard => "standard",
            PredefinedType::Workstation => "workstation",
            PredefinedType::RamEfficient => "ram-efficient",
        }
    }
}

impl FromStr for PredefinedType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minimal" => Ok(PredefinedType::Minimal),
            "standard" => Ok(PredefinedType::Standard),
            "workstation" => Ok(PredefinedType::Workstation),
            "ram-efficient" | "ram_efficient" | "ramefficient" => Ok(PredefinedType::RamEfficient),
            _ => Err(AppError::Validation(format!(
                "Unknown predefined configuration type: {}",
                s
            ))),
        }
    }
}

/// Stored row. `packages` is a JSON array kept as text.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OsConfiguration {
    pub id: i64,
    pub operating_system: String,
    pub config_type: String,
    pub configuration_type: Option<String>,
    pub packages: String,
    pub has_custom_wallpaper: bool,
    pub download_iso_url: Option<String>,
    pub created_at: i64,
}

impl OsConfiguration {
    pub fn package_list(&self) -> Vec<String> {
        serde_json::from_str(&self.packages).unwrap_or_default()
    }

    pub fn is_predefined(&self) -> bool {
        ConfigType::from_submission(&self.config_type) == ConfigType::Predefined
    }
}

/// Values persisted for one successful submission.
#[derive(Debug, Clone)]
pub struct NewOsConfiguration {
    pub operating_system: OperatingSystem,
    pub config_type: ConfigType,
    pub configuration_type: Option<String>,
    pub packages: Vec<String>,
    pub has_custom_wallpaper: bool,
    pub download_iso_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigurationDetails {
    #[serde(rename = "type", default)]
    pub config_type: Option<String>,
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub has_custom_wallpaper: bool,
}

/// Body of `POST /api/configurations/submit`, or the `config` field of its multipart form.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigurationSubmission {
    pub operating_system: String,
    pub config_type: String,
    #[serde(default)]
    pub configuration: ConfigurationDetails,
}

#[derive(Debug, Serialize)]
pub struct ConfigurationResponse {
    pub id: i64,
    pub operating_system: String,
    pub config_type: String,
    pub configuration: ConfigurationDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_iso_url: Option<String>,
}

/// Listing shape with `packages` parsed back into a list.
#[derive(Debug, Serialize)]
pub struct OsConfigurationModel {
    pub id: i64,
    pub operating_system: String,
    pub config_type: String,
    pub configuration_type: Option<String>,
    pub packages: Vec<String>,
    pub has_custom_wallpaper: bool,
    pub download_iso_url: Option<String>,
    pub created_at: i64,
}

impl From<OsConfiguration> for OsConfigurationModel {
    fn from(record: OsConfiguration) -> Self {
        let packages = record.package_list();
        OsConfigurationModel {
            id: record.id,
            operating_system: record.operating_system,
            config_type: record.config_type,
            configuration_type: record.configuration_type,
            packages,
            has_custom_wallpaper: record.has_custom_wallpaper,
            download_iso_url: record.download_iso_url,
            created_at: record.created_at,
        }
    }
}
