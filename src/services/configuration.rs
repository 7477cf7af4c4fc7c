//! Package resolution for submitted configurations.
//!
//! Predefined bundles come from a static table keyed by distribution and
//! bundle type. Customized lists are normalized and validated. Nothing here
//! touches the database, the filesystem or the network.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

use crate::error::{AppError, AppResult};
use crate::models::os_configuration::{OperatingSystem, PredefinedType};

const MAX_PACKAGE_NAME_LEN: usize = 128;

static PACKAGE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9+._@-]*$").expect("valid package name pattern"));

const UBUNTU_MINIMAL: &[&str] = &["ubuntu-minimal", "openssh-server", "sudo", "nano"];
const UBUNTU_STANDARD: &[&str] = &[
    "ubuntu-standard",
    "network-manager",
    "curl",
    "wget",
    "git",
    "htop",
];
const UBUNTU_WORKSTATION: &[&str] = &[
    "ubuntu-desktop",
    "firefox",
    "libreoffice",
    "vlc",
    "gnome-tweaks",
];
const UBUNTU_RAM_EFFICIENT: &[&str] = &["network-manager", "xorg", "lxqt-core", "openbox", "falkon"];

const ARCH_MINIMAL: &[&str] = &["base", "linux", "linux-firmware", "sudo", "nano"];
const ARCH_STANDARD: &[&str] = &[
    "networkmanager",
    "openssh",
    "man-db",
    "curl",
    "wget",
    "git",
    "htop",
];
const ARCH_WORKSTATION: &[&str] = &["gnome", "gdm", "firefox", "libreoffice-fresh", "vlc"];
const ARCH_RAM_EFFICIENT: &[&str] = &["networkmanager", "xorg-server", "lxqt", "openbox", "falkon"];

/// A predefined image the builder publishes under `/download-iso/predefined/`.
#[derive(Debug, Clone)]
pub struct PredefinedImage {
    pub iso_filename: String,
    pub packages: Vec<String>,
}

static PREDEFINED: Lazy<HashMap<(OperatingSystem, PredefinedType), PredefinedImage>> =
    Lazy::new(|| {
        let mut table = HashMap::new();

        for os in [OperatingSystem::Ubuntu, OperatingSystem::Arch] {
            let (minimal, standard, workstation, ram_efficient) = match os {
                OperatingSystem::Ubuntu => (
                    UBUNTU_MINIMAL,
                    UBUNTU_STANDARD,
                    UBUNTU_WORKSTATION,
                    UBUNTU_RAM_EFFICIENT,
                ),
                OperatingSystem::Arch => {
                    (ARCH_MINIMAL, ARCH_STANDARD, ARCH_WORKSTATION, ARCH_RAM_EFFICIENT)
                }
            };

            let bundles: [(PredefinedType, Vec<&[&str]>); 4] = [
                (PredefinedType::Minimal, vec![minimal]),
                (PredefinedType::Standard, vec![minimal, standard]),
                (PredefinedType::Workstation, vec![minimal, standard, workstation]),
                (PredefinedType::RamEfficient, vec![minimal, ram_efficient]),
            ];

            for (kind, layers) in bundles {
                let packages = dedup_in_order(
                    layers
                        .into_iter()
                        .flat_map(|layer| layer.iter().map(|p| p.to_string())),
                );
                table.insert(
                    (os, kind),
                    PredefinedImage {
                        iso_filename: format!("{}-{}.iso", os.as_str(), kind.slug()),
                        packages,
                    },
                );
            }
        }

        table
    });

pub struct ConfigurationService;

impl ConfigurationService {
    /// Looks up the predefined bundle for `os` and the client's `type` string.
    pub fn predefined(os: OperatingSystem, predefined_type: &str) -> AppResult<&'static PredefinedImage> {
        let kind: PredefinedType = predefined_type.parse()?;
        PREDEFINED.get(&(os, kind)).ok_or_else(|| {
            AppError::Validation(format!(
                "No predefined {} configuration for {}",
                kind.as_str(),
                os
            ))
        })
    }

    pub fn predefined_iso_filename(os: OperatingSystem, predefined_type: &str) -> AppResult<String> {
        Ok(Self::predefined(os, predefined_type)?.iso_filename.clone())
    }

    /// Trims, lowercases and de-duplicates a client package list, keeping first-seen order.
    pub fn customized_packages(packages: &[String]) -> AppResult<Vec<String>> {
        let normalized = dedup_in_order(
            packages
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty()),
        );

        if let Some(bad) = normalized
            .iter()
            .find(|p| p.len() > MAX_PACKAGE_NAME_LEN || !PACKAGE_NAME.is_match(p))
        {
            return Err(AppError::Validation(format!("Invalid package name: {}", bad)));
        }

        if normalized.is_empty() {
            return Err(AppError::Validation(
                "At least one package is required for a custom configuration".to_string(),
            ));
        }

        Ok(normalized)
    }
}

fn dedup_in_order(packages: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    packages.filter(|p| seen.insert(p.clone())).collect()
}
