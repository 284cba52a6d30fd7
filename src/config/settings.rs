//! Optional per-project settings file (`deploy.toml`).
use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

/// Name of the settings file looked up in the project root.
pub const SETTINGS_FILE: &str = "deploy.toml";

/// Project-level knobs for where things live and how they are named.
///
/// Every key is optional; a missing file yields [`Settings::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Build output directory, relative to the project root.
    pub artifact_dir: String,
    /// Environment store, relative to the project root.
    pub env_file: String,
    /// Key in the environment store holding the target base directory.
    pub base_dir_key: String,
    /// Host application namespace; the plugin folder is `.<namespace>/plugins`.
    pub namespace: String,
    /// Host-owned runtime state file preserved across link-mode deployments.
    pub backup_file: String,
    /// Empty sentinel file ensured in the artifact root.
    pub marker_file: String,
    /// Plugin manifest file name.
    pub manifest_file: String,
    /// Mode used when none is given on the command line.
    pub default_mode: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            artifact_dir: "dist".to_string(),
            env_file: ".env".to_string(),
            base_dir_key: "VAULT_PATH".to_string(),
            namespace: "obsidian".to_string(),
            backup_file: "data.json".to_string(),
            marker_file: ".hotreload".to_string(),
            manifest_file: "manifest.json".to_string(),
            default_mode: "link".to_string(),
        }
    }
}

impl Settings {
    /// Load `<project>/deploy.toml`, falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file exists but cannot be read and
    /// [`ConfigError::InvalidSettings`] if it is not valid TOML or contains
    /// unknown keys.
    pub fn load(project: &Path) -> Result<Self, ConfigError> {
        let path = project.join(SETTINGS_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        Self::parse(&content).map_err(|e| ConfigError::InvalidSettings {
            path,
            message: e.message().to_string(),
        })
    }

    /// Parse settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the TOML deserialisation error unchanged.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
