//! Loader configuration (loader.toml)
//!
//! Handles loading, saving, and providing defaults for asset loader settings.
//! Settings are stored in TOML format in the platform-specific config directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name of the loader configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "loader.toml";

/// Asset loader configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Directory relative asset locations are resolved against (default: ".")
    #[serde(default = "default_asset_dir")]
    pub asset_dir: PathBuf,
    /// Base URL for relative asset locations. When set, relative locations are
    /// fetched over HTTP instead of from `asset_dir`.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Sample rate decoded audio is resampled to (default: 44100)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Timeout for a single HTTP request in seconds (default: 30)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            asset_dir: default_asset_dir(),
            base_url: None,
            sample_rate: default_sample_rate(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl LoaderConfig {
    /// HTTP request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Read a configuration file, falling back to defaults if it is missing or invalid.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Write the configuration as TOML, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, content)
    }
}

fn default_asset_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_sample_rate() -> u32 {
    44_100
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\mengine\config`
/// On macOS: `~/Library/Application Support/io.mengine.mengine`
/// On Linux: `~/.config/mengine`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.mengine", "", "mengine")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from disk.
///
/// Reads `loader.toml` from the platform's configuration directory.
/// Returns default configuration if the file doesn't exist or is invalid.
pub fn load() -> LoaderConfig {
    config_dir()
        .map(|dir| LoaderConfig::load_from(&dir.join(CONFIG_FILE_NAME)))
        .unwrap_or_default()
}
