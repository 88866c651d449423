//! Resource manifest parsing.
//!
//! A manifest lists the resources a game loads up front:
//!
//! ```toml
//! [[resources]]
//! id = "splash"
//! path = "Splash.png"
//!
//! [[resources]]
//! id = "missile"
//! path = "Missile.ogg"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::SourceMap;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read manifest {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate resource id '{0}'")]
    DuplicateId(String),
    #[error("resource id must not be empty (path: {0})")]
    EmptyId(String),
}

/// One `[[resources]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceEntry {
    pub id: String,
    pub path: String,
}

/// Parsed resource manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResourceManifest {
    #[serde(default)]
    pub resources: Vec<ResourceEntry>,
}

impl ResourceManifest {
    /// Parse a manifest from TOML text.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let manifest: ResourceManifest = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        let mut seen = hashbrown::HashSet::new();
        for entry in &self.resources {
            if entry.id.trim().is_empty() {
                return Err(ManifestError::EmptyId(entry.path.clone()));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(ManifestError::DuplicateId(entry.id.clone()));
            }
        }
        Ok(())
    }

    /// Build the source table for a batch, in manifest order.
    pub fn to_source_map(&self) -> SourceMap {
        self.resources
            .iter()
            .map(|entry| (entry.id.as_str(), entry.path.as_str()))
            .collect()
    }
}
