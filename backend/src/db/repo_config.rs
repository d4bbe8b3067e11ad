//! Repository configuration file support.
//!
//! This module provides utilities for reading repository and engine
//! configuration from TOML configuration files.
//!
//! ```toml
//! [repository]
//! type = "json"
//! data_path = "data/stars.json"
//!
//! [engine]
//! proximity_threshold = 2.0
//! top_movers = 10
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::factory::RepositoryType;
use super::repository::RepositoryError;
use crate::config::EngineConfig;

/// Repository configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
    #[serde(default)]
    pub data_path: Option<PathBuf>,
}

impl RepositoryConfig {
    /// Load repository configuration from a TOML file.
    ///
    /// The `[engine]` section is validated before returning.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, RepositoryError> {
        let config: RepositoryConfig = toml::from_str(content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })?;

        config.engine.validate()?;
        Ok(config)
    }

    /// First existing `repository.toml` in the standard locations:
    /// the current directory, `backend/`, then the parent directory.
    pub fn default_location_path() -> Option<PathBuf> {
        [
            PathBuf::from("repository.toml"),
            PathBuf::from("backend/repository.toml"),
            PathBuf::from("../repository.toml"),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }

    /// Dataset path, resolved against `base_dir` when relative.
    pub fn data_path(&self, base_dir: Option<&Path>) -> Option<PathBuf> {
        let path = self.repository.data_path.as_ref()?;
        match base_dir {
            Some(base) if path.is_relative() && !base.as_os_str().is_empty() => {
                Some(base.join(path))
            }
            _ => Some(path.clone()),
        }
    }
}
