//! Repository factory for dependency injection.
//!
//! This module provides utilities for creating and configuring repository instances
//! based on runtime configuration.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Empty in-memory repository, filled programmatically
    Local,
    /// In-memory repository seeded from a JSON dataset file
    JsonFile,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string.
    ///
    /// # Arguments
    /// * `s` - String representation ("local", "json")
    ///
    /// # Returns
    /// * `Ok(RepositoryType)` if valid
    /// * `Err` if invalid
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            "json" | "file" => Ok(Self::JsonFile),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment variable.
    ///
    /// Reads `REPOSITORY_TYPE`. Without it, a set `DATASET_PATH` selects the
    /// JSON file backend, otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var("DATASET_PATH").is_ok() {
            Self::JsonFile
        } else {
            Self::Local
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```no_run
/// use ma_stars::db::{RepositoryFactory, RepositoryType};
///
/// let repo = RepositoryFactory::create(RepositoryType::JsonFile, Some("data/stars.json".as_ref()))?;
/// # Ok::<(), ma_stars::db::RepositoryError>(())
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// # Arguments
    /// * `repo_type` - Type of repository to create
    /// * `data_path` - Dataset file (required for `JsonFile`)
    pub fn create(
        repo_type: RepositoryType,
        data_path: Option<&Path>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Local => Ok(Self::create_local()),
            RepositoryType::JsonFile => {
                let path = data_path.ok_or_else(|| {
                    RepositoryError::configuration(
                        "JSON repository requires a dataset path (data_path or DATASET_PATH)",
                    )
                })?;
                Self::create_from_file(path)
            }
        }
    }

    /// Create an in-memory local repository.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create a local repository seeded from a dataset file.
    pub fn create_from_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo = LocalRepository::from_json_file(path)?;
        Ok(Arc::new(repo))
    }

    /// Create repository from environment configuration.
    ///
    /// Reads `REPOSITORY_TYPE` and `DATASET_PATH`.
    pub fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        let data_path = std::env::var("DATASET_PATH").ok().map(PathBuf::from);
        Self::create(RepositoryType::from_env(), data_path.as_deref())
    }

    /// Create repository from a TOML configuration file.
    ///
    /// Relative dataset paths are resolved against the configuration file's directory.
    pub fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config_path = config_path.as_ref();
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config, config_path.parent())
    }

    /// Create repository from a RepositoryConfig instance.
    pub fn from_repository_config(
        config: &RepositoryConfig,
        base_dir: Option<&Path>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        let data_path = config.data_path(base_dir);
        Self::create(repo_type, data_path.as_deref())
    }
}
