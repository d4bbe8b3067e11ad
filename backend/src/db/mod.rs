//! Data-access layer for ratings datasets.
//!
//! This module provides abstractions for data access via the Repository pattern,
//! allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (REST API, analytics services)       │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - Year snapshot assembly                               │
//! │  - Rated allow-list, organization listing               │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌──────────────────────────────────────────────┐
//!     │             Local Repository                  │
//!     │     (in-memory, optionally from a JSON file)  │
//!     └──────────────────────────────────────────────┘
//! ```
//!
//! # Recommended Usage
//!
//! ```no_run
//! use ma_stars::db::{services, RepositoryFactory, RepositoryType};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::create(RepositoryType::JsonFile, Some("data/stars.json".as_ref()))?;
//!     let years = services::list_years(repo.as_ref()).await?;
//!     Ok(())
//! }
//! ```

#[cfg(not(feature = "local-repo"))]
compile_error!("Enable at least one repository backend feature.");

pub mod checksum;
pub mod dataset;
pub mod factory;
pub mod models;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

// ==================== Service Layer ====================

pub use services::{
    dataset_info, health_check, list_organizations, list_years, load_year_snapshot,
    rated_contract_ids,
};

// ==================== Repository Pattern Exports ====================

pub use checksum::calculate_checksum;
pub use dataset::{Dataset, LoadedDataset};
pub use models::YearSnapshot;
pub use repo_config::RepositoryConfig;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
pub use repository::{
    ContractRepository, ErrorContext, FullRepository, RatingsRepository, RepositoryError,
    RepositoryResult,
};

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use crate::config::EngineConfig;

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn FullRepository>> = OnceLock::new();

/// Engine constants loaded alongside the repository.
static ENGINE_CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Locate the configuration file: `MA_STARS_CONFIG` first, then the standard locations.
fn config_path() -> Option<PathBuf> {
    std::env::var("MA_STARS_CONFIG")
        .ok()
        .map(PathBuf::from)
        .or_else(RepositoryConfig::default_location_path)
}

fn create_selected_repository() -> RepositoryResult<(Arc<dyn FullRepository>, EngineConfig)> {
    // Explicit environment selection wins over the config file.
    if std::env::var("REPOSITORY_TYPE").is_ok() || std::env::var("DATASET_PATH").is_ok() {
        let engine = match config_path() {
            Some(path) => RepositoryConfig::from_file(path)?.engine,
            None => EngineConfig::default(),
        };
        return Ok((RepositoryFactory::from_env()?, engine));
    }

    match config_path() {
        Some(path) => {
            log::info!("Using repository config {}", path.display());
            let config = RepositoryConfig::from_file(&path)?;
            let repo = RepositoryFactory::from_repository_config(&config, path.parent())?;
            Ok((repo, config.engine))
        }
        None => {
            log::warn!("No repository configuration found; starting with an empty local repository");
            Ok((RepositoryFactory::create_local(), EngineConfig::default()))
        }
    }
}

/// Initialize the global repository singleton for the selected backend.
pub fn init_repository() -> Result<()> {
    if REPOSITORY.get().is_some() {
        return Ok(());
    }

    let (repo, engine) = create_selected_repository()
        .map_err(|e| anyhow::Error::msg(e.to_string()))
        .context("Failed to initialize repository")?;
    let _ = REPOSITORY.set(repo);
    let _ = ENGINE_CONFIG.set(engine);
    Ok(())
}

/// Get a reference to the global repository instance.
pub fn get_repository() -> Result<&'static Arc<dyn FullRepository>> {
    if REPOSITORY.get().is_none() {
        init_repository()?;
    }

    REPOSITORY
        .get()
        .context("Repository not initialized. Call init_repository() first.")
}

/// Engine constants that came with the global repository (defaults if none were configured).
pub fn get_engine_config() -> &'static EngineConfig {
    ENGINE_CONFIG.get_or_init(EngineConfig::default)
}
