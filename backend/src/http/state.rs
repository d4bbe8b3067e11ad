//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::db::repository::FullRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for data access
    pub repository: Arc<dyn FullRepository>,
    /// Engine constants shared by every request
    pub config: Arc<EngineConfig>,
}

impl AppState {
    /// Create a new application state with the default engine constants.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self::with_config(repository, EngineConfig::default())
    }

    pub fn with_config(repository: Arc<dyn FullRepository>, config: EngineConfig) -> Self {
        Self {
            repository,
            config: Arc::new(config),
        }
    }
}
