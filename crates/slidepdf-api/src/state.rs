//! Application state.

use std::sync::Arc;

use slidepdf_jobstore::JobStore;

use crate::config::ApiConfig;

/// Shared application state.
///
/// Clients are constructed once at startup and injected here; handlers only
/// ever see this state, never module-level singletons.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<JobStore>,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = JobStore::from_env()?;

        Ok(Self {
            config,
            store: Arc::new(store),
        })
    }
}
