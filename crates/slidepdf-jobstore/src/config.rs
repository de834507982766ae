//! Job store configuration.

use std::time::Duration;

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Redis URL
    pub redis_url: String,
    /// Key prefix for all store keys
    pub key_prefix: String,
    /// Initial sleep between empty claim polls
    pub poll_interval: Duration,
    /// Upper bound for the claim poll backoff
    pub poll_max_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            key_prefix: "slidepdf".to_string(),
            poll_interval: Duration::from_millis(100),
            poll_max_interval: Duration::from_secs(2),
        }
    }
}

impl StoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            key_prefix: std::env::var("JOB_STORE_PREFIX")
                .unwrap_or_else(|_| "slidepdf".to_string()),
            poll_interval: Duration::from_millis(
                std::env::var("JOB_STORE_POLL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(100),
            ),
            poll_max_interval: Duration::from_millis(
                std::env::var("JOB_STORE_POLL_MAX_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2000),
            ),
        }
    }
}
