//! Worker configuration.

use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of claim->process loops this instance runs
    pub concurrency: usize,
    /// Expiry for presigned download URLs
    pub presign_ttl: Duration,
    /// Key prefix for converted objects
    pub storage_prefix: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            presign_ttl: Duration::from_secs(3600), // 1 hour
            storage_prefix: "conversions".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            concurrency: std::env::var("WORKER_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            presign_ttl: Duration::from_secs(
                std::env::var("PRESIGN_TTL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
            storage_prefix: std::env::var("STORAGE_PREFIX")
                .unwrap_or_else(|_| "conversions".to_string()),
        }
    }
}
