//! Axum HTTP API gateway.
//!
//! This crate provides:
//! - Upload submission and job creation (`POST /convert`)
//! - Job status polling (`GET /status/{job_id}`)
//! - Optional API-key enforcement
//! - Prometheus metrics and health/readiness probes

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
