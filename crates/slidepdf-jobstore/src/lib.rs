//! Redis-backed job store shared by the gateway and every worker.
//!
//! This crate provides:
//! - Durable per-job records (one Redis hash per job)
//! - A pending list drained by workers via an atomic claim
//! - Compare-and-set state transitions that never revert a terminal state
//!
//! Known limitation, kept on purpose: a worker that crashes mid-processing
//! leaves its job `processing` forever, and terminal records are never
//! expired. There is no reclaim or TTL mechanism.

pub mod config;
pub mod error;
pub mod store;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use store::JobStore;
