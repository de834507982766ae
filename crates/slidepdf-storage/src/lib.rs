//! S3-compatible object store client (Cloudflare R2).
//!
//! This crate provides:
//! - Byte upload under a caller-computed key
//! - Presigned GET URL generation with explicit expiry
//! - Connectivity checks for readiness probes

pub mod client;
pub mod error;

pub use client::{R2Client, R2Config};
pub use error::{StorageError, StorageResult};
