//! Shared data models for the SlidePDF backend.
//!
//! This crate provides:
//! - The conversion [`Job`] record and its state machine
//! - The tagged [`JobStatusView`] returned by the status endpoint
//! - Upload filename validation

pub mod job;
pub mod status;
pub mod upload;

pub use job::{Job, JobId, JobState};
pub use status::JobStatusView;
pub use upload::{file_extension, validate_upload_filename, UploadValidationError, ALLOWED_EXTENSIONS};
