//! Conversion pipeline worker.
//!
//! Claims jobs from the shared job store, drives the conversion daemon and
//! the object store, and records the terminal state. The ephemeral input
//! file is deleted on every exit path.

pub mod config;
pub mod error;
pub mod executor;
pub mod processor;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::WorkerExecutor;
pub use processor::{process_job, ProcessingContext};
