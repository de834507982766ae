//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Conversion failed: {0}")]
    Conversion(#[from] slidepdf_convert::ConvertError),

    #[error("Storage failed: {0}")]
    Storage(#[from] slidepdf_storage::StorageError),

    #[error("Job store error: {0}")]
    Store(#[from] slidepdf_jobstore::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
