//! Conversion client error types.

use thiserror::Error;

pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Failed to configure conversion client: {0}")]
    ConfigError(String),

    #[error("Conversion daemon returned {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Conversion request failed: {0}")]
    Network(#[from] reqwest::Error),
}

impl ConvertError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
