//! Client for the unoserver-compatible document conversion daemon.
//!
//! The daemon accepts a multipart request with the source file and a target
//! format, and answers with the converted bytes. A single failed call fails
//! the job; there are no retries here.

pub mod client;
pub mod error;

pub use client::{ConvertClient, ConvertConfig};
pub use error::{ConvertError, ConvertResult};
