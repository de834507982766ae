//! Request handlers.

pub mod convert;
pub mod health;
pub mod status;

pub use convert::submit_conversion;
pub use health::{health, ready};
pub use status::get_status;
