//! Error types for timegraph operations.
//!
//! Query parsing and resolution are total and signal failure with `None`.
//! These errors are only produced by configuration and by the `FromStr`
//! wrappers used at program boundaries.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeGraphError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Unresolvable query: {0}")]
    Unresolvable(String),
}

pub type Result<T> = std::result::Result<T, TimeGraphError>;
