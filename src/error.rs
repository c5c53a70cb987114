//! Error types for wire encoding

use thiserror::Error;

/// Errors surfaced by the `Result`-returning conveniences.
///
/// Malformed wire input is reported as a single [`WireError::Malformed`]
/// naming the entity. The underlying cause is not distinguished.
#[derive(Error, Debug)]
pub enum WireError {
    #[error("Malformed {0} encoding")]
    Malformed(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, WireError>;
