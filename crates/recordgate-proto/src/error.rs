//! Proto error types.

use thiserror::Error;

/// Errors raised while parsing or (de)serializing proto types.
#[derive(Debug, Error)]
pub enum Error {
    /// Serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Action name not recognised.
    #[error("unknown action: {0}")]
    UnknownAction(String),
}
