//! Error types for sockline-core.

use thiserror::Error;

/// Codec error types.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message has no timestamp; stamp it before encoding")]
    MissingTimestamp,
}

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
