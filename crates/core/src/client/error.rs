use thiserror::Error;

use crate::transform::DataUriError;

/// Errors raised while talking to the transform service.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timeout")]
    Timeout,

    #[error("{0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid artifact: {0}")]
    Artifact(#[from] DataUriError),

    #[error("{0}")]
    Other(String),
}
