//! Data URI encoding for inline artifacts.

use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUriError {
    #[error("Not a data URI")]
    MissingScheme,

    #[error("Data URI is not base64 encoded")]
    NotBase64,

    #[error("Invalid base64 payload: {0}")]
    InvalidPayload(String),
}

/// Encodes bytes as `data:<mime>;base64,<payload>`.
pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Splits a base64 data URI into its media type and decoded bytes.
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>), DataUriError> {
    let rest = uri.strip_prefix("data:").ok_or(DataUriError::MissingScheme)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUriError::MissingScheme)?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or(DataUriError::NotBase64)?;

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| DataUriError::InvalidPayload(e.to_string()))?;

    Ok((mime_type.to_string(), bytes))
}
