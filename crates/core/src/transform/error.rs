//! Error types for the transform module.

use thiserror::Error;

/// Errors that can occur while transforming an uploaded file.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The form carried no file under the expected field.
    #[error("No file uploaded")]
    MissingFile,

    /// Resize was requested without a width or a height.
    #[error("At least one dimension (width or height) is required")]
    MissingDimensions,

    /// Convert was requested without a concrete target format.
    #[error("Target format is required")]
    MissingTargetFormat,

    /// The codec could not read the input bytes.
    #[error("Failed to decode image: {reason}")]
    Decode { reason: String },

    /// The codec could not resize the decoded image.
    #[error("Failed to resize image: {reason}")]
    Resize { reason: String },

    /// The codec could not encode the output image.
    #[error("Failed to encode image: {reason}")]
    Encode { reason: String },

    /// The document library could not load or save the PDF.
    #[error("Failed to process document: {reason}")]
    Document { reason: String },

    /// The blocking worker running the codec panicked or was cancelled.
    #[error("Transform worker failed: {0}")]
    Worker(String),
}

impl TransformError {
    /// Creates a new decode error.
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// Creates a new resize error.
    pub fn resize(reason: impl Into<String>) -> Self {
        Self::Resize {
            reason: reason.into(),
        }
    }

    /// Creates a new encode error.
    pub fn encode(reason: impl Into<String>) -> Self {
        Self::Encode {
            reason: reason.into(),
        }
    }

    /// Creates a new document error.
    pub fn document(reason: impl Into<String>) -> Self {
        Self::Document {
            reason: reason.into(),
        }
    }

    /// Whether this error is caused by the request rather than by processing.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingFile | Self::MissingDimensions | Self::MissingTargetFormat
        )
    }
}
