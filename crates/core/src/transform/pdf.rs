//! PDF re-serialization backed by `lopdf`.

use lopdf::Document;

use super::error::TransformError;
use super::traits::DocumentCodec;

/// [`DocumentCodec`] that loads a PDF with `lopdf` and saves it again.
///
/// This is a structural round trip only: streams are written back as they
/// were read and no image or stream recompression takes place.
#[derive(Debug, Clone, Default)]
pub struct LopdfCodec;

impl LopdfCodec {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentCodec for LopdfCodec {
    fn name(&self) -> &str {
        "lopdf"
    }

    fn round_trip(&self, bytes: &[u8]) -> Result<Vec<u8>, TransformError> {
        let mut document =
            Document::load_mem(bytes).map_err(|e| TransformError::document(e.to_string()))?;

        let mut output = Vec::with_capacity(bytes.len());
        document
            .save_to(&mut output)
            .map_err(|e| TransformError::document(e.to_string()))?;

        Ok(output)
    }
}
