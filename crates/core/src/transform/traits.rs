//! Codec capabilities the transform service depends on.

use image::DynamicImage;

use super::error::TransformError;
use super::fit::ResizeSpec;
use super::format::OutputFormat;

/// A decoded raster image with the container format it was read from.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub pixels: DynamicImage,
    /// Label of the source container (e.g. "png"), if it could be detected.
    pub format: Option<String>,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Metadata read back from encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: String,
}

/// An image codec: decode, resize, encode.
///
/// Implementations are synchronous and CPU-bound; the service runs them on
/// the blocking pool.
pub trait ImageCodec: Send + Sync {
    /// Returns the name of this codec implementation.
    fn name(&self) -> &str;

    /// Decodes raw file bytes.
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, TransformError>;

    /// Resizes a decoded image according to the spec.
    fn resize(&self, image: DecodedImage, spec: &ResizeSpec)
        -> Result<DecodedImage, TransformError>;

    /// Encodes an image. Quality only affects lossy formats.
    fn encode(
        &self,
        image: &DecodedImage,
        format: OutputFormat,
        quality: u8,
    ) -> Result<Vec<u8>, TransformError>;

    /// Reads dimensions and container format from encoded bytes.
    fn inspect(&self, bytes: &[u8]) -> Result<ImageInfo, TransformError>;
}

/// A document library able to load and re-save a PDF.
pub trait DocumentCodec: Send + Sync {
    fn name(&self) -> &str;

    /// Loads the document and serializes it again.
    fn round_trip(&self, bytes: &[u8]) -> Result<Vec<u8>, TransformError>;
}
