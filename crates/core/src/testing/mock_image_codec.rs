//! Mock image codec for testing.

use std::sync::Mutex;

use image::DynamicImage;

use crate::transform::{
    fit_dimensions, DecodedImage, ImageCodec, ImageInfo, OutputFormat, ResizeSpec,
    TransformError,
};

const SOURCE_SIZE: (u32, u32) = (64, 48);

#[derive(Debug, Default)]
struct CodecState {
    next_encode_error: Option<String>,
    encode_calls: usize,
    last_quality: Option<u8>,
    last_format: Option<OutputFormat>,
}

/// Mock implementation of the [`ImageCodec`] trait.
///
/// Decoding accepts any bytes and yields a blank 64x48 image. Encoding
/// produces a small text marker (`MOCK:<format>:<w>x<h>`) that `inspect`
/// understands, so the service's read-back path works without real codecs.
///
/// ```rust,ignore
/// let codec = Arc::new(MockImageCodec::new());
/// codec.fail_next_encode("encoder exploded");
/// ```
#[derive(Debug, Default)]
pub struct MockImageCodec {
    state: Mutex<CodecState>,
}

impl MockImageCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `encode` call fail with the given reason.
    pub fn fail_next_encode(&self, reason: &str) {
        self.with_state(|s| s.next_encode_error = Some(reason.to_string()));
    }

    /// Number of `encode` calls so far, failed ones included.
    pub fn encode_calls(&self) -> usize {
        self.with_state(|s| s.encode_calls)
    }

    /// Quality passed to the most recent `encode` call.
    pub fn last_quality(&self) -> Option<u8> {
        self.with_state(|s| s.last_quality)
    }

    /// Format passed to the most recent `encode` call.
    pub fn last_format(&self) -> Option<OutputFormat> {
        self.with_state(|s| s.last_format)
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut CodecState) -> T) -> T {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }
}

impl ImageCodec for MockImageCodec {
    fn name(&self) -> &str {
        "mock"
    }

    fn decode(&self, _bytes: &[u8]) -> Result<DecodedImage, TransformError> {
        Ok(DecodedImage {
            pixels: DynamicImage::new_rgb8(SOURCE_SIZE.0, SOURCE_SIZE.1),
            format: Some("mock".to_string()),
        })
    }

    fn resize(
        &self,
        image: DecodedImage,
        spec: &ResizeSpec,
    ) -> Result<DecodedImage, TransformError> {
        let (width, height) = fit_dimensions(image.width(), image.height(), spec);
        Ok(DecodedImage {
            pixels: DynamicImage::new_rgb8(width, height),
            format: image.format,
        })
    }

    fn encode(
        &self,
        image: &DecodedImage,
        format: OutputFormat,
        quality: u8,
    ) -> Result<Vec<u8>, TransformError> {
        let failure = self.with_state(|s| {
            s.encode_calls += 1;
            s.last_quality = Some(quality);
            s.last_format = Some(format);
            s.next_encode_error.take()
        });

        if let Some(reason) = failure {
            return Err(TransformError::encode(reason));
        }

        Ok(format!(
            "MOCK:{}:{}x{}",
            format.label(),
            image.width(),
            image.height()
        )
        .into_bytes())
    }

    fn inspect(&self, bytes: &[u8]) -> Result<ImageInfo, TransformError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| TransformError::decode("not mock codec output"))?;
        let parsed = text.strip_prefix("MOCK:").and_then(|rest| {
            let (format, dims) = rest.split_once(':')?;
            let (w, h) = dims.split_once('x')?;
            Some(ImageInfo {
                width: w.parse().ok()?,
                height: h.parse().ok()?,
                format: format.to_string(),
            })
        });

        parsed.ok_or_else(|| TransformError::decode("not mock codec output"))
    }
}
