//! Raster codec backed by the `image` crate.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageEncoder, ImageReader};

use super::error::TransformError;
use super::fit::{fit_dimensions, ResizeSpec};
use super::format::{format_label, OutputFormat};
use super::traits::{DecodedImage, ImageCodec, ImageInfo};

/// [`ImageCodec`] implementation on top of the `image` crate.
///
/// JPEG and WebP output honour the requested quality; WebP goes through
/// libwebp's lossy encoder. PNG is lossless and ignores quality.
#[derive(Debug, Clone)]
pub struct RasterCodec {
    filter: FilterType,
}

impl Default for RasterCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterCodec {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }

    /// Uses a different resampling filter.
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, TransformError> {
        ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| TransformError::decode(e.to_string()))
    }
}

impl ImageCodec for RasterCodec {
    fn name(&self) -> &str {
        "image-rs"
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, TransformError> {
        let reader = Self::reader(bytes)?;
        let format = reader.format().map(format_label);
        let pixels = reader
            .decode()
            .map_err(|e| TransformError::decode(e.to_string()))?;
        Ok(DecodedImage { pixels, format })
    }

    fn resize(
        &self,
        image: DecodedImage,
        spec: &ResizeSpec,
    ) -> Result<DecodedImage, TransformError> {
        if spec.is_noop() {
            return Ok(image);
        }

        let (width, height) = fit_dimensions(image.width(), image.height(), spec);
        if width == 0 || height == 0 {
            return Err(TransformError::resize(format!(
                "invalid target size {}x{}",
                width, height
            )));
        }
        if (width, height) == (image.width(), image.height()) {
            return Ok(image);
        }

        Ok(DecodedImage {
            pixels: image.pixels.resize_exact(width, height, self.filter),
            format: image.format,
        })
    }

    fn encode(
        &self,
        image: &DecodedImage,
        format: OutputFormat,
        quality: u8,
    ) -> Result<Vec<u8>, TransformError> {
        let mut buffer = Vec::new();

        match format {
            OutputFormat::Jpeg => {
                let rgb = image.pixels.to_rgb8();
                JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
                    .write_image(
                        rgb.as_raw(),
                        rgb.width(),
                        rgb.height(),
                        ExtendedColorType::Rgb8,
                    )
                    .map_err(|e| TransformError::encode(e.to_string()))?;
            }
            OutputFormat::Png => {
                image
                    .pixels
                    .write_with_encoder(PngEncoder::new(&mut buffer))
                    .map_err(|e| TransformError::encode(e.to_string()))?;
            }
            OutputFormat::Webp => {
                // libwebp only takes 8-bit RGB or RGBA buffers
                let quality = quality.clamp(1, 100) as f32;
                let encoded = if image.pixels.color().has_alpha() {
                    let rgba = image.pixels.to_rgba8();
                    webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
                        .encode(quality)
                } else {
                    let rgb = image.pixels.to_rgb8();
                    webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height())
                        .encode(quality)
                };
                buffer.extend_from_slice(&encoded);
            }
        }

        Ok(buffer)
    }

    fn inspect(&self, bytes: &[u8]) -> Result<ImageInfo, TransformError> {
        let reader = Self::reader(bytes)?;
        let format = reader
            .format()
            .map(format_label)
            .ok_or_else(|| TransformError::decode("unrecognized image container"))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| TransformError::decode(e.to_string()))?;
        Ok(ImageInfo {
            width,
            height,
            format,
        })
    }
}
