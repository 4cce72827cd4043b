//! The transform service: one request in, one artifact out.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::TransformConfig;
use crate::metrics::{TRANSFORMS_TOTAL, TRANSFORM_BYTES, TRANSFORM_DURATION};

use super::data_uri::encode_data_uri;
use super::error::TransformError;
use super::fit::{fit_dimensions, FitPolicy, ResizeSpec};
use super::params::{CompressParams, ConvertParams, FormFields, ResizeParams};
use super::pdf::LopdfCodec;
use super::raster::RasterCodec;
use super::traits::{DecodedImage, DocumentCodec, ImageCodec};
use super::types::{
    compression_ratio, CompressResponse, ConvertResponse, PdfOutput, ResizeResponse,
    TransformKind, Upload,
};

/// Stateless transform handlers over pluggable codecs.
///
/// Every call is independent; nothing is cached between requests. Codec
/// work runs on tokio's blocking pool.
#[derive(Clone)]
pub struct TransformService {
    images: Arc<dyn ImageCodec>,
    documents: Arc<dyn DocumentCodec>,
    config: TransformConfig,
}

impl TransformService {
    pub fn new(
        images: Arc<dyn ImageCodec>,
        documents: Arc<dyn DocumentCodec>,
        config: TransformConfig,
    ) -> Self {
        Self {
            images,
            documents,
            config,
        }
    }

    /// Service with the `image`-crate codec and the `lopdf` document codec.
    pub fn with_defaults(config: TransformConfig) -> Self {
        Self::new(
            Arc::new(RasterCodec::new()),
            Arc::new(LopdfCodec::new()),
            config,
        )
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn image_codec_name(&self) -> &str {
        self.images.name()
    }

    pub fn document_codec_name(&self) -> &str {
        self.documents.name()
    }

    /// Re-encodes an image at the requested quality, optionally shrinking it
    /// to fit a box. Never enlarges.
    pub async fn compress(
        &self,
        upload: Option<Upload>,
        fields: &FormFields,
    ) -> Result<CompressResponse, TransformError> {
        let kind = TransformKind::Compress;
        let started = Instant::now();
        let upload = require_upload(kind, upload)?;
        let params = CompressParams::from_fields(fields, self.config.default_quality)
            .inspect_err(|_| reject(kind))?;

        debug!(
            quality = params.quality,
            width = ?params.width,
            height = ?params.height,
            format = %params.format,
            "Compressing image"
        );

        let original_size = upload.size() as u64;
        let (format, quality) = (params.format, params.quality);
        let codec = Arc::clone(&self.images);
        let spec = ResizeSpec {
            policy: FitPolicy::Inside,
            width: params.width,
            height: params.height,
            allow_enlarge: false,
        };
        let max_pixels = self.config.max_output_pixels;
        let result = run_blocking(move || {
            let decoded = codec.decode(&upload.bytes)?;
            check_output_size(&decoded, &spec, max_pixels)?;
            let resized = codec.resize(decoded, &spec)?;
            let encoded = codec.encode(&resized, format, quality)?;
            let info = codec.inspect(&encoded)?;
            Ok((encoded, info))
        })
        .await;

        let (encoded, info) = record(kind, started, original_size, result)?;
        let compressed_size = encoded.len() as u64;
        let ratio = compression_ratio(original_size, compressed_size);

        info!(
            original_size,
            compressed_size,
            compression_ratio = ratio,
            width = info.width,
            height = info.height,
            "Compression successful"
        );

        Ok(CompressResponse {
            data_url: encode_data_uri(format.mime_type(), &encoded),
            original_size,
            compressed_size,
            compression_ratio: ratio,
            width: info.width,
            height: info.height,
            format: info.format,
        })
    }

    /// Resizes an image to the requested box, preserving aspect ratio only
    /// when asked to.
    pub async fn resize(
        &self,
        upload: Option<Upload>,
        fields: &FormFields,
    ) -> Result<ResizeResponse, TransformError> {
        let kind = TransformKind::Resize;
        let started = Instant::now();
        let upload = require_upload(kind, upload)?;
        let params = ResizeParams::from_fields(fields).inspect_err(|_| reject(kind))?;

        let original_size = upload.size() as u64;
        let format = params.format;
        let quality = self.config.resize_quality;
        let codec = Arc::clone(&self.images);
        let spec = ResizeSpec {
            policy: if params.maintain_aspect_ratio {
                FitPolicy::Inside
            } else {
                FitPolicy::Fill
            },
            width: params.width,
            height: params.height,
            allow_enlarge: true,
        };

        debug!(
            width = ?params.width,
            height = ?params.height,
            maintain_aspect_ratio = params.maintain_aspect_ratio,
            format = %params.format,
            "Resizing image"
        );

        let max_pixels = self.config.max_output_pixels;
        let result = run_blocking(move || {
            let decoded = codec.decode(&upload.bytes)?;
            let original = (decoded.width(), decoded.height());
            check_output_size(&decoded, &spec, max_pixels)?;
            let resized = codec.resize(decoded, &spec)?;
            let encoded = codec.encode(&resized, format, quality)?;
            let info = codec.inspect(&encoded)?;
            Ok((encoded, info, original))
        })
        .await;

        let (encoded, info, (original_width, original_height)) =
            record(kind, started, original_size, result)?;
        let resized_size = encoded.len() as u64;

        info!(
            original_size,
            resized_size,
            original_dimensions = %format!("{}x{}", original_width, original_height),
            new_dimensions = %format!("{}x{}", info.width, info.height),
            "Resize successful"
        );

        Ok(ResizeResponse {
            data_url: encode_data_uri(format.mime_type(), &encoded),
            original_size,
            resized_size,
            original_width,
            original_height,
            width: info.width,
            height: info.height,
            format: info.format,
        })
    }

    /// Re-encodes an image into another format without resizing.
    pub async fn convert(
        &self,
        upload: Option<Upload>,
        fields: &FormFields,
    ) -> Result<ConvertResponse, TransformError> {
        let kind = TransformKind::Convert;
        let started = Instant::now();
        let upload = require_upload(kind, upload)?;
        let params = ConvertParams::from_fields(fields, self.config.default_quality)
            .inspect_err(|_| reject(kind))?;

        let original_size = upload.size() as u64;
        let ConvertParams { format, quality } = params;
        let codec = Arc::clone(&self.images);

        debug!(format = %format, quality, "Converting image");

        let result = run_blocking(move || {
            let decoded = codec.decode(&upload.bytes)?;
            let original_format = decoded.format.clone();
            let encoded = codec.encode(&decoded, format, quality)?;
            let info = codec.inspect(&encoded)?;
            Ok((encoded, info, original_format))
        })
        .await;

        let (encoded, info, original_format) = record(kind, started, original_size, result)?;
        let converted_size = encoded.len() as u64;

        info!(
            original_size,
            converted_size,
            original_format = original_format.as_deref().unwrap_or("unknown"),
            converted_format = %info.format,
            "Conversion successful"
        );

        Ok(ConvertResponse {
            data_url: encode_data_uri(format.mime_type(), &encoded),
            original_size,
            converted_size,
            original_format,
            converted_format: info.format,
            width: info.width,
            height: info.height,
        })
    }

    /// Loads and re-saves a PDF.
    ///
    /// A `quality` field is accepted but has no effect on the output: the
    /// document library performs a structural re-serialization only.
    pub async fn pdf_compress(
        &self,
        upload: Option<Upload>,
        fields: &FormFields,
    ) -> Result<PdfOutput, TransformError> {
        let kind = TransformKind::PdfCompress;
        let started = Instant::now();
        let upload = require_upload(kind, upload)?;

        if let Some(quality) = fields.text("quality") {
            debug!(quality, "PDF quality requested; re-serialization ignores it");
        }

        let original_size = upload.size() as u64;
        let codec = Arc::clone(&self.documents);
        let result = run_blocking(move || codec.round_trip(&upload.bytes)).await;
        let bytes = record(kind, started, original_size, result)?;

        info!(
            original_size,
            new_size = bytes.len(),
            "PDF re-serialized"
        );

        Ok(PdfOutput {
            bytes,
            original_size,
        })
    }
}

fn require_upload(kind: TransformKind, upload: Option<Upload>) -> Result<Upload, TransformError> {
    match upload {
        Some(upload) => Ok(upload),
        None => {
            reject(kind);
            Err(TransformError::MissingFile)
        }
    }
}

/// Fails before the codec allocates an output larger than `max_pixels`.
fn check_output_size(
    image: &DecodedImage,
    spec: &ResizeSpec,
    max_pixels: u64,
) -> Result<(), TransformError> {
    let (width, height) = fit_dimensions(image.width(), image.height(), spec);
    let pixels = width as u64 * height as u64;
    if pixels > max_pixels {
        return Err(TransformError::resize(format!(
            "output {}x{} exceeds the limit of {} pixels",
            width, height, max_pixels
        )));
    }
    Ok(())
}

fn reject(kind: TransformKind) {
    TRANSFORMS_TOTAL
        .with_label_values(&[kind.as_str(), "rejected"])
        .inc();
}

async fn run_blocking<T, F>(work: F) -> Result<T, TransformError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, TransformError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| TransformError::Worker(e.to_string()))?
}

/// Records metrics for a finished codec run and passes the result through.
fn record<T: EncodedLen>(
    kind: TransformKind,
    started: Instant,
    original_size: u64,
    result: Result<T, TransformError>,
) -> Result<T, TransformError> {
    let op = kind.as_str();
    TRANSFORM_DURATION
        .with_label_values(&[op])
        .observe(started.elapsed().as_secs_f64());
    TRANSFORM_BYTES
        .with_label_values(&[op, "in"])
        .observe(original_size as f64);

    match &result {
        Ok(output) => {
            TRANSFORMS_TOTAL.with_label_values(&[op, "success"]).inc();
            TRANSFORM_BYTES
                .with_label_values(&[op, "out"])
                .observe(output.encoded_len() as f64);
        }
        Err(e) => {
            TRANSFORMS_TOTAL.with_label_values(&[op, "failed"]).inc();
            warn!(operation = op, error = %e, "Transform failed");
        }
    }

    result
}

/// Size of the encoded artifact carried by a codec run's output.
trait EncodedLen {
    fn encoded_len(&self) -> usize;
}

impl EncodedLen for Vec<u8> {
    fn encoded_len(&self) -> usize {
        self.len()
    }
}

impl<A> EncodedLen for (Vec<u8>, A) {
    fn encoded_len(&self) -> usize {
        self.0.len()
    }
}

impl<A, B> EncodedLen for (Vec<u8>, A, B) {
    fn encoded_len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockImageCodec};
    use crate::transform::data_uri::decode_data_uri;

    fn service() -> TransformService {
        TransformService::with_defaults(TransformConfig::default())
    }

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        pairs.iter().copied().collect()
    }

    fn upload(bytes: Vec<u8>) -> Option<Upload> {
        Some(Upload::new(bytes))
    }

    #[tokio::test]
    async fn test_compress_missing_file() {
        let err = service()
            .compress(None, &fields(&[("quality", "50")]))
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::MissingFile));
    }

    #[tokio::test]
    async fn test_compress_reports_sizes_and_ratio() {
        let original = fixtures::jpeg_image(128, 96, 95);
        let response = service()
            .compress(
                upload(original.clone()),
                &fields(&[("quality", "50"), ("format", "jpeg")]),
            )
            .await
            .unwrap();

        assert_eq!(response.original_size, original.len() as u64);
        assert!(response.compressed_size <= response.original_size);
        assert_eq!(
            response.compression_ratio,
            compression_ratio(response.original_size, response.compressed_size)
        );
        assert_eq!(response.format, "jpeg");
        assert_eq!((response.width, response.height), (128, 96));

        let (mime, bytes) = decode_data_uri(&response.data_url).unwrap();
        assert_eq!(mime, "image/jpeg");
        assert_eq!(bytes.len() as u64, response.compressed_size);
    }

    #[tokio::test]
    async fn test_compress_each_supported_format() {
        for (requested, expected) in [("jpeg", "jpeg"), ("png", "png"), ("webp", "webp")] {
            let response = service()
                .compress(
                    upload(fixtures::png_image(32, 32)),
                    &fields(&[("format", requested), ("quality", "70")]),
                )
                .await
                .unwrap();
            assert_eq!(response.format, expected);
        }
    }

    #[tokio::test]
    async fn test_compress_unknown_format_falls_back_to_jpeg() {
        let response = service()
            .compress(
                upload(fixtures::png_image(32, 32)),
                &fields(&[("format", "bmp")]),
            )
            .await
            .unwrap();
        assert_eq!(response.format, "jpeg");
        assert!(response.data_url.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_compress_shrinks_but_never_enlarges() {
        let shrunk = service()
            .compress(
                upload(fixtures::png_image(200, 100)),
                &fields(&[("width", "100")]),
            )
            .await
            .unwrap();
        assert_eq!((shrunk.width, shrunk.height), (100, 50));

        let kept = service()
            .compress(
                upload(fixtures::png_image(200, 100)),
                &fields(&[("width", "400"), ("height", "400")]),
            )
            .await
            .unwrap();
        assert_eq!((kept.width, kept.height), (200, 100));
    }

    #[tokio::test]
    async fn test_compress_undecodable_input_is_processing_error() {
        let err = service()
            .compress(upload(b"not an image".to_vec()), &FormFields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::Decode { .. }));
        assert!(!err.is_validation());
    }

    #[tokio::test]
    async fn test_resize_requires_dimension() {
        let err = service()
            .resize(upload(fixtures::png_image(10, 10)), &FormFields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::MissingDimensions));
    }

    #[tokio::test]
    async fn test_resize_missing_file_checked_first() {
        let err = service().resize(None, &FormFields::new()).await.unwrap_err();
        assert!(matches!(err, TransformError::MissingFile));
    }

    #[tokio::test]
    async fn test_resize_keep_aspect_with_width_only() {
        let response = service()
            .resize(
                upload(fixtures::png_image(300, 200)),
                &fields(&[
                    ("width", "150"),
                    ("maintainAspectRatio", "true"),
                    ("format", "png"),
                ]),
            )
            .await
            .unwrap();

        assert_eq!(response.original_width, 300);
        assert_eq!(response.original_height, 200);
        assert_eq!(response.width, 150);
        assert_eq!(response.height, 100);
        assert_eq!(response.format, "png");
    }

    #[tokio::test]
    async fn test_resize_fill_uses_exact_box() {
        let response = service()
            .resize(
                upload(fixtures::png_image(300, 200)),
                &fields(&[
                    ("width", "64"),
                    ("height", "64"),
                    ("maintainAspectRatio", "false"),
                ]),
            )
            .await
            .unwrap();
        assert_eq!((response.width, response.height), (64, 64));
        assert_eq!(response.format, "jpeg");
    }

    #[tokio::test]
    async fn test_resize_may_enlarge() {
        let response = service()
            .resize(
                upload(fixtures::png_image(20, 10)),
                &fields(&[("width", "40"), ("maintainAspectRatio", "true")]),
            )
            .await
            .unwrap();
        assert_eq!((response.width, response.height), (40, 20));
    }

    #[tokio::test]
    async fn test_resize_rejects_oversized_output() {
        let err = service()
            .resize(
                upload(fixtures::png_image(4, 4)),
                &fields(&[
                    ("width", "60000"),
                    ("height", "60000"),
                    ("maintainAspectRatio", "false"),
                ]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::Resize { .. }));
        assert!(!err.is_validation());
    }

    #[tokio::test]
    async fn test_resize_output_budget_is_configurable() {
        let codec = Arc::new(MockImageCodec::new());
        let service = TransformService::new(
            codec.clone(),
            Arc::new(LopdfCodec::new()),
            TransformConfig {
                max_output_pixels: 100 * 100,
                ..Default::default()
            },
        );

        let ok = service
            .resize(upload(vec![0; 10]), &fields(&[("width", "100"), ("height", "100")]))
            .await;
        assert!(ok.is_ok());

        let err = service
            .resize(upload(vec![0; 10]), &fields(&[("width", "101"), ("height", "100")]))
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::Resize { .. }));
        assert_eq!(codec.encode_calls(), 1);
    }

    #[tokio::test]
    async fn test_convert_requires_target_format() {
        for form in [fields(&[]), fields(&[("format", "original")])] {
            let err = service()
                .convert(upload(fixtures::png_image(8, 8)), &form)
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Target format is required");
        }
    }

    #[tokio::test]
    async fn test_convert_png_to_webp() {
        let original = fixtures::png_image(48, 24);
        let response = service()
            .convert(upload(original.clone()), &fields(&[("format", "webp")]))
            .await
            .unwrap();

        assert_eq!(response.original_size, original.len() as u64);
        assert_eq!(response.original_format.as_deref(), Some("png"));
        assert_eq!(response.converted_format, "webp");
        assert_eq!((response.width, response.height), (48, 24));
        assert!(response.data_url.starts_with("data:image/webp;base64,"));
    }

    #[tokio::test]
    async fn test_pdf_compress_round_trip() {
        let original = fixtures::minimal_pdf();
        let output = service()
            .pdf_compress(upload(original.clone()), &fields(&[("quality", "10")]))
            .await
            .unwrap();
        assert_eq!(output.original_size, original.len() as u64);
        assert!(output.bytes.starts_with(b"%PDF-"));
        assert_eq!(output.new_size(), output.bytes.len() as u64);
    }

    #[tokio::test]
    async fn test_pdf_quality_has_no_effect() {
        let original = fixtures::minimal_pdf();
        let low = service()
            .pdf_compress(upload(original.clone()), &fields(&[("quality", "1")]))
            .await
            .unwrap();
        let high = service()
            .pdf_compress(upload(original), &fields(&[("quality", "100")]))
            .await
            .unwrap();
        assert_eq!(low.new_size(), high.new_size());
    }

    #[tokio::test]
    async fn test_pdf_compress_missing_file() {
        let err = service()
            .pdf_compress(None, &FormFields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::MissingFile));
    }

    #[tokio::test]
    async fn test_codec_failure_propagates() {
        let codec = Arc::new(MockImageCodec::new());
        codec.fail_next_encode("encoder exploded");
        let service = TransformService::new(
            codec.clone(),
            Arc::new(LopdfCodec::new()),
            TransformConfig::default(),
        );

        let err = service
            .compress(upload(vec![1, 2, 3]), &FormFields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::Encode { .. }));
        assert_eq!(codec.encode_calls(), 1);
    }

    #[tokio::test]
    async fn test_compress_uses_configured_default_quality() {
        let codec = Arc::new(MockImageCodec::new());
        let service = TransformService::new(
            codec.clone(),
            Arc::new(LopdfCodec::new()),
            TransformConfig {
                default_quality: 42,
                ..Default::default()
            },
        );

        service
            .compress(upload(vec![0; 10]), &FormFields::new())
            .await
            .unwrap();
        assert_eq!(codec.last_quality(), Some(42));
    }
}
