//! Transform module: stateless file transforms behind codec seams.
//!
//! This module provides the [`TransformService`] used by the HTTP handlers
//! and the codec traits it depends on.
//!
//! # Features
//!
//! - Compress: re-encode at a quality, optionally shrinking to fit a box
//! - Resize: `inside` or `fill` fit to a target box
//! - Convert: re-encode into another format
//! - PDF: structural load/save round trip
//! - Results returned inline as data URIs
//!
//! # Example
//!
//! ```ignore
//! use fil_core::transform::{FormFields, TransformService, Upload};
//!
//! let service = TransformService::with_defaults(Default::default());
//!
//! let mut fields = FormFields::new();
//! fields.insert("quality", "60");
//! fields.insert("format", "webp");
//!
//! let response = service.compress(Some(Upload::new(bytes)), &fields).await?;
//! println!("{} -> {} bytes", response.original_size, response.compressed_size);
//! ```

mod data_uri;
mod error;
mod fit;
mod format;
mod params;
mod pdf;
mod raster;
mod service;
mod traits;
mod types;

pub use data_uri::{decode_data_uri, encode_data_uri, DataUriError};
pub use error::TransformError;
pub use fit::{fit_dimensions, FitPolicy, ResizeSpec};
pub use format::{format_label, OutputFormat};
pub use params::{parse_leading_int, CompressParams, ConvertParams, FormFields, ResizeParams};
pub use pdf::LopdfCodec;
pub use raster::RasterCodec;
pub use service::TransformService;
pub use traits::{DecodedImage, DocumentCodec, ImageCodec, ImageInfo};
pub use types::{
    compression_ratio, CompressResponse, ConvertResponse, PdfOutput, ResizeResponse,
    TransformKind, Upload,
};
