//! Wire types returned by the transform service.

use serde::{Deserialize, Serialize};

/// An uploaded file as received from a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            file_name: None,
            content_type: None,
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Response of the compress operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressResponse {
    pub data_url: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub compression_ratio: f64,
    pub width: u32,
    pub height: u32,
    pub format: String,
}

/// Response of the resize operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeResponse {
    pub data_url: String,
    pub original_size: u64,
    pub resized_size: u64,
    pub original_width: u32,
    pub original_height: u32,
    pub width: u32,
    pub height: u32,
    pub format: String,
}

/// Response of the convert operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub data_url: String,
    pub original_size: u64,
    pub converted_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_format: Option<String>,
    pub converted_format: String,
    pub width: u32,
    pub height: u32,
}

/// Output of the PDF re-serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfOutput {
    pub bytes: Vec<u8>,
    pub original_size: u64,
}

impl PdfOutput {
    pub fn new_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Which transform produced a result; used for logs, metrics and error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    Compress,
    Resize,
    Convert,
    PdfCompress,
}

impl TransformKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compress => "compress",
            Self::Resize => "resize",
            Self::Convert => "convert",
            Self::PdfCompress => "pdf_compress",
        }
    }

    /// Text used in `"<operation> failed"` error responses.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::Compress => "Compression failed",
            Self::Resize => "Resize failed",
            Self::Convert => "Conversion failed",
            Self::PdfCompress => "Error compressing PDF",
        }
    }
}

/// Percentage saved, rounded to two decimals. Zero-byte input yields 0.
pub fn compression_ratio(original_size: u64, new_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    let ratio = (original_size as f64 - new_size as f64) / original_size as f64 * 100.0;
    (ratio * 100.0).round() / 100.0
}
