//! Files going into and coming out of a processing session.

use std::path::Path;
use std::sync::Arc;

use crate::transform::{decode_data_uri, DataUriError};

use super::ClientError;

/// A file chosen by the user.
///
/// The bytes are reference counted so session snapshots stay cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    bytes: Arc<Vec<u8>>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: Arc::new(bytes),
        }
    }

    /// Builds a file whose MIME type is guessed from its name.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = guess_mime_type(&name).to_string();
        Self::new(name, mime_type, bytes)
    }

    /// Reads a file from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::from_bytes(name, bytes))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Text after the last `.` in the file name, if any.
    pub fn extension(&self) -> Option<&str> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }
}

/// Guesses a MIME type from a file name's extension.
pub fn guess_mime_type(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/x-icon",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// The processed output, held as the data URI the service returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedArtifact {
    data_url: String,
}

impl ProcessedArtifact {
    pub fn new(data_url: impl Into<String>) -> Self {
        Self {
            data_url: data_url.into(),
        }
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// Media type from the data URI header, e.g. `image/webp`.
    pub fn mime_type(&self) -> Option<&str> {
        let header = self.data_url.strip_prefix("data:")?.split_once(',')?.0;
        Some(header.split(';').next().unwrap_or(header))
    }

    /// Decodes the payload.
    pub fn decode(&self) -> Result<Vec<u8>, DataUriError> {
        decode_data_uri(&self.data_url).map(|(_, bytes)| bytes)
    }

    /// Decodes the payload and writes it to `path`.
    pub async fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ClientError> {
        let bytes = self.decode()?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}

/// Human readable byte size: `"512 B"`, `"1.50 KB"`, `"2.00 MB"`.
pub fn format_file_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;

    if bytes < KIB {
        format!("{} B", bytes)
    } else if bytes < MIB {
        format!("{:.2} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / MIB as f64)
    }
}
