//! Session state and the service's result payload.

use serde::{Deserialize, Serialize};

use super::file::{ProcessedArtifact, SelectedFile};
use super::options::ToolOptions;

/// JSON body returned by the transform endpoints.
///
/// A superset of the compress, resize and convert responses plus the error
/// shape; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    pub data_url: Option<String>,
    pub original_size: Option<u64>,
    pub compressed_size: Option<u64>,
    pub resized_size: Option<u64>,
    pub converted_size: Option<u64>,
    pub compression_ratio: Option<f64>,
    pub original_width: Option<u32>,
    pub original_height: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
    pub original_format: Option<String>,
    pub converted_format: Option<String>,
    pub error: Option<String>,
    pub details: Option<String>,
}

/// Normalized before/after statistics for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub original_size: u64,
    pub processed_size: u64,
    pub compression_ratio: Option<f64>,
    pub original_width: Option<u32>,
    pub original_height: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
}

impl Stats {
    pub fn from_result(result: &TransformResult) -> Self {
        Self {
            original_size: result.original_size.unwrap_or(0),
            processed_size: result
                .compressed_size
                .or(result.resized_size)
                .or(result.converted_size)
                .unwrap_or(0),
            compression_ratio: result.compression_ratio,
            original_width: result.original_width,
            original_height: result.original_height,
            width: result.width,
            height: result.height,
            format: result
                .format
                .clone()
                .or_else(|| result.converted_format.clone()),
        }
    }

    /// Bytes saved, negative when the output grew.
    pub fn saved_bytes(&self) -> i64 {
        self.original_size as i64 - self.processed_size as i64
    }
}

/// Coarse lifecycle phase derived from the session flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    FileSelected,
    PreviewReady,
    Processing,
    Complete,
    Failed,
}

/// The controller's full state.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingSession<O> {
    pub file: Option<SelectedFile>,
    /// Data URI of the original file for display.
    pub preview: Option<String>,
    pub is_processing: bool,
    /// 0 to 100.
    pub progress: u8,
    pub is_complete: bool,
    pub error: Option<String>,
    pub processed_artifact: Option<ProcessedArtifact>,
    pub processed_file_name: String,
    pub stats: Option<Stats>,
    pub options: O,
}

impl<O: ToolOptions> ProcessingSession<O> {
    pub fn new(options: O) -> Self {
        Self {
            file: None,
            preview: None,
            is_processing: false,
            progress: 0,
            is_complete: false,
            error: None,
            processed_artifact: None,
            processed_file_name: String::new(),
            stats: None,
            options,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_processing {
            SessionPhase::Processing
        } else if self.is_complete {
            SessionPhase::Complete
        } else if self.error.is_some() {
            SessionPhase::Failed
        } else if self.file.is_none() {
            SessionPhase::Idle
        } else if self.preview.is_some() {
            SessionPhase::PreviewReady
        } else {
            SessionPhase::FileSelected
        }
    }

    /// Drops everything except the options.
    pub(crate) fn clear(&mut self) {
        let options = self.options.clone();
        *self = Self::new(options);
    }

    /// Drops the previous result when a new file is chosen. The preview and
    /// processed file name are left for the next run to overwrite.
    pub(crate) fn clear_result(&mut self) {
        self.processed_artifact = None;
        self.stats = None;
        self.error = None;
        self.is_complete = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CompressOptions;
    use crate::testing::fixtures;

    #[test]
    fn test_stats_from_compress_result() {
        let result: TransformResult = serde_json::from_value(serde_json::json!({
            "dataUrl": "data:image/jpeg;base64,AA==",
            "originalSize": 1000,
            "compressedSize": 400,
            "compressionRatio": 60.0,
            "width": 10,
            "height": 20,
            "format": "jpeg"
        }))
        .unwrap();

        let stats = Stats::from_result(&result);
        assert_eq!(stats.original_size, 1000);
        assert_eq!(stats.processed_size, 400);
        assert_eq!(stats.compression_ratio, Some(60.0));
        assert_eq!(stats.format.as_deref(), Some("jpeg"));
        assert_eq!(stats.saved_bytes(), 600);
    }

    #[test]
    fn test_stats_from_resize_result() {
        let result: TransformResult = serde_json::from_value(serde_json::json!({
            "originalSize": 1000,
            "resizedSize": 1200,
            "originalWidth": 100,
            "originalHeight": 50,
            "width": 200,
            "height": 100,
            "format": "png"
        }))
        .unwrap();

        let stats = Stats::from_result(&result);
        assert_eq!(stats.processed_size, 1200);
        assert_eq!(stats.original_width, Some(100));
        assert_eq!(stats.saved_bytes(), -200);
    }

    #[test]
    fn test_stats_format_falls_back_to_converted_format() {
        let result = TransformResult {
            original_size: Some(10),
            converted_size: Some(8),
            converted_format: Some("webp".into()),
            original_format: Some("png".into()),
            ..Default::default()
        };
        let stats = Stats::from_result(&result);
        assert_eq!(stats.processed_size, 8);
        assert_eq!(stats.format.as_deref(), Some("webp"));
    }

    #[test]
    fn test_phase_transitions() {
        let mut session = ProcessingSession::new(CompressOptions::default());
        assert_eq!(session.phase(), SessionPhase::Idle);

        session.file = Some(fixtures::selected_file("a.png", vec![1]));
        assert_eq!(session.phase(), SessionPhase::FileSelected);

        session.preview = Some("data:image/png;base64,AQ==".into());
        assert_eq!(session.phase(), SessionPhase::PreviewReady);

        session.is_processing = true;
        assert_eq!(session.phase(), SessionPhase::Processing);

        session.is_processing = false;
        session.error = Some("boom".into());
        assert_eq!(session.phase(), SessionPhase::Failed);
    }

    #[test]
    fn test_clear_keeps_options() {
        let mut session = ProcessingSession::new(CompressOptions::default().with_quality(40));
        session.file = Some(fixtures::selected_file("a.png", vec![1]));
        session.progress = 100;
        session.processed_file_name = "compressed-1.png".into();

        session.clear();
        assert_eq!(session, ProcessingSession::new(CompressOptions::default().with_quality(40)));
    }
}
