//! Which files a tool accepts, and how many.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::file::SelectedFile;

/// Upload-zone rules for a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakePolicy {
    /// Comma separated `type/*`, `.ext` or exact MIME entries. `*/*` accepts
    /// everything.
    #[serde(default = "default_accept")]
    pub accept: String,
    /// Maximum number of files kept; 0 means unlimited.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self {
            accept: default_accept(),
            max_files: default_max_files(),
        }
    }
}

fn default_accept() -> String {
    "*/*".to_string()
}

fn default_max_files() -> usize {
    1
}

impl IntakePolicy {
    pub fn images() -> Self {
        Self {
            accept: "image/*".to_string(),
            max_files: 1,
        }
    }

    pub fn pdf() -> Self {
        Self {
            accept: ".pdf,application/pdf".to_string(),
            max_files: 1,
        }
    }

    pub fn accepts(&self, file: &SelectedFile) -> bool {
        let mime = file.mime_type.to_ascii_lowercase();
        let name = file.name.to_ascii_lowercase();

        self.accept
            .split(',')
            .map(|entry| entry.trim().to_ascii_lowercase())
            .filter(|entry| !entry.is_empty())
            .any(|entry| {
                if entry == "*/*" || entry == "*" {
                    true
                } else if let Some(ext) = entry.strip_prefix('.') {
                    name.rsplit_once('.').is_some_and(|(_, e)| e == ext)
                } else if let Some(kind) = entry.strip_suffix("/*") {
                    mime.split_once('/').is_some_and(|(t, _)| t == kind)
                } else {
                    mime == entry
                }
            })
    }

    /// Drops files the policy rejects, then truncates to `max_files`.
    pub fn filter(&self, files: Vec<SelectedFile>) -> Vec<SelectedFile> {
        let offered = files.len();
        let mut accepted: Vec<_> = files.into_iter().filter(|f| self.accepts(f)).collect();
        if self.max_files > 0 {
            accepted.truncate(self.max_files);
        }
        if accepted.len() != offered {
            debug!(offered, kept = accepted.len(), "Intake dropped files");
        }
        accepted
    }
}

/// The single-file contract: only the first file of a selection is used.
pub fn single_file(files: Vec<SelectedFile>) -> Option<SelectedFile> {
    if files.len() > 1 {
        debug!(count = files.len(), "Multiple files selected, using the first");
    }
    files.into_iter().next()
}
