//! The processing controller: state and actions for one tool instance.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::transform::encode_data_uri;

use super::file::{ProcessedArtifact, SelectedFile};
use super::intake::single_file;
use super::options::{OptionValue, ToolOptions};
use super::progress::{ProgressConfig, ProgressTicker};
use super::session::{ProcessingSession, Stats, TransformResult};
use super::transport::{TransformRequest, TransformTransport, TransportResponse};
use super::ClientError;

/// Set when a 2xx response carries no `dataUrl`.
pub const NO_DATA_MESSAGE: &str = "No processed image data returned";
/// Set when a non-2xx response carries no `error` field.
pub const REQUEST_FAILED_MESSAGE: &str = "Failed to process image";
/// Set when a transport error has no message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Controller settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Transform endpoint, e.g. `/transform/compress`.
    pub endpoint: String,
    #[serde(default)]
    pub progress: ProgressConfig,
}

impl ControllerConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            progress: ProgressConfig::default(),
        }
    }
}

/// A finished run, ready to be written into the session.
struct Completion {
    artifact: ProcessedArtifact,
    file_name: String,
    stats: Stats,
}

/// Coordinates file selection, options, the transform request and the
/// resulting session state for one tool.
///
/// State lives in a `watch` channel; presentation code either polls
/// [`snapshot`](Self::snapshot) or re-renders from [`subscribe`](Self::subscribe).
///
/// `process` is not guarded against re-entry. Overlapping calls each send a
/// request and the last response to arrive wins. Every `select_file` and
/// `reset` starts a new epoch; previews and responses from an older epoch
/// leave the session untouched.
pub struct ProcessingController<O> {
    config: ControllerConfig,
    transport: Arc<dyn TransformTransport>,
    state: Arc<watch::Sender<ProcessingSession<O>>>,
    epoch: Arc<AtomicU64>,
}

impl<O: ToolOptions> ProcessingController<O> {
    /// Creates a controller. The options are moved in and later changes
    /// only happen through [`update_option`](Self::update_option).
    pub fn new(
        config: ControllerConfig,
        options: O,
        transport: Arc<dyn TransformTransport>,
    ) -> Self {
        let (state, _) = watch::channel(ProcessingSession::new(options));
        Self {
            config,
            transport,
            state: Arc::new(state),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    /// Current state.
    pub fn snapshot(&self) -> ProcessingSession<O> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ProcessingSession<O>> {
        self.state.subscribe()
    }

    pub fn options(&self) -> O {
        self.state.borrow().options.clone()
    }

    /// Uses the first file of a selection. Returns `false` for an empty
    /// selection, which changes nothing.
    ///
    /// The preview is built in the background; outside a tokio runtime it is
    /// built inline.
    pub fn select_file(&self, files: Vec<SelectedFile>) -> bool {
        let Some(file) = single_file(files) else {
            debug!("Empty file selection ignored");
            return false;
        };

        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            file = %file.name,
            size = file.size(),
            mime = %file.mime_type,
            "File selected"
        );

        // A request still in flight belongs to the previous epoch now
        self.state.send_modify(|s| {
            s.file = Some(file.clone());
            s.is_processing = false;
            s.clear_result();
        });
        self.spawn_preview(epoch, file);
        true
    }

    /// Merges one option. No validation against the endpoint.
    pub fn update_option(&self, key: &str, value: impl Into<OptionValue>) {
        let value = value.into();
        debug!(key, value = ?value, "Option updated");
        self.state.send_modify(|s| s.options.apply(key, value));
    }

    /// Sends the selected file to the endpoint and records the outcome.
    ///
    /// Does nothing without a file. Failures end up in the session's
    /// `error` field rather than being returned.
    pub async fn process(&self) {
        let prepared = {
            let s = self.state.borrow();
            s.file.clone().map(|file| {
                (
                    file,
                    s.options.form_fields(),
                    s.options.format().map(str::to_owned),
                )
            })
        };
        let Some((file, fields, format)) = prepared else {
            debug!("Process requested without a file");
            return;
        };

        let epoch = self.epoch.load(Ordering::SeqCst);
        self.state.send_modify(|s| {
            s.is_processing = true;
            s.progress = 0;
            s.error = None;
        });

        let ticker = self.start_ticker(epoch);
        let request = TransformRequest::new(self.config.endpoint.clone(), file.clone(), fields);
        let outcome = self.transport.submit(request).await;
        drop(ticker);

        let completion = interpret(outcome, &self.config.endpoint, &file, format.as_deref());
        match &completion {
            Ok(done) => info!(
                file = %done.file_name,
                original_size = done.stats.original_size,
                processed_size = done.stats.processed_size,
                "Processing complete"
            ),
            Err(message) => warn!(error = %message, "Processing failed"),
        }

        let current = Arc::clone(&self.epoch);
        self.state.send_if_modified(move |s| {
            if current.load(Ordering::SeqCst) != epoch {
                debug!(epoch, "Discarding response from an abandoned session");
                return false;
            }
            s.is_processing = false;
            match completion {
                Ok(done) => {
                    s.progress = 100;
                    s.is_complete = true;
                    s.processed_artifact = Some(done.artifact);
                    s.processed_file_name = done.file_name;
                    s.stats = Some(done.stats);
                }
                Err(message) => {
                    s.is_complete = false;
                    s.error = Some(message);
                }
            }
            true
        });
    }

    /// Clears everything except the options.
    pub fn reset(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|s| s.clear());
        debug!("Session reset");
    }

    fn spawn_preview(&self, epoch: u64, file: SelectedFile) {
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.epoch);
        let build = move || {
            let preview = encode_data_uri(&file.mime_type, file.bytes());
            state.send_if_modified(|s| {
                if current.load(Ordering::SeqCst) != epoch {
                    debug!(file = %file.name, "Discarding stale preview");
                    return false;
                }
                s.preview = Some(preview);
                true
            });
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(build);
            }
            Err(_) => build(),
        }
    }

    fn start_ticker(&self, epoch: u64) -> ProgressTicker {
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.epoch);
        let progress = self.config.progress;

        ProgressTicker::spawn(progress.period(), move || {
            if current.load(Ordering::SeqCst) != epoch {
                return false;
            }
            let mut keep_going = false;
            state.send_if_modified(|s| {
                let next = progress.advance(s.progress);
                if next == s.progress {
                    return false;
                }
                s.progress = next;
                keep_going = next < progress.ceiling;
                true
            });
            keep_going
        })
    }
}

fn interpret(
    outcome: Result<TransportResponse, ClientError>,
    endpoint: &str,
    file: &SelectedFile,
    format: Option<&str>,
) -> Result<Completion, String> {
    let response = outcome.map_err(|e| {
        let message = e.to_string();
        if message.is_empty() {
            UNKNOWN_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    })?;

    if !response.is_success() {
        let message = response
            .json::<TransformResult>()
            .ok()
            .and_then(|body| body.error)
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| REQUEST_FAILED_MESSAGE.to_string());
        return Err(message);
    }

    let result: TransformResult = response.json().map_err(|e| e.to_string())?;
    let data_url = result
        .data_url
        .clone()
        .filter(|url| !url.is_empty())
        .ok_or_else(|| NO_DATA_MESSAGE.to_string())?;

    let artifact = ProcessedArtifact::new(data_url);
    let file_name = format!(
        "{}-{}.{}",
        output_prefix(endpoint),
        Utc::now().timestamp_millis(),
        resolve_extension(format, file, &artifact)
    );

    Ok(Completion {
        artifact,
        file_name,
        stats: Stats::from_result(&result),
    })
}

/// Name prefix for the processed file, from the endpoint path.
pub fn output_prefix(endpoint: &str) -> &'static str {
    if endpoint.contains("compress") {
        "compressed"
    } else if endpoint.contains("resize") {
        "resized"
    } else if endpoint.contains("convert") {
        "converted"
    } else {
        "processed"
    }
}

/// Extension for the processed file.
///
/// `original` or no format keeps the uploaded file's extension, `jpeg`
/// becomes `jpg`, anything else is used as-is. A file without an extension
/// falls back to the artifact's media type.
pub fn resolve_extension(
    format: Option<&str>,
    file: &SelectedFile,
    artifact: &ProcessedArtifact,
) -> String {
    match format.filter(|f| !f.is_empty()) {
        None | Some("original") => file
            .extension()
            .map(str::to_string)
            .or_else(|| {
                artifact
                    .mime_type()
                    .and_then(|m| m.split_once('/'))
                    .map(|(_, sub)| if sub == "jpeg" { "jpg" } else { sub }.to_string())
            })
            .unwrap_or_else(|| "bin".to_string()),
        Some("jpeg") => "jpg".to_string(),
        Some(other) => other.to_string(),
    }
}
