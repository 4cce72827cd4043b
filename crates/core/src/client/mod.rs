//! Client-side processing workflow.
//!
//! A [`ProcessingController`] owns one tool's session: the selected file and
//! its preview, the tool's options, the in-flight request with its simulated
//! progress, and the result or error. Requests go out through a
//! [`TransformTransport`]; [`HttpTransport`] posts multipart forms to the
//! transform service.

mod controller;
mod error;
mod file;
mod intake;
mod options;
mod progress;
mod session;
mod transport;

pub use controller::{
    output_prefix, resolve_extension, ControllerConfig, ProcessingController, NO_DATA_MESSAGE,
    REQUEST_FAILED_MESSAGE, UNKNOWN_ERROR_MESSAGE,
};
pub use error::ClientError;
pub use file::{format_file_size, guess_mime_type, ProcessedArtifact, SelectedFile};
pub use intake::{single_file, IntakePolicy};
pub use options::{CompressOptions, ConvertOptions, OptionValue, ResizeOptions, ToolOptions};
pub use progress::{ProgressConfig, ProgressTicker};
pub use session::{ProcessingSession, SessionPhase, Stats, TransformResult};
pub use transport::{
    file_field_for, HttpTransport, HttpTransportConfig, TransformRequest, TransformTransport,
    TransportResponse,
};
