//! Posting transform requests to the service.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::file::SelectedFile;
use super::ClientError;

/// A multipart transform request: one file plus text fields.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    /// Endpoint path (e.g. `/transform/compress`) or absolute URL.
    pub endpoint: String,
    /// Form field carrying the file: `image`, or `file` for PDFs.
    pub file_field: String,
    pub file: SelectedFile,
    pub fields: Vec<(String, String)>,
}

impl TransformRequest {
    pub fn new(
        endpoint: impl Into<String>,
        file: SelectedFile,
        fields: Vec<(String, String)>,
    ) -> Self {
        let endpoint = endpoint.into();
        let file_field = file_field_for(&endpoint).to_string();
        Self {
            endpoint,
            file_field,
            file,
            fields,
        }
    }

    /// Value of a text field, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// The PDF endpoint reads its upload from `file`; image endpoints use `image`.
pub fn file_field_for(endpoint: &str) -> &'static str {
    if endpoint.trim_end_matches('/').ends_with("pdf-compress") {
        "file"
    } else {
        "image"
    }
}

/// Raw HTTP response: status and body bytes.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ClientError::Decode(format!("Failed to parse response: {}", e)))
    }
}

/// Sends transform requests.
#[async_trait]
pub trait TransformTransport: Send + Sync {
    /// Returns the name of this transport implementation.
    fn name(&self) -> &str;

    /// Submits a request. Non-2xx statuses are returned, not raised.
    async fn submit(&self, request: TransformRequest) -> Result<TransportResponse, ClientError>;
}

/// HTTP transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpTransportConfig {
    /// Prefix for relative endpoint paths, e.g. `http://localhost:8080`.
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl HttpTransportConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// `reqwest`-backed transport posting multipart forms.
pub struct HttpTransport {
    client: Client,
    config: HttpTransportConfig,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Resolves an endpoint against the base URL.
    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn build_form(request: TransformRequest) -> Form {
        let TransformRequest {
            file_field,
            file,
            fields,
            ..
        } = request;

        let part = Part::bytes(file.bytes().to_vec()).file_name(file.name.clone());
        let part = match part.mime_str(&file.mime_type) {
            Ok(part) => part,
            Err(_) => Part::bytes(file.bytes().to_vec()).file_name(file.name.clone()),
        };

        fields
            .into_iter()
            .fold(Form::new().part(file_field, part), |form, (k, v)| {
                form.text(k, v)
            })
    }
}

#[async_trait]
impl TransformTransport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn submit(&self, request: TransformRequest) -> Result<TransportResponse, ClientError> {
        let url = self.url_for(&request.endpoint);
        debug!(
            url = %url,
            file = %request.file.name,
            fields = request.fields.len(),
            "Posting transform request"
        );

        let response = self
            .client
            .post(&url)
            .multipart(Self::build_form(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout
                } else {
                    ClientError::Connection(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?
            .to_vec();

        debug!(status, bytes = body.len(), "Transform response received");
        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::selected_file;

    #[test]
    fn test_file_field_for_endpoint() {
        assert_eq!(file_field_for("/transform/compress"), "image");
        assert_eq!(file_field_for("/transform/pdf-compress"), "file");
        assert_eq!(file_field_for("http://host/transform/pdf-compress/"), "file");
    }

    #[test]
    fn test_url_for() {
        let transport =
            HttpTransport::new(HttpTransportConfig::new("http://localhost:8080/")).unwrap();
        assert_eq!(
            transport.url_for("/transform/resize"),
            "http://localhost:8080/transform/resize"
        );
        assert_eq!(
            transport.url_for("transform/resize"),
            "http://localhost:8080/transform/resize"
        );
        assert_eq!(
            transport.url_for("https://other/transform/convert"),
            "https://other/transform/convert"
        );
    }

    #[test]
    fn test_request_field_lookup() {
        let request = TransformRequest::new(
            "/transform/convert",
            selected_file("a.png", vec![1, 2]),
            vec![("format".into(), "webp".into())],
        );
        assert_eq!(request.file_field, "image");
        assert_eq!(request.field("format"), Some("webp"));
        assert_eq!(request.field("quality"), None);
    }

    #[test]
    fn test_response_status_and_json() {
        let ok = TransportResponse {
            status: 204,
            body: b"{\"error\":\"x\"}".to_vec(),
        };
        assert!(ok.is_success());
        let value: serde_json::Value = ok.json().unwrap();
        assert_eq!(value["error"], "x");

        let bad = TransportResponse {
            status: 400,
            body: b"plain text".to_vec(),
        };
        assert!(!bad.is_success());
        assert!(matches!(
            bad.json::<serde_json::Value>(),
            Err(ClientError::Decode(_))
        ));
    }

    #[test]
    fn test_config_defaults() {
        let config: HttpTransportConfig =
            serde_json::from_str(r#"{"base_url":"http://x"}"#).unwrap();
        assert_eq!(config.timeout_secs, 30);
    }

    #[tokio::test]
    async fn test_connection_refused_is_connection_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = HttpTransportConfig::new(format!("http://127.0.0.1:{port}"));
        let transport = HttpTransport::new(config).unwrap();
        let err = transport
            .submit(TransformRequest::new(
                "/transform/compress",
                selected_file("a.png", vec![1]),
                vec![],
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)));
    }
}
