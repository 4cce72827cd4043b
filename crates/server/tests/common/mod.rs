//! Common test utilities for E2E testing.
//!
//! This module provides a test fixture that drives the router in-process,
//! a multipart body builder, and a helper that serves the router on a real
//! loopback listener for client round trips.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use fil_core::{Config, ServerConfig, TransformService};
use fil_server::api::create_router;
use fil_server::state::AppState;

/// Re-export fixtures for test convenience
pub use fil_core::testing::fixtures;

/// Config used by the fixtures: loopback host, defaults otherwise.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
            port: 0, // Not used for in-process testing
            cors_permissive: true,
        },
        ..Default::default()
    }
}

/// Test fixture for E2E testing of the HTTP surface.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_compress() {
///     let fixture = TestFixture::new();
///     let form = MultipartBody::new().file("image", "a.png", "image/png", &fixtures::png_image(8, 8));
///     let response = fixture.post_multipart("/transform/compress", form).await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    pub config: Config,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
    /// Body parsed as JSON, `Null` when it is not JSON.
    pub body: Value,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestFixture {
    /// Create a new test fixture with the default codecs.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test fixture with custom configuration.
    pub fn with_config(config: Config) -> Self {
        let state = Arc::new(AppState::new(config.clone()));
        Self {
            router: create_router(state),
            config,
        }
    }

    /// Create a test fixture around an explicitly built service.
    pub fn with_service(config: Config, service: TransformService) -> Self {
        let state = Arc::new(AppState::with_service(config.clone(), service));
        Self {
            router: create_router(state),
            config,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a multipart POST request.
    pub async fn post_multipart(&self, path: &str, form: MultipartBody) -> TestResponse {
        let (content_type, body) = form.finish();
        self.post_raw(path, body, &content_type).await
    }

    /// Send a POST request with a raw body and custom content type.
    pub async fn post_raw(
        &self,
        path: &str,
        body: impl Into<Body>,
        content_type: &str,
    ) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", content_type)
            .body(body.into())
            .unwrap();
        self.send(request).await
    }

    /// Send a prepared request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }
}

/// Builds a `multipart/form-data` body by hand.
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "fil-test-boundary-7MA4YWxkTrZu0gW".to_string(),
            body: Vec::new(),
        }
    }

    /// Adds a file part.
    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Adds a PNG file under the `image` field.
    pub fn image(self, bytes: &[u8]) -> Self {
        self.file("image", "upload.png", "image/png", bytes)
    }

    /// Adds a text part.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    /// Returns the content type header value and the finished body.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

/// Serves the router on `127.0.0.1:0` and returns its base URL.
pub async fn spawn_server(config: Config) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    let app = create_router(Arc::new(AppState::new(config)));

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    format!("http://{}", addr)
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status,
            $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            $response.text()
        );
    };
}
