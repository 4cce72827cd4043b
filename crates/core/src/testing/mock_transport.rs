//! Mock transform transport for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::client::{ClientError, TransformRequest, TransformTransport, TransportResponse};

/// A canned reply for one submitted request.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// An HTTP response with the given status and body.
    Respond { status: u16, body: Vec<u8> },
    /// A transport failure (connection refused, reset, ...).
    Fail(String),
}

impl MockReply {
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::Respond {
            status,
            body: value.to_string().into_bytes(),
        }
    }
}

/// Mock implementation of the [`TransformTransport`] trait.
///
/// Replies are consumed in submission order. Each reply may carry a delay,
/// which lets tests control the order in which concurrent requests finish.
/// When the queue is empty the transport answers 500.
///
/// ```rust,ignore
/// let transport = MockTransport::new();
/// transport
///     .push_delayed(Duration::from_millis(500), MockReply::json(200, &body))
///     .await;
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Arc<RwLock<VecDeque<(Duration, MockReply)>>>,
    requests: Arc<RwLock<Vec<TransformRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply delivered immediately.
    pub async fn push_reply(&self, reply: MockReply) {
        self.push_delayed(Duration::ZERO, reply).await;
    }

    /// Queues a reply delivered after `delay`.
    pub async fn push_delayed(&self, delay: Duration, reply: MockReply) {
        self.replies.write().await.push_back((delay, reply));
    }

    /// Queues a JSON reply delivered immediately.
    pub async fn push_json(&self, status: u16, value: &serde_json::Value) {
        self.push_reply(MockReply::json(status, value)).await;
    }

    /// Get all submitted requests.
    pub async fn recorded_requests(&self) -> Vec<TransformRequest> {
        self.requests.read().await.clone()
    }

    /// Get the number of submitted requests.
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

#[async_trait]
impl TransformTransport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(&self, request: TransformRequest) -> Result<TransportResponse, ClientError> {
        self.requests.write().await.push(request);

        let next = self.replies.write().await.pop_front();
        let (delay, reply) = next.unwrap_or_else(|| {
            (
                Duration::ZERO,
                MockReply::json(
                    500,
                    &serde_json::json!({ "error": "No mock reply configured" }),
                ),
            )
        });

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match reply {
            MockReply::Respond { status, body } => Ok(TransportResponse { status, body }),
            MockReply::Fail(message) => Err(ClientError::Connection(message)),
        }
    }
}
