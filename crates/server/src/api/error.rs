//! HTTP error mapping for the transform endpoints.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use fil_core::transform::{TransformError, TransformKind};

/// JSON error body: `{ "error": ..., "details": ... }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Errors returned by the JSON transform handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The service rejected or failed the request.
    Transform {
        kind: TransformKind,
        error: TransformError,
    },
    /// The multipart body could not be read (malformed, or over the size limit).
    Multipart(MultipartError),
}

impl ApiError {
    pub fn transform(kind: TransformKind, error: TransformError) -> Self {
        Self::Transform { kind, error }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Transform { error, .. } if error.is_validation() => StatusCode::BAD_REQUEST,
            Self::Transform { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Multipart(e) => e.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Transform { error, .. } if error.is_validation() => ErrorResponse {
                error: error.to_string(),
                details: None,
            },
            Self::Transform { kind, error } => {
                warn!(operation = kind.as_str(), error = %error, "Transform request failed");
                ErrorResponse {
                    error: kind.failure_message().to_string(),
                    details: Some(error.to_string()),
                }
            }
            Self::Multipart(e) => {
                warn!(error = %e, "Rejected multipart body");
                ErrorResponse {
                    error: e.body_text(),
                    details: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_is_400_without_details() {
        let response =
            ApiError::transform(TransformKind::Resize, TransformError::MissingDimensions)
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(
            body["error"],
            "At least one dimension (width or height) is required"
        );
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_processing_error_is_500_with_details() {
        let response = ApiError::transform(
            TransformKind::Convert,
            TransformError::decode("unsupported image"),
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Conversion failed");
        assert!(body["details"]
            .as_str()
            .unwrap()
            .contains("unsupported image"));
    }
}
