//! Transform endpoints: multipart form in, JSON (or PDF bytes) out.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, warn};

use fil_core::transform::{
    CompressResponse, ConvertResponse, FormFields, ResizeResponse, TransformError,
    TransformKind, Upload,
};

use super::error::ApiError;
use crate::state::AppState;

/// Form field carrying the upload on the image endpoints.
pub const IMAGE_FIELD: &str = "image";
/// Form field carrying the upload on the PDF endpoint.
pub const PDF_FIELD: &str = "file";

/// Header carrying the compressed PDF size in bytes.
pub const NEW_SIZE_HEADER: &str = "x-new-size";

/// A parsed multipart request.
#[derive(Debug, Default)]
pub struct TransformForm {
    pub upload: Option<Upload>,
    pub fields: FormFields,
}

/// Collects the upload under `file_field` and every text field.
///
/// A request that is not multipart at all yields an empty form, so the
/// service reports the missing file. Empty file parts count as absent.
pub async fn read_form(
    multipart: Result<Multipart, MultipartRejection>,
    file_field: &str,
) -> Result<TransformForm, MultipartError> {
    let mut form = TransformForm::default();
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            debug!(reason = %rejection, "Request body is not multipart");
            return Ok(form);
        }
    };

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == file_field {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;
            if form.upload.is_none() && !bytes.is_empty() {
                form.upload = Some(Upload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
        } else if field.file_name().is_none() {
            let value = field.text().await?;
            form.fields.insert(name, value);
        }
    }

    debug!(
        file_field,
        has_upload = form.upload.is_some(),
        fields = form.fields.len(),
        "Parsed transform form"
    );
    Ok(form)
}

/// POST /transform/compress
pub async fn compress(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CompressResponse>, ApiError> {
    let form = read_form(multipart, IMAGE_FIELD)
        .await
        .map_err(ApiError::Multipart)?;

    state
        .service()
        .compress(form.upload, &form.fields)
        .await
        .map(Json)
        .map_err(|e| ApiError::transform(TransformKind::Compress, e))
}

/// POST /transform/resize
pub async fn resize(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ResizeResponse>, ApiError> {
    let form = read_form(multipart, IMAGE_FIELD)
        .await
        .map_err(ApiError::Multipart)?;

    state
        .service()
        .resize(form.upload, &form.fields)
        .await
        .map(Json)
        .map_err(|e| ApiError::transform(TransformKind::Resize, e))
}

/// POST /transform/convert
pub async fn convert(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let form = read_form(multipart, IMAGE_FIELD)
        .await
        .map_err(ApiError::Multipart)?;

    state
        .service()
        .convert(form.upload, &form.fields)
        .await
        .map(Json)
        .map_err(|e| ApiError::transform(TransformKind::Convert, e))
}

/// POST /transform/pdf-compress
///
/// Responds with the PDF itself as an attachment. Errors are plain text.
pub async fn pdf_compress(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let form = match read_form(multipart, PDF_FIELD).await {
        Ok(form) => form,
        Err(e) => {
            warn!(error = %e, "Rejected multipart body");
            return (e.status(), e.body_text()).into_response();
        }
    };

    match state.service().pdf_compress(form.upload, &form.fields).await {
        Ok(output) => {
            let new_size = output.new_size();
            (
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
                    (
                        header::CONTENT_DISPOSITION,
                        HeaderValue::from_static("attachment; filename=\"compressed.pdf\""),
                    ),
                    (
                        HeaderName::from_static(NEW_SIZE_HEADER),
                        HeaderValue::from(new_size),
                    ),
                ],
                output.bytes,
            )
                .into_response()
        }
        Err(TransformError::MissingFile) => {
            (StatusCode::BAD_REQUEST, "No file provided").into_response()
        }
        Err(e) => {
            warn!(error = %e, "PDF compression failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                TransformKind::PdfCompress.failure_message(),
            )
                .into_response()
        }
    }
}
