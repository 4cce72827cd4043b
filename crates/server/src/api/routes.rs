use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::middleware::metrics_middleware;
use super::{handlers, transform};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config().transform.max_upload_bytes;
    let cors_permissive = state.config().server.cors_permissive;

    // Transform routes (multipart uploads)
    let transform_routes = Router::new()
        .route("/compress", post(transform::compress))
        .route("/resize", post(transform::resize))
        .route("/convert", post(transform::convert))
        .route("/pdf-compress", post(transform::pdf_compress))
        .layer(DefaultBodyLimit::max(upload_limit));

    let router = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        .nest("/transform", transform_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(state);

    if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
