//! Shared application router builder.
//!
//! [`build_app_router`] is used by both the binary and the integration tests
//! so they run the exact same middleware stack.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Correlation header set on every request and echoed on the response.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Headroom left after the vision timeout so an analysis that times out
/// still answers with `AI_TIMEOUT` instead of a bare 408.
const ANALYSIS_GRACE_SECS: u64 = 15;

/// Overall per-request timeout.
///
/// Never shorter than the vision timeout plus [`ANALYSIS_GRACE_SECS`], since
/// label analysis is the slowest request the API serves.
pub fn request_timeout(config: &ServerConfig) -> Duration {
    let floor = config.vision.timeout_secs + ANALYSIS_GRACE_SECS;
    Duration::from_secs(config.request_timeout_secs.max(floor))
}

/// Build the full application [`Router`] with all middleware layers.
///
/// Layers, outermost first: CORS, request id, tracing, request id echo,
/// timeout, panic recovery. Upload size limits live on the upload routes.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let timeout = request_timeout(config);
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    tracing::debug!(
        timeout_secs = timeout.as_secs(),
        max_upload_bytes = config.max_upload_bytes,
        "Building application router"
    );

    Router::new()
        // Health check at root level (not under /api/v1).
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes(config.max_upload_bytes))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(build_cors_layer(config))
        .with_state(state)
}

/// Build the CORS middleware layer for the browser client.
///
/// The client sends JSON and multipart bodies with a bearer token and reads
/// the request id back for error reports. Panics at startup if any
/// configured origin is invalid.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
