use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Open live-subscription connections.
    pub ws_connections: usize,
    pub vision: VisionStatus,
}

/// Label analysis readiness. The key itself is never exposed.
#[derive(Serialize)]
pub struct VisionStatus {
    pub model: String,
    /// A server-wide AI key is configured, so users without their own key
    /// can still analyse labels.
    pub server_key: bool,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = sakenote_db::health_check(&state.pool).await.is_ok();
    if !db_healthy {
        tracing::warn!("Health check: database unreachable");
    }
    let status = if db_healthy { "ok" } else { "degraded" };

    let vision = &state.config.vision;
    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        ws_connections: state.ws_manager.connection_count().await,
        vision: VisionStatus {
            model: vision.model.clone(),
            server_key: vision.api_key.is_some(),
        },
    })
}

/// Mount health check routes (root level, not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
