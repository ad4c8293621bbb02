pub mod auth;
pub mod beverages;
pub mod health;
pub mod settings;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                          live collection snapshots (WebSocket)
///
/// /auth/register               register (public)
/// /auth/login                  login (public)
/// /auth/refresh                refresh (public)
/// /auth/logout                 logout (requires auth)
/// /auth/me                     current user (requires auth)
///
/// /taxonomy                    categories, types, defaults (public)
///
/// /beverages                   list, create
/// /beverages/analyze           photo + AI label analysis (multipart)
/// /beverages/normalize         photo normalisation only (multipart)
/// /beverages/{id}              get, update, delete
/// /beverages/{id}/rating       rating change
///
/// /user/settings/ai-key        get (masked), set, clear
/// ```
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/auth", auth::router())
        .route("/taxonomy", get(handlers::taxonomy::get_taxonomy))
        .nest("/beverages", beverages::router(max_upload_bytes))
        .nest("/user/settings", settings::router())
}
