//! Route definitions for `/user/settings`.

use axum::routing::get;
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// Routes mounted at `/user/settings`. All require auth.
///
/// ```text
/// GET    /ai-key -> get_ai_key (masked)
/// PUT    /ai-key -> set_ai_key
/// DELETE /ai-key -> clear_ai_key
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/ai-key",
        get(settings::get_ai_key)
            .put(settings::set_ai_key)
            .delete(settings::clear_ai_key),
    )
}
