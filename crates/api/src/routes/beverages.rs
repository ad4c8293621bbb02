//! Route definitions for the `/beverages` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{analyze, beverages};
use crate::state::AppState;

/// Routes mounted at `/beverages`. All require auth.
///
/// ```text
/// GET    /              -> list (?category, type, sort)
/// POST   /              -> create
/// POST   /analyze       -> analyze_label (multipart)
/// POST   /normalize     -> normalize_photo (multipart)
/// GET    /{id}          -> get_by_id
/// PUT    /{id}          -> update
/// DELETE /{id}          -> delete
/// PUT    /{id}/rating   -> update_rating
/// ```
///
/// `max_upload_bytes` caps the multipart endpoints.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    let uploads = Router::new()
        .route("/analyze", post(analyze::analyze_label))
        .route("/normalize", post(analyze::normalize_photo))
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    Router::new()
        .route("/", get(beverages::list).post(beverages::create))
        .route(
            "/{id}",
            get(beverages::get_by_id)
                .put(beverages::update)
                .delete(beverages::delete),
        )
        .route("/{id}/rating", put(beverages::update_rating))
        .merge(uploads)
}
