//! Handlers for the `/beverages` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use sakenote_core::error::CoreError;
use sakenote_core::listing::compose;
use sakenote_core::rating::Rating;
use sakenote_core::record::BeverageDraft;
use sakenote_core::taxonomy::Category;
use sakenote_core::types::DbId;
use sakenote_db::models::beverage::{Beverage, BeverageResponse, UpdateBeverage};
use sakenote_db::repositories::BeverageRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::ListParams;
use crate::response::DataResponse;
use crate::state::AppState;

const SEARCH_BASE_URL: &str = "https://www.google.com/search";

/// Web-search link for `"{name} {category}"`.
pub fn search_url(name: &str, category: Category) -> String {
    let q = format!("{name} {category}");
    reqwest::Url::parse_with_params(SEARCH_BASE_URL, &[("q", q.as_str())])
        .map(String::from)
        .unwrap_or_else(|_| SEARCH_BASE_URL.to_string())
}

/// Row to API shape, with the search link filled in.
pub fn to_response(beverage: &Beverage) -> BeverageResponse {
    BeverageResponse::new(beverage, search_url(&beverage.name, beverage.category()))
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Beverage",
        id,
    })
}

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub rating: Rating,
}

/// GET /api/v1/beverages?category=&type=&sort=
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Vec<BeverageResponse>>>> {
    let query = params.into_query()?;
    let rows = BeverageRepo::list_by_owner(&state.pool, auth.user_id).await?;
    let data = compose(&rows, &query)
        .into_iter()
        .map(to_response)
        .collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/beverages
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(draft): Json<BeverageDraft>,
) -> AppResult<(StatusCode, Json<DataResponse<BeverageResponse>>)> {
    draft.validate_for_submit()?;

    let beverage = BeverageRepo::create(&state.pool, auth.user_id, &draft).await?;
    tracing::info!(beverage_id = beverage.id, user_id = auth.user_id, "Beverage created");
    state.notify_beverage_changed(auth.user_id, beverage.id, "created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: to_response(&beverage),
        }),
    ))
}

/// GET /api/v1/beverages/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<BeverageResponse>>> {
    let beverage = BeverageRepo::find_by_id(&state.pool, auth.user_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse {
        data: to_response(&beverage),
    }))
}

/// PUT /api/v1/beverages/{id}
///
/// Field-level edit. A category change without a type resets the type.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateBeverage>,
) -> AppResult<Json<DataResponse<BeverageResponse>>> {
    input.check()?;

    let current = BeverageRepo::find_by_id(&state.pool, auth.user_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    input.resolve_type(&current.category);

    let beverage = BeverageRepo::update(&state.pool, auth.user_id, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(beverage_id = id, user_id = auth.user_id, "Beverage updated");
    state.notify_beverage_changed(auth.user_id, id, "updated");

    Ok(Json(DataResponse {
        data: to_response(&beverage),
    }))
}

/// PUT /api/v1/beverages/{id}/rating
pub async fn update_rating(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<RatingRequest>,
) -> AppResult<Json<DataResponse<BeverageResponse>>> {
    let beverage = BeverageRepo::update_rating(&state.pool, auth.user_id, id, input.rating)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        beverage_id = id,
        user_id = auth.user_id,
        rating = %input.rating,
        "Beverage rated"
    );
    state.notify_beverage_changed(auth.user_id, id, "rated");

    Ok(Json(DataResponse {
        data: to_response(&beverage),
    }))
}

/// DELETE /api/v1/beverages/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !BeverageRepo::delete(&state.pool, auth.user_id, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(beverage_id = id, user_id = auth.user_id, "Beverage deleted");
    state.notify_beverage_changed(auth.user_id, id, "deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_queries_name_and_category() {
        let url = search_url("獺祭 純米大吟醸", Category::Sake);
        let parsed = reqwest::Url::parse(&url).unwrap();
        assert_eq!(parsed.host_str(), Some("www.google.com"));
        assert_eq!(parsed.path(), "/search");
        let q: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        assert_eq!(q, vec![("q".to_string(), "獺祭 純米大吟醸 日本酒".to_string())]);
    }

    #[test]
    fn search_url_escapes_reserved_characters() {
        let url = search_url("A&B #1", Category::Beer);
        assert!(!url.contains('#'));
        let parsed = reqwest::Url::parse(&url).unwrap();
        assert_eq!(parsed.query_pairs().next().unwrap().1, "A&B #1 ビール");
    }
}
