//! Handlers for `/user/settings`: the caller's own AI credential.
//!
//! The stored key is never returned in full; `GET` reports a masked form and
//! which key the analyse endpoint would use.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use sakenote_core::error::CoreError;
use sakenote_db::repositories::UserSettingRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Characters of the key kept visible when masking.
const VISIBLE_SUFFIX: usize = 4;

/// Which credential label analysis would use for this user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySource {
    User,
    Server,
    None,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiKeyStatus {
    pub has_key: bool,
    pub masked_key: Option<String>,
    pub source: KeySource,
    /// Whether a server-wide key exists to fall back on.
    pub fallback_available: bool,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AiKeyRequest {
    #[validate(length(min = 1, max = 512))]
    pub api_key: String,
}

/// `"****wxyz"`; short keys are fully hidden.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= VISIBLE_SUFFIX * 2 {
        return "****".to_string();
    }
    let suffix: String = chars[chars.len() - VISIBLE_SUFFIX..].iter().collect();
    format!("****{suffix}")
}

fn status(user_key: Option<&str>, fallback_available: bool) -> AiKeyStatus {
    let source = match (user_key, fallback_available) {
        (Some(_), _) => KeySource::User,
        (None, true) => KeySource::Server,
        (None, false) => KeySource::None,
    };
    AiKeyStatus {
        has_key: user_key.is_some(),
        masked_key: user_key.map(mask_key),
        source,
        fallback_available,
    }
}

/// GET /api/v1/user/settings/ai-key
pub async fn get_ai_key(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<AiKeyStatus>>> {
    let key = UserSettingRepo::get_ai_key(&state.pool, auth.user_id).await?;
    let fallback = state.config.vision.api_key.is_some();
    Ok(Json(DataResponse {
        data: status(key.as_deref(), fallback),
    }))
}

/// PUT /api/v1/user/settings/ai-key
pub async fn set_ai_key(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<AiKeyRequest>,
) -> AppResult<Json<DataResponse<AiKeyStatus>>> {
    let api_key = input.api_key.trim();
    if api_key.is_empty() {
        return Err(CoreError::Validation("API key must not be blank".into()).into());
    }
    input.validate().map_err(CoreError::from)?;

    let saved = UserSettingRepo::set_ai_key(&state.pool, auth.user_id, api_key).await?;
    tracing::info!(user_id = auth.user_id, "AI key saved");

    let fallback = state.config.vision.api_key.is_some();
    Ok(Json(DataResponse {
        data: status(saved.ai_api_key.as_deref(), fallback),
    }))
}

/// DELETE /api/v1/user/settings/ai-key
pub async fn clear_ai_key(State(state): State<AppState>, auth: AuthUser) -> AppResult<StatusCode> {
    let cleared = UserSettingRepo::clear_ai_key(&state.pool, auth.user_id).await?;
    tracing::info!(user_id = auth.user_id, cleared, "AI key cleared");
    Ok(StatusCode::NO_CONTENT)
}
