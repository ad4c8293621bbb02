//! Label photo upload: normalisation and AI analysis.
//!
//! Both endpoints take `multipart/form-data` with an `image` file part.
//! Nothing here writes to the database; the client submits the returned
//! draft through `POST /beverages` once the user is happy with it.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use sakenote_core::error::CoreError;
use sakenote_core::photo::{normalize_image, ImageError, NormalizedImage};
use sakenote_core::record::BeverageDraft;
use sakenote_core::types::DbId;
use sakenote_db::repositories::UserSettingRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const IMAGE_FIELD: &str = "image";
const DRAFT_FIELD: &str = "draft";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResponse {
    /// `data:image/jpeg;base64,...`
    pub thumbnail: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    /// The submitted draft (or the empty form) with the AI result merged in
    /// and the normalised thumbnail attached.
    pub draft: BeverageDraft,
    pub width: u32,
    pub height: u32,
}

/// Parts of an upload form.
struct Upload {
    image: Vec<u8>,
    draft: Option<BeverageDraft>,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Uploaded image exceeds the size limit".into())
    } else {
        AppError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}

async fn read_upload(mut multipart: Multipart) -> AppResult<Upload> {
    let mut image = None;
    let mut draft = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some(IMAGE_FIELD) => {
                image = Some(field.bytes().await.map_err(multipart_error)?.to_vec());
            }
            Some(DRAFT_FIELD) => {
                let text = field.text().await.map_err(multipart_error)?;
                if !text.trim().is_empty() {
                    let parsed: BeverageDraft = serde_json::from_str(&text).map_err(|e| {
                        AppError::Core(CoreError::Validation(format!("Invalid draft: {e}")))
                    })?;
                    draft = Some(parsed);
                }
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| {
        AppError::BadRequest(format!("Missing multipart field '{IMAGE_FIELD}'"))
    })?;
    Ok(Upload { image, draft })
}

/// Decode and re-encode off the async runtime.
async fn normalize(bytes: Vec<u8>) -> AppResult<NormalizedImage> {
    if bytes.is_empty() {
        return Err(ImageError::Empty.into());
    }
    let normalized = tokio::task::spawn_blocking(move || normalize_image(&bytes))
        .await
        .map_err(|e| AppError::InternalError(format!("Image worker failed: {e}")))??;
    Ok(normalized)
}

/// The caller's own AI key, falling back to the server-wide key.
async fn resolve_api_key(state: &AppState, user_id: DbId) -> AppResult<String> {
    if let Some(key) = UserSettingRepo::get_ai_key(&state.pool, user_id).await? {
        return Ok(key);
    }
    state
        .config
        .vision
        .api_key
        .clone()
        .ok_or(AppError::Core(CoreError::AiKeyMissing))
}

/// POST /api/v1/beverages/normalize
pub async fn normalize_photo(
    auth: AuthUser,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<NormalizedResponse>>> {
    let upload = read_upload(multipart).await?;
    let original_bytes = upload.image.len();
    let image = normalize(upload.image).await?;
    tracing::debug!(
        user_id = auth.user_id,
        original_bytes,
        jpeg_bytes = image.jpeg.len(),
        width = image.width,
        height = image.height,
        "Photo normalised"
    );

    Ok(Json(DataResponse {
        data: NormalizedResponse {
            thumbnail: image.data_url(),
            width: image.width,
            height: image.height,
        },
    }))
}

/// POST /api/v1/beverages/analyze
///
/// Normalises the photo, asks the classifier about it and merges the answer
/// onto the submitted draft. On any AI failure the request fails, the client
/// keeps its draft as it was and the error body carries the thumbnail.
pub async fn analyze_label(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<AnalyzeResponse>>> {
    let api_key = resolve_api_key(&state, auth.user_id).await?;

    let upload = read_upload(multipart).await?;
    let image = normalize(upload.image).await?;

    let analysis = state
        .analyzer
        .analyze(&api_key, &image.base64())
        .await
        .map_err(|source| AppError::AnalysisFailed {
            source,
            thumbnail: image.data_url(),
        })?;

    let mut draft = upload.draft.unwrap_or_default();
    draft.merge_analysis(&analysis);
    draft.thumbnail = Some(image.data_url());
    tracing::info!(
        user_id = auth.user_id,
        category = %draft.category,
        type_name = %draft.type_name,
        "Label analysed"
    );

    Ok(Json(DataResponse {
        data: AnalyzeResponse {
            draft,
            width: image.width,
            height: image.height,
        },
    }))
}
