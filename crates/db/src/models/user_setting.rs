//! Per-user settings.

use sakenote_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `user_settings` table.
///
/// `ai_api_key` is the user's own credential for the label classifier.
#[derive(Debug, Clone, FromRow)]
pub struct UserSetting {
    pub user_id: DbId,
    pub ai_api_key: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserSetting {
    pub fn has_ai_key(&self) -> bool {
        self.ai_api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}
