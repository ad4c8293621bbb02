//! Repository for the `user_settings` table.

use sakenote_core::types::DbId;
use sqlx::PgPool;

use crate::models::user_setting::UserSetting;

const COLUMNS: &str = "user_id, ai_api_key, created_at, updated_at";

pub struct UserSettingRepo;

impl UserSettingRepo {
    /// Settings for a user, or `None` if nothing was ever saved.
    pub async fn get(pool: &PgPool, user_id: DbId) -> Result<Option<UserSetting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_settings WHERE user_id = $1");
        sqlx::query_as::<_, UserSetting>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// The user's stored AI credential, if any.
    pub async fn get_ai_key(pool: &PgPool, user_id: DbId) -> Result<Option<String>, sqlx::Error> {
        Ok(Self::get(pool, user_id)
            .await?
            .and_then(|s| s.ai_api_key)
            .filter(|k| !k.is_empty()))
    }

    /// Save the AI credential, creating the settings row if needed.
    pub async fn set_ai_key(
        pool: &PgPool,
        user_id: DbId,
        api_key: &str,
    ) -> Result<UserSetting, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_settings (user_id, ai_api_key)
             VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET ai_api_key = EXCLUDED.ai_api_key
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSetting>(&query)
            .bind(user_id)
            .bind(api_key)
            .fetch_one(pool)
            .await
    }

    /// Remove the AI credential. Returns `true` if a key was cleared.
    pub async fn clear_ai_key(pool: &PgPool, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_settings SET ai_api_key = NULL
             WHERE user_id = $1 AND ai_api_key IS NOT NULL",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
