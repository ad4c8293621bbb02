//! Repository for the `beverages` table.
//!
//! Every query is scoped by `owner_id`; a record belonging to another user
//! behaves exactly like a missing one.

use sakenote_core::rating::Rating;
use sakenote_core::record::BeverageDraft;
use sakenote_core::types::DbId;
use sqlx::PgPool;

use crate::models::beverage::{Beverage, UpdateBeverage};

const COLUMNS: &str = "id, owner_id, category, type_name, name, producer, country, region, \
                        grape, shop, price_range, vintage, rating_half_points, memo, \
                        description, thumbnail, created_at, updated_at";

pub struct BeverageRepo;

impl BeverageRepo {
    /// Insert a new record for `owner_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        draft: &BeverageDraft,
    ) -> Result<Beverage, sqlx::Error> {
        let query = format!(
            "INSERT INTO beverages
                (owner_id, category, type_name, name, producer, country, region, grape,
                 shop, price_range, vintage, rating_half_points, memo, description, thumbnail)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Beverage>(&query)
            .bind(owner_id)
            .bind(draft.category.key())
            .bind(&draft.type_name)
            .bind(draft.name.trim())
            .bind(&draft.producer)
            .bind(&draft.country)
            .bind(&draft.region)
            .bind(&draft.grape)
            .bind(&draft.shop)
            .bind(&draft.price_range)
            .bind(&draft.vintage)
            .bind(draft.rating.half_points())
            .bind(&draft.memo)
            .bind(&draft.description)
            .bind(&draft.thumbnail)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        owner_id: DbId,
        id: DbId,
    ) -> Result<Option<Beverage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM beverages WHERE id = $1 AND owner_id = $2");
        sqlx::query_as::<_, Beverage>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// All records of an owner, newest first.
    pub async fn list_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Beverage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM beverages
             WHERE owner_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Beverage>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a field-level patch. Only non-`None` fields are written.
    ///
    /// Returns `None` if the record does not exist for this owner.
    pub async fn update(
        pool: &PgPool,
        owner_id: DbId,
        id: DbId,
        input: &UpdateBeverage,
    ) -> Result<Option<Beverage>, sqlx::Error> {
        let query = format!(
            "UPDATE beverages SET
                category = COALESCE($3, category),
                type_name = COALESCE($4, type_name),
                name = COALESCE($5, name),
                producer = COALESCE($6, producer),
                country = COALESCE($7, country),
                region = COALESCE($8, region),
                grape = COALESCE($9, grape),
                shop = COALESCE($10, shop),
                price_range = COALESCE($11, price_range),
                vintage = COALESCE($12, vintage),
                rating_half_points = COALESCE($13, rating_half_points),
                memo = COALESCE($14, memo),
                description = COALESCE($15, description),
                thumbnail = COALESCE($16, thumbnail)
             WHERE id = $1 AND owner_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Beverage>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(input.category.map(|c| c.key()))
            .bind(&input.type_name)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.producer)
            .bind(&input.country)
            .bind(&input.region)
            .bind(&input.grape)
            .bind(&input.shop)
            .bind(&input.price_range)
            .bind(&input.vintage)
            .bind(input.rating.map(Rating::half_points))
            .bind(&input.memo)
            .bind(&input.description)
            .bind(&input.thumbnail)
            .fetch_optional(pool)
            .await
    }

    /// Change only the rating.
    pub async fn update_rating(
        pool: &PgPool,
        owner_id: DbId,
        id: DbId,
        rating: Rating,
    ) -> Result<Option<Beverage>, sqlx::Error> {
        let query = format!(
            "UPDATE beverages SET rating_half_points = $3
             WHERE id = $1 AND owner_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Beverage>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(rating.half_points())
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a record. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, owner_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM beverages WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
