//! Beverage record model and DTOs.

use sakenote_core::error::CoreError;
use sakenote_core::listing::Listable;
use sakenote_core::rating::Rating;
use sakenote_core::record::validate_thumbnail;
use sakenote_core::taxonomy::{reconcile_category, Category};
use sakenote_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `beverages` table.
#[derive(Debug, Clone, FromRow)]
pub struct Beverage {
    pub id: DbId,
    pub owner_id: DbId,
    pub category: String,
    pub type_name: String,
    pub name: String,
    pub producer: String,
    pub country: String,
    pub region: String,
    pub grape: String,
    pub shop: String,
    pub price_range: String,
    pub vintage: String,
    pub rating_half_points: i16,
    pub memo: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Beverage {
    /// Stored category, reconciled in case the column holds a stray value.
    pub fn category(&self) -> Category {
        Category::from_key(&self.category).unwrap_or_else(|| reconcile_category(&self.category))
    }

    pub fn rating_value(&self) -> Rating {
        Rating::clamped(self.rating_half_points)
    }
}

impl Listable for Beverage {
    fn category_key(&self) -> &str {
        &self.category
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn rating(&self) -> Rating {
        self.rating_value()
    }

    fn created_at(&self) -> Option<Timestamp> {
        Some(self.created_at)
    }
}

/// Beverage as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeverageResponse {
    pub id: DbId,
    pub category: Category,
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
    pub producer: String,
    pub country: String,
    pub region: String,
    pub grape: String,
    pub shop: String,
    pub price_range: String,
    pub vintage: String,
    pub rating: Rating,
    pub memo: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub search_url: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BeverageResponse {
    pub fn new(beverage: &Beverage, search_url: String) -> Self {
        Self {
            id: beverage.id,
            category: beverage.category(),
            type_name: beverage.type_name.clone(),
            name: beverage.name.clone(),
            producer: beverage.producer.clone(),
            country: beverage.country.clone(),
            region: beverage.region.clone(),
            grape: beverage.grape.clone(),
            shop: beverage.shop.clone(),
            price_range: beverage.price_range.clone(),
            vintage: beverage.vintage.clone(),
            rating: beverage.rating_value(),
            memo: beverage.memo.clone(),
            description: beverage.description.clone(),
            thumbnail: beverage.thumbnail.clone(),
            search_url,
            created_at: beverage.created_at,
            updated_at: beverage.updated_at,
        }
    }
}

/// Field-level patch. Only provided fields are written.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBeverage {
    pub category: Option<Category>,
    #[serde(rename = "type")]
    #[validate(length(max = 100))]
    pub type_name: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 200))]
    pub producer: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 100))]
    pub region: Option<String>,
    #[validate(length(max = 200))]
    pub grape: Option<String>,
    #[validate(length(max = 200))]
    pub shop: Option<String>,
    #[validate(length(max = 100))]
    pub price_range: Option<String>,
    #[validate(length(max = 50))]
    pub vintage: Option<String>,
    pub rating: Option<Rating>,
    #[validate(length(max = 20000))]
    pub memo: Option<String>,
    #[validate(length(max = 20000))]
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

impl UpdateBeverage {
    /// Check field lengths and the thumbnail format.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        if let Some(thumbnail) = &self.thumbnail {
            validate_thumbnail(thumbnail)?;
        }
        Ok(())
    }

    /// A category change without an explicit type resets the type to the
    /// new category's default.
    pub fn resolve_type(&mut self, current_category: &str) {
        if let Some(category) = self.category {
            if self.type_name.is_none() && category.key() != current_category {
                self.type_name = Some(category.default_type().to_string());
            }
        }
    }
}
