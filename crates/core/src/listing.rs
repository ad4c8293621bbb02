//! List view composition: category/type filters and sort order.

use serde::{Deserialize, Serialize};

use crate::rating::Rating;
use crate::taxonomy::Category;
use crate::types::Timestamp;

/// Filter label meaning "no filter" in list views.
pub const ALL_FILTER: &str = "すべて";

/// Anything that can be shown in the list view.
pub trait Listable {
    fn category_key(&self) -> &str;
    fn type_name(&self) -> &str;
    fn rating(&self) -> Rating;
    fn created_at(&self) -> Option<Timestamp>;
}

/// List sort order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    /// Newest first.
    #[default]
    DateDesc,
    RatingDesc,
    RatingAsc,
}

/// Current list filters. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub category: Option<Category>,
    pub type_name: Option<String>,
    pub sort: SortOrder,
}

impl ListQuery {
    /// Parse a filter value, treating empty and [`ALL_FILTER`] as "all".
    pub fn parse_filter(value: Option<&str>) -> Option<&str> {
        value.filter(|v| !v.is_empty() && *v != ALL_FILTER)
    }

    fn matches<T: Listable>(&self, item: &T) -> bool {
        if let Some(category) = self.category {
            if item.category_key() != category.key() {
                return false;
            }
        }
        match &self.type_name {
            Some(t) => item.type_name() == t,
            None => true,
        }
    }
}

/// Filter and order `items` for display.
///
/// The sort is stable: items with equal keys keep their source order.
/// Items without a creation time sort as oldest.
pub fn compose<'a, T: Listable>(items: &'a [T], query: &ListQuery) -> Vec<&'a T> {
    let mut view: Vec<&T> = items.iter().filter(|item| query.matches(*item)).collect();
    match query.sort {
        SortOrder::DateDesc => view.sort_by(|a, b| b.created_at().cmp(&a.created_at())),
        SortOrder::RatingDesc => view.sort_by(|a, b| b.rating().cmp(&a.rating())),
        SortOrder::RatingAsc => view.sort_by(|a, b| a.rating().cmp(&b.rating())),
    }
    view
}
