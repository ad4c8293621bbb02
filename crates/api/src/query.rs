//! Shared query parameter types for API handlers.

use sakenote_core::error::CoreError;
use sakenote_core::listing::{ListQuery, SortOrder};
use sakenote_core::taxonomy::Category;
use serde::Deserialize;

/// `?category=&type=&sort=` for the beverage list.
///
/// Empty values and `すべて` mean "all".
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub sort: Option<SortOrder>,
}

impl ListParams {
    pub fn into_query(self) -> Result<ListQuery, CoreError> {
        let category = ListQuery::parse_filter(self.category.as_deref())
            .map(str::parse::<Category>)
            .transpose()?;
        let type_name = ListQuery::parse_filter(self.type_name.as_deref()).map(str::to_string);
        Ok(ListQuery {
            category,
            type_name,
            sort: self.sort.unwrap_or_default(),
        })
    }
}
