//! Handler for the read-only `/taxonomy` resource.

use axum::Json;
use sakenote_core::listing::{SortOrder, ALL_FILTER};
use sakenote_core::record::BeverageDraft;
use sakenote_core::taxonomy::{taxonomy, Category, TaxonomyEntry, CATCH_ALL};
use serde::Serialize;

use crate::response::DataResponse;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyResponse {
    pub categories: Vec<TaxonomyEntry>,
    pub catch_all: Category,
    /// Filter label meaning "no filter".
    pub all_filter: &'static str,
    pub sort_orders: [SortOrder; 3],
    /// The empty add form.
    pub new_record: BeverageDraft,
}

/// GET /api/v1/taxonomy
pub async fn get_taxonomy() -> Json<DataResponse<TaxonomyResponse>> {
    Json(DataResponse {
        data: TaxonomyResponse {
            categories: taxonomy(),
            catch_all: CATCH_ALL,
            all_filter: ALL_FILTER,
            sort_orders: [
                SortOrder::DateDesc,
                SortOrder::RatingDesc,
                SortOrder::RatingAsc,
            ],
            new_record: BeverageDraft::default(),
        },
    })
}
