//! Beverage record draft, AI analysis merge and display rules.
//!
//! [`BeverageDraft`] is the editable shape of a record before it is
//! persisted: the add/edit form. It is what clients submit on create and
//! what the label analysis endpoint returns after merging an AI result.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::CoreError;
use crate::rating::Rating;
use crate::taxonomy::{reconcile, Category};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Prefix every stored thumbnail must carry.
pub const THUMBNAIL_PREFIX: &str = "data:image/";

/// Keys of the JSON object the classifier is asked to return.
pub const ANALYSIS_KEYS: &[&str] = &[
    "category",
    "name",
    "type",
    "country",
    "region",
    "grape",
    "producer",
    "vintage",
    "description",
    "price_estimate",
];

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// The editable fields of a beverage record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct BeverageDraft {
    pub category: Category,
    #[serde(rename = "type")]
    #[validate(length(max = 100))]
    pub type_name: String,
    #[validate(length(max = 200))]
    pub name: String,
    #[validate(length(max = 200))]
    pub producer: String,
    #[validate(length(max = 100))]
    pub country: String,
    #[validate(length(max = 100))]
    pub region: String,
    #[validate(length(max = 200))]
    pub grape: String,
    #[validate(length(max = 200))]
    pub shop: String,
    #[validate(length(max = 100))]
    pub price_range: String,
    #[validate(length(max = 50))]
    pub vintage: String,
    pub rating: Rating,
    #[validate(length(max = 20000))]
    pub memo: String,
    #[validate(length(max = 20000))]
    pub description: String,
    pub thumbnail: Option<String>,
}

impl Default for BeverageDraft {
    /// The empty add form: red wine, three stars.
    fn default() -> Self {
        Self {
            category: Category::Wine,
            type_name: Category::Wine.default_type().to_string(),
            name: String::new(),
            producer: String::new(),
            country: String::new(),
            region: String::new(),
            grape: String::new(),
            shop: String::new(),
            price_range: String::new(),
            vintage: String::new(),
            rating: Rating::default(),
            memo: String::new(),
            description: String::new(),
            thumbnail: None,
        }
    }
}

impl BeverageDraft {
    /// Switch category; the type always resets to the new category's first type.
    pub fn select_category(&mut self, category: Category) {
        self.category = category;
        self.type_name = category.default_type().to_string();
    }

    /// Check the draft is ready to be saved.
    ///
    /// A name is required; field lengths are bounded; a thumbnail, if any,
    /// must be an embedded image.
    pub fn validate_for_submit(&self) -> Result<(), CoreError> {
        self.validate()?;
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("Name is required".to_string()));
        }
        if let Some(thumbnail) = &self.thumbnail {
            validate_thumbnail(thumbnail)?;
        }
        Ok(())
    }

    /// Apply a classifier result on top of this draft.
    ///
    /// Every analysis key the classifier returned overwrites the matching
    /// field, empty strings included; missing keys leave the field alone.
    /// Category and type always go through the reconciler, and the price
    /// range is always replaced (`price_estimate`, then `priceRange`, then
    /// empty). Memo, rating, shop and thumbnail are never touched.
    pub fn merge_analysis(&mut self, analysis: &LabelAnalysis) {
        let overwrite = |target: &mut String, key: &str| {
            if let Some(value) = analysis.text(key) {
                *target = value;
            }
        };
        overwrite(&mut self.name, "name");
        overwrite(&mut self.country, "country");
        overwrite(&mut self.region, "region");
        overwrite(&mut self.grape, "grape");
        overwrite(&mut self.producer, "producer");
        overwrite(&mut self.vintage, "vintage");
        overwrite(&mut self.description, "description");

        let category_label = analysis.text("category").unwrap_or_default();
        let type_label = analysis.text("type");
        let reconciled = reconcile(&category_label, type_label.as_deref());
        self.category = reconciled.category;
        self.type_name = reconciled.type_name;

        self.price_range = analysis
            .non_empty_text("price_estimate")
            .or_else(|| analysis.non_empty_text("priceRange"))
            .unwrap_or_default();
    }
}

/// Check that a thumbnail is an embedded image payload.
pub fn validate_thumbnail(thumbnail: &str) -> Result<(), CoreError> {
    if !thumbnail.starts_with(THUMBNAIL_PREFIX) || !thumbnail.contains(";base64,") {
        return Err(CoreError::Validation(
            "Thumbnail must be a base64 image data URL".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Label analysis
// ---------------------------------------------------------------------------

/// The raw JSON object returned by the classifier.
///
/// Kept untyped so that any subset of keys, and numbers where strings were
/// expected, are tolerated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelAnalysis {
    fields: Map<String, Value>,
}

impl LabelAnalysis {
    /// Wrap a parsed JSON value. Anything but an object is rejected.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(CoreError::Validation(format!(
                "Label analysis must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Text value of `key`.
    ///
    /// Strings are returned as-is, numbers and booleans are stringified and
    /// `null` becomes empty. Missing keys and nested objects/arrays yield
    /// `None`.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null => Some(String::new()),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn non_empty_text(&self, key: &str) -> Option<String> {
        self.text(key).filter(|s| !s.is_empty())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
