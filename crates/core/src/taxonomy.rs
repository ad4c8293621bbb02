//! The fixed beverage taxonomy and the reconciler that maps untrusted
//! classifier output onto it.
//!
//! There are exactly five categories. Each has an ordered list of types (the
//! first entry is the default) and a list of lower-case keywords used for
//! fuzzy matching of free-text labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// A beverage category. Serialized as its Japanese key (e.g. `"日本酒"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "ワイン")]
    Wine,
    #[serde(rename = "日本酒")]
    Sake,
    #[serde(rename = "焼酎")]
    Shochu,
    #[serde(rename = "ビール")]
    Beer,
    #[serde(rename = "その他")]
    Other,
}

/// The category used when nothing else matches.
pub const CATCH_ALL: Category = Category::Other;

/// Categories in declaration order. Reconciliation scans in this order.
pub const CATEGORIES: [Category; 5] = [
    Category::Wine,
    Category::Sake,
    Category::Shochu,
    Category::Beer,
    Category::Other,
];

impl Category {
    /// The canonical key stored in the database and returned by the AI.
    pub const fn key(self) -> &'static str {
        match self {
            Category::Wine => "ワイン",
            Category::Sake => "日本酒",
            Category::Shochu => "焼酎",
            Category::Beer => "ビール",
            Category::Other => "その他",
        }
    }

    /// Allowed types, in display order.
    pub const fn types(self) -> &'static [&'static str] {
        match self {
            Category::Wine => &["赤", "白", "ロゼ", "スパークリング", "その他"],
            Category::Sake => &[
                "純米大吟醸",
                "純米吟醸",
                "純米",
                "特別純米",
                "大吟醸",
                "吟醸",
                "本醸造",
                "特別本醸造",
                "普通",
                "その他",
            ],
            Category::Shochu => &["芋", "麦", "米", "その他"],
            Category::Beer => &["ラガー", "エール", "その他"],
            Category::Other => &["ウイスキー", "果実酒", "その他"],
        }
    }

    /// Lower-case keywords matched as substrings of a lower-cased label.
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::Wine => &["wine", "ワイン", "赤", "白", "ロゼ", "brut", "chateau", "domaine"],
            Category::Sake => &["sake", "日本酒", "清酒", "純米", "吟醸", "本醸造"],
            Category::Shochu => &["shochu", "焼酎", "泡盛", "芋", "麦"],
            Category::Beer => &["beer", "ビール", "発泡酒", "ipa", "lager", "ale", "stout"],
            Category::Other => &[
                "whisky",
                "whiskey",
                "ウイスキー",
                "liqueur",
                "リキュール",
                "gin",
                "vodka",
                "rum",
                "tequila",
                "梅酒",
            ],
        }
    }

    /// The first declared type, selected whenever the category changes.
    pub fn default_type(self) -> &'static str {
        self.types()[0]
    }

    /// Whether `type_name` is one of this category's declared types.
    pub fn has_type(self, type_name: &str) -> bool {
        self.types().contains(&type_name)
    }

    /// Look up a category by its exact key.
    pub fn from_key(key: &str) -> Option<Self> {
        CATEGORIES.into_iter().find(|c| c.key() == key)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_key(s).ok_or_else(|| {
            let keys: Vec<&str> = CATEGORIES.iter().map(|c| c.key()).collect();
            CoreError::Validation(format!(
                "Invalid category '{s}'. Must be one of: {}",
                keys.join(", ")
            ))
        })
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// A category/type pair produced by [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub category: Category,
    pub type_name: String,
}

/// Map a free-text category label onto the taxonomy.
///
/// 1. An exact key match wins.
/// 2. Otherwise the first category (in declaration order) whose key is a
///    substring of the label, or one of whose keywords is a substring of the
///    lower-cased label.
/// 3. Otherwise [`CATCH_ALL`].
pub fn reconcile_category(label: &str) -> Category {
    if let Some(exact) = Category::from_key(label) {
        return exact;
    }

    let lowered = label.to_lowercase();
    CATEGORIES
        .into_iter()
        .find(|c| label.contains(c.key()) || c.keywords().iter().any(|k| lowered.contains(k)))
        .unwrap_or(CATCH_ALL)
}

/// Pick the type for a reconciled category.
///
/// A non-empty classifier type is kept verbatim, even when it is not in the
/// category's list. An absent or empty type falls back to the default.
pub fn reconcile_type(category: Category, label: Option<&str>) -> String {
    match label {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => category.default_type().to_string(),
    }
}

/// Reconcile a classifier's category and type labels in one step.
pub fn reconcile(category_label: &str, type_label: Option<&str>) -> Reconciled {
    let category = reconcile_category(category_label);
    Reconciled {
        category,
        type_name: reconcile_type(category, type_label),
    }
}

// ---------------------------------------------------------------------------
// Serializable view
// ---------------------------------------------------------------------------

/// One taxonomy entry as exposed to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyEntry {
    pub key: &'static str,
    pub types: &'static [&'static str],
    pub keywords: &'static [&'static str],
    pub default_type: &'static str,
}

/// The whole taxonomy in declaration order.
pub fn taxonomy() -> Vec<TaxonomyEntry> {
    CATEGORIES
        .into_iter()
        .map(|c| TaxonomyEntry {
            key: c.key(),
            types: c.types(),
            keywords: c.keywords(),
            default_type: c.default_type(),
        })
        .collect()
}
