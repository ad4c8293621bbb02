//! SakeNote domain layer.
//!
//! Pure logic shared by the database, vision and API crates: the fixed
//! beverage taxonomy and its reconciler, the rating scale, the record draft
//! and AI merge rules, the image normaliser and the list view composer.
//! Nothing in here performs I/O.

pub mod error;
pub mod listing;
pub mod photo;
pub mod rating;
pub mod record;
pub mod taxonomy;
pub mod types;
