//! Request handlers.
//!
//! Each submodule provides the async handler functions for one resource.
//! Handlers delegate to the repositories in `sakenote_db` and map errors
//! via [`AppError`](crate::error::AppError).

pub mod analyze;
pub mod auth;
pub mod beverages;
pub mod settings;
pub mod taxonomy;
