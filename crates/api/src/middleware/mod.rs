//! Request extractors.
//!
//! - [`auth::AuthUser`]: the authenticated user from a Bearer token.

pub mod auth;
