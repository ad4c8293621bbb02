//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the table and
//! the DTOs used for inserts and patches.

pub mod beverage;
pub mod session;
pub mod user;
pub mod user_setting;
