//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod beverage_repo;
pub mod session_repo;
pub mod user_repo;
pub mod user_setting_repo;

pub use beverage_repo::BeverageRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
pub use user_setting_repo::UserSettingRepo;
