//! Domain models for the admin area.

pub mod admin_user;
pub mod catalog;
pub mod session;

pub use admin_user::AdminUser;
pub use catalog::{CatalogBook, DashboardCounts, Reader};
pub use session::{CurrentAdmin, keys as session_keys};
pub use shelfwise_core::AdminRole;
