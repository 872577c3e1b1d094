//! Business logic services for the admin area.
//!
//! - `auth` - Admin password login and admin account creation (also used by
//!   the CLI)
//! - `catalog` - Book add/edit/delete with `BookDetails` validation

pub mod auth;
pub mod catalog;

pub use auth::{AdminAuthError, AdminAuthService};
pub use catalog::{CatalogAdminError, CatalogAdminService};
