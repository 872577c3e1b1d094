//! Business logic services for the reader site.
//!
//! # Services
//!
//! - `auth` - Registration and password login
//! - `goals` - Reading goal engine (generic over [`crate::db::GoalStore`])
//! - `bookshelf` - Shelf status and progress tracker (generic over
//!   [`crate::db::BookshelfStore`])
//! - `catalog` - Browse, search and book detail
//! - `reviews`, `clubs`, `friends` - Social features
//!
//! Each service has its own error enum whose business variants display as
//! user-facing text and map to a short `code()` for redirects.

pub mod auth;
pub mod bookshelf;
pub mod catalog;
pub mod clubs;
pub mod friends;
pub mod goals;
pub mod reviews;

pub use auth::{AuthError, AuthService};
pub use bookshelf::{BookshelfService, ShelfError};
pub use catalog::{CatalogError, CatalogService};
pub use clubs::{ClubError, ClubService};
pub use friends::{FriendError, FriendService};
pub use goals::{GoalError, ReadingGoalService};
pub use reviews::{ReviewError, ReviewService};
