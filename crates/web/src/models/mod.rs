//! Domain models for the reader site.
//!
//! These are validated domain types, separate from the database row types
//! in [`crate::db`].

pub mod book;
pub mod club;
pub mod friendship;
pub mod goal;
pub mod review;
pub mod session;
pub mod shelf;
pub mod user;

pub use book::{Book, BookSummary, RatingSummary};
pub use club::{Club, ClubMember, ClubSummary, Discussion};
pub use friendship::{Friend, FriendRequest};
pub use goal::{GoalProgress, ReadingGoal};
pub use review::Review;
pub use session::{CurrentUser, keys as session_keys};
pub use shelf::{ProgressUpdate, ReadingStats, ShelfEntry, ShelfItem, ShelfStats, StatusChange};
pub use user::User;
