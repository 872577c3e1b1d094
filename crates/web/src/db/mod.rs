//! Database operations for the reader site.
//!
//! # Schema: `library`
//!
//! ## Tables
//!
//! - `user`, `user_password` - Reader accounts and argon2 hashes
//! - `book` - Catalog (written by the admin area, read here)
//! - `bookshelf_entry` - Per-reader shelf with status and progress
//! - `reading_goal` - Yearly targets, one per reader and year
//! - `review` - One rating per reader and book
//! - `book_club`, `club_membership`, `club_discussion`
//! - `friendship` - One row per unordered pair
//! - `session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p shelfwise-cli -- migrate web
//! ```

pub mod books;
pub mod bookshelf;
pub mod clubs;
pub mod friendships;
pub mod goals;
#[cfg(test)]
pub mod memory;
pub mod reviews;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use books::BookRepository;
pub use bookshelf::{BookshelfStore, PgBookshelfStore};
pub use clubs::ClubRepository;
pub use friendships::FriendshipRepository;
pub use goals::{GoalStore, PgGoalStore};
pub use reviews::ReviewRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity (or a row it references) was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Classify a sqlx error raised by a write.
    ///
    /// Unique violations become `Conflict`, foreign key violations become
    /// `NotFound` (the referenced row is gone), everything else stays a
    /// database error.
    pub(crate) fn from_write(err: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Self::Conflict(conflict.to_owned());
            }
            if db_err.is_foreign_key_violation() {
                return Self::NotFound;
            }
        }
        Self::Database(err)
    }
}

/// Outcome of an insert-if-absent.
///
/// Inserts of naturally keyed rows use `ON CONFLICT DO NOTHING RETURNING`,
/// so a duplicate (including one created by a concurrent request) comes back
/// as `AlreadyExists` instead of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion<T> {
    /// The row was inserted.
    Created(T),
    /// A row with the same key already existed; nothing was written.
    AlreadyExists,
}

impl<T> Insertion<T> {
    /// Build from the optional row returned by `ON CONFLICT DO NOTHING RETURNING`.
    pub fn from_returning(row: Option<T>) -> Self {
        row.map_or(Self::AlreadyExists, Self::Created)
    }

    /// Convert the created value, leaving `AlreadyExists` untouched.
    ///
    /// # Errors
    ///
    /// Returns the conversion error.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Insertion<U>, E> {
        match self {
            Self::Created(value) => f(value).map(Insertion::Created),
            Self::AlreadyExists => Ok(Insertion::AlreadyExists),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_from_returning() {
        assert_eq!(Insertion::from_returning(Some(7)), Insertion::Created(7));
        assert_eq!(Insertion::<i32>::from_returning(None), Insertion::AlreadyExists);
    }

    #[test]
    fn test_insertion_try_map() {
        let created: Insertion<i32> = Insertion::Created(2);
        let mapped: Result<Insertion<String>, ()> = created.try_map(|n| Ok(n.to_string()));
        assert_eq!(mapped.unwrap(), Insertion::Created("2".to_owned()));

        let existing: Insertion<i32> = Insertion::AlreadyExists;
        let mapped: Result<Insertion<i32>, &str> = existing.try_map(|_| Err("not called"));
        assert_eq!(mapped.unwrap(), Insertion::AlreadyExists);
    }
}
