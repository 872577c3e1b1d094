//! Database operations for the admin area.
//!
//! # Schemas
//!
//! - `admin` - `admin_user` (password-authenticated administrators) and
//!   `session` (tower-sessions storage)
//! - `library` - Reader accounts and the book catalog, shared with the
//!   reader site. The admin area restricts or deletes readers and writes
//!   catalog books.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p shelfwise-cli -- migrate admin
//! ```

pub mod admin_users;
pub mod books;
pub mod readers;
pub mod stats;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admin_users::AdminUserRepository;
pub use books::BookRepository;
pub use readers::ReaderRepository;
pub use stats::StatsRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Turn unique violations into `Conflict`, keep everything else.
    pub(crate) fn from_write(err: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict.to_owned());
        }
        Self::Database(err)
    }
}

/// Wrap `text` in `%` for `ILIKE`, escaping the pattern metacharacters.
#[must_use]
pub fn like_pattern(text: &str) -> String {
    let escaped = text
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
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
