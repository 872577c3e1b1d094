//! Reader account repository (library schema).
//!
//! The admin area never creates readers; it lists them and restricts or
//! deletes accounts. Deleting a reader cascades to their shelf, goals,
//! reviews, clubs they own and friendships.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shelfwise_core::{Email, UserId};

use super::{RepositoryError, like_pattern};
use crate::models::Reader;

#[derive(Debug, sqlx::FromRow)]
struct ReaderRow {
    id: i32,
    email: String,
    display_name: String,
    is_restricted: bool,
    shelf_count: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReaderRow> for Reader {
    type Error = RepositoryError;

    fn try_from(row: ReaderRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            display_name: row.display_name,
            is_restricted: row.is_restricted,
            shelf_count: row.shelf_count,
            created_at: row.created_at,
        })
    }
}

/// Repository for reader accounts.
pub struct ReaderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReaderRepository<'a> {
    /// Create a new reader repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Readers whose email or display name contains `query`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if an email is invalid.
    pub async fn search(
        &self,
        query: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Reader>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReaderRow>(
            r#"
            SELECT u.id, u.email, u.display_name, u.is_restricted, u.created_at,
                   (SELECT COUNT(*) FROM library.bookshelf_entry e WHERE e.user_id = u.id)
                       AS shelf_count
            FROM library."user" u
            WHERE $1::text IS NULL OR u.email ILIKE $1 OR u.display_name ILIKE $1
            ORDER BY u.created_at DESC, u.id DESC
            LIMIT $2
            "#,
        )
        .bind(query.map(like_pattern))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Set or clear the restricted flag. Returns `false` if the reader does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_restricted(
        &self,
        id: UserId,
        restricted: bool,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE library."user"
            SET is_restricted = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .bind(restricted)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a reader and everything they own. Returns `false` if the reader
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM library."user" WHERE id = $1"#)
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
