//! Friendship repository.
//!
//! A friendship row is stored once per unordered pair; `requester_id` is
//! whoever asked first.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shelfwise_core::UserId;

use super::{Insertion, RepositoryError};
use crate::models::{Friend, FriendRequest};

#[derive(Debug, sqlx::FromRow)]
struct FriendRow {
    user_id: i32,
    display_name: String,
    created_at: DateTime<Utc>,
}

/// Repository for friendship database operations.
pub struct FriendshipRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FriendshipRepository<'a> {
    /// Create a new friendship repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a pending request unless the pair already has a row in either
    /// direction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if either user does not exist.
    pub async fn request(
        &self,
        requester_id: UserId,
        addressee_id: UserId,
    ) -> Result<Insertion<()>, RepositoryError> {
        let row: Option<(i32,)> = sqlx::query_as(
            r"
            INSERT INTO library.friendship (requester_id, addressee_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            RETURNING requester_id
            ",
        )
        .bind(requester_id.as_i32())
        .bind(addressee_id.as_i32())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "friendship already exists"))?;

        Ok(Insertion::from_returning(row.map(|_| ())))
    }

    /// Accept a pending request sent by `requester_id` to `addressee_id`.
    ///
    /// Returns `false` if there is no such pending request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn accept(
        &self,
        requester_id: UserId,
        addressee_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE library.friendship
            SET status = 'accepted'
            WHERE requester_id = $1 AND addressee_id = $2 AND status = 'pending'
            ",
        )
        .bind(requester_id.as_i32())
        .bind(addressee_id.as_i32())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete the pair's row whatever its status or direction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(&self, a: UserId, b: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM library.friendship
            WHERE (requester_id = $1 AND addressee_id = $2)
               OR (requester_id = $2 AND addressee_id = $1)
            ",
        )
        .bind(a.as_i32())
        .bind(b.as_i32())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Accepted friends, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn friends(&self, user_id: UserId) -> Result<Vec<Friend>, RepositoryError> {
        let rows = sqlx::query_as::<_, FriendRow>(
            r#"
            SELECT u.id AS user_id, u.display_name, f.created_at
            FROM library.friendship f
            JOIN library."user" u
              ON u.id = CASE WHEN f.requester_id = $1 THEN f.addressee_id ELSE f.requester_id END
            WHERE (f.requester_id = $1 OR f.addressee_id = $1)
              AND f.status = 'accepted'
            ORDER BY LOWER(u.display_name)
            "#,
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Friend {
                user_id: UserId::new(r.user_id),
                display_name: r.display_name,
                since: r.created_at,
            })
            .collect())
    }

    /// Pending requests addressed to the user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn incoming(&self, user_id: UserId) -> Result<Vec<FriendRequest>, RepositoryError> {
        let rows = sqlx::query_as::<_, FriendRow>(
            r#"
            SELECT u.id AS user_id, u.display_name, f.created_at
            FROM library.friendship f
            JOIN library."user" u ON u.id = f.requester_id
            WHERE f.addressee_id = $1 AND f.status = 'pending'
            ORDER BY f.created_at
            "#,
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| FriendRequest {
                requester_id: UserId::new(r.user_id),
                requester_name: r.display_name,
                created_at: r.created_at,
            })
            .collect())
    }
}
