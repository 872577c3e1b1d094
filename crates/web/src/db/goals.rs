//! Reading goal storage.
//!
//! [`GoalStore`] is the seam between the goal engine and persistence;
//! [`PgGoalStore`] is the production implementation. Counter updates are
//! single statements so concurrent increments never lose a count.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shelfwise_core::{ReadingGoalId, UserId};

use super::{Insertion, RepositoryError};
use crate::models::ReadingGoal;

/// Persistence operations the goal engine needs.
///
/// Update methods return `None` when no goal exists for `(user_id, year)`.
#[async_trait]
pub trait GoalStore: Send + Sync {
    /// Insert a goal unless one already exists for the year.
    async fn insert_if_absent(
        &self,
        user_id: UserId,
        year: i32,
        target_books: i32,
    ) -> Result<Insertion<ReadingGoal>, RepositoryError>;

    async fn get(&self, user_id: UserId, year: i32) -> Result<Option<ReadingGoal>, RepositoryError>;

    /// All of a user's goals, most recent year first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ReadingGoal>, RepositoryError>;

    /// Add `delta` to `books_read`, flooring the result at zero.
    async fn adjust_books_read(
        &self,
        user_id: UserId,
        year: i32,
        delta: i32,
    ) -> Result<Option<ReadingGoal>, RepositoryError>;

    async fn set_books_read(
        &self,
        user_id: UserId,
        year: i32,
        books_read: i32,
    ) -> Result<Option<ReadingGoal>, RepositoryError>;

    async fn set_target(
        &self,
        user_id: UserId,
        year: i32,
        target_books: i32,
    ) -> Result<Option<ReadingGoal>, RepositoryError>;

    /// Returns `true` if a goal was deleted.
    async fn delete(&self, user_id: UserId, year: i32) -> Result<bool, RepositoryError>;
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ReadingGoalRow {
    id: i32,
    user_id: i32,
    year: i32,
    target_books: i32,
    books_read: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReadingGoalRow> for ReadingGoal {
    fn from(row: ReadingGoalRow) -> Self {
        Self {
            id: ReadingGoalId::new(row.id),
            user_id: UserId::new(row.user_id),
            year: row.year,
            target_books: row.target_books,
            books_read: row.books_read,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const GOAL_COLUMNS: &str = "id, user_id, year, target_books, books_read, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL` implementation of [`GoalStore`].
#[derive(Clone)]
pub struct PgGoalStore {
    pool: PgPool,
}

impl PgGoalStore {
    /// Create a new goal store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn update_one(
        &self,
        set_clause: &str,
        user_id: UserId,
        year: i32,
        value: i32,
    ) -> Result<Option<ReadingGoal>, RepositoryError> {
        let sql = format!(
            "UPDATE library.reading_goal SET {set_clause}, updated_at = NOW() \
             WHERE user_id = $1 AND year = $2 RETURNING {GOAL_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ReadingGoalRow>(&sql)
            .bind(user_id.as_i32())
            .bind(year)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl GoalStore for PgGoalStore {
    async fn insert_if_absent(
        &self,
        user_id: UserId,
        year: i32,
        target_books: i32,
    ) -> Result<Insertion<ReadingGoal>, RepositoryError> {
        let sql = format!(
            "INSERT INTO library.reading_goal (user_id, year, target_books) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, year) DO NOTHING \
             RETURNING {GOAL_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ReadingGoalRow>(&sql)
            .bind(user_id.as_i32())
            .bind(year)
            .bind(target_books)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "reading goal already exists"))?;

        Ok(Insertion::from_returning(row.map(Into::into)))
    }

    async fn get(
        &self,
        user_id: UserId,
        year: i32,
    ) -> Result<Option<ReadingGoal>, RepositoryError> {
        let sql = format!(
            "SELECT {GOAL_COLUMNS} FROM library.reading_goal WHERE user_id = $1 AND year = $2"
        );

        let row = sqlx::query_as::<_, ReadingGoalRow>(&sql)
            .bind(user_id.as_i32())
            .bind(year)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ReadingGoal>, RepositoryError> {
        let sql = format!(
            "SELECT {GOAL_COLUMNS} FROM library.reading_goal WHERE user_id = $1 ORDER BY year DESC"
        );

        let rows = sqlx::query_as::<_, ReadingGoalRow>(&sql)
            .bind(user_id.as_i32())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn adjust_books_read(
        &self,
        user_id: UserId,
        year: i32,
        delta: i32,
    ) -> Result<Option<ReadingGoal>, RepositoryError> {
        self.update_one("books_read = GREATEST(books_read + $3, 0)", user_id, year, delta)
            .await
    }

    async fn set_books_read(
        &self,
        user_id: UserId,
        year: i32,
        books_read: i32,
    ) -> Result<Option<ReadingGoal>, RepositoryError> {
        self.update_one("books_read = $3", user_id, year, books_read)
            .await
    }

    async fn set_target(
        &self,
        user_id: UserId,
        year: i32,
        target_books: i32,
    ) -> Result<Option<ReadingGoal>, RepositoryError> {
        self.update_one("target_books = $3", user_id, year, target_books)
            .await
    }

    async fn delete(&self, user_id: UserId, year: i32) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM library.reading_goal WHERE user_id = $1 AND year = $2")
                .bind(user_id.as_i32())
                .bind(year)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
