//! Review repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shelfwise_core::{BookId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::Review;

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    user_id: i32,
    book_id: i32,
    reviewer_name: String,
    book_title: String,
    rating: i16,
    body: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: ReviewId::new(row.id),
            user_id: UserId::new(row.user_id),
            book_id: BookId::new(row.book_id),
            reviewer_name: row.reviewer_name,
            book_title: row.book_title,
            rating: row.rating,
            body: row.body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const REVIEW_SELECT: &str = r#"
    SELECT r.id, r.user_id, r.book_id,
           u.display_name AS reviewer_name, b.title AS book_title,
           r.rating, r.body, r.created_at, r.updated_at
    FROM library.review r
    JOIN library."user" u ON u.id = r.user_id
    JOIN library.book b ON b.id = r.book_id
"#;

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Write the user's review of a book, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the book does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn upsert(
        &self,
        user_id: UserId,
        book_id: BookId,
        rating: i16,
        body: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            WITH saved AS (
                INSERT INTO library.review (user_id, book_id, rating, body)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id, book_id) DO UPDATE
                SET rating = EXCLUDED.rating, body = EXCLUDED.body, updated_at = NOW()
                RETURNING *
            )
            SELECT s.id, s.user_id, s.book_id,
                   u.display_name AS reviewer_name, b.title AS book_title,
                   s.rating, s.body, s.created_at, s.updated_at
            FROM saved s
            JOIN library."user" u ON u.id = s.user_id
            JOIN library.book b ON b.id = s.book_id
            "#,
        )
        .bind(user_id.as_i32())
        .bind(book_id.as_i32())
        .bind(rating)
        .bind(body)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "review already exists"))?;

        Ok(row.into())
    }

    /// The user's review of a book, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<Option<Review>, RepositoryError> {
        let sql = format!("{REVIEW_SELECT} WHERE r.user_id = $1 AND r.book_id = $2");

        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(user_id.as_i32())
            .bind(book_id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Returns `true` if a review was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, user_id: UserId, book_id: BookId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM library.review WHERE user_id = $1 AND book_id = $2")
            .bind(user_id.as_i32())
            .bind(book_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All reviews of a book, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_book(&self, book_id: BookId) -> Result<Vec<Review>, RepositoryError> {
        let sql = format!("{REVIEW_SELECT} WHERE r.book_id = $1 ORDER BY r.updated_at DESC");

        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(book_id.as_i32())
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// All of a user's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_user(&self, user_id: UserId) -> Result<Vec<Review>, RepositoryError> {
        let sql = format!("{REVIEW_SELECT} WHERE r.user_id = $1 ORDER BY r.updated_at DESC");

        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(user_id.as_i32())
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
