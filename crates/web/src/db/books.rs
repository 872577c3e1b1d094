//! Catalog repository (read side).
//!
//! Books are written by the admin area; readers browse, search and filter.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shelfwise_core::{BookDetails, BookId};

use super::RepositoryError;
use crate::models::{Book, RatingSummary};

#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: i32,
    title: String,
    author: String,
    isbn: Option<String>,
    genre: Option<String>,
    description: Option<String>,
    cover_url: Option<String>,
    page_count: Option<i32>,
    published_year: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: BookId::new(row.id),
            details: BookDetails {
                title: row.title,
                author: row.author,
                isbn: row.isbn,
                genre: row.genre,
                description: row.description,
                cover_url: row.cover_url,
                page_count: row.page_count,
                published_year: row.published_year,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RatingRow {
    average: Option<f64>,
    count: i64,
}

const BOOK_COLUMNS: &str = "id, title, author, isbn, genre, description, cover_url, page_count, \
     published_year, created_at, updated_at";

/// Search text matched against title, author and ISBN, plus an exact genre.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub query: Option<String>,
    pub genre: Option<String>,
}

impl CatalogFilter {
    fn pattern(&self) -> Option<String> {
        self.query.as_deref().map(like_pattern)
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

const FILTER_CLAUSE: &str = "($1::text IS NULL OR title ILIKE $1 OR author ILIKE $1 OR isbn ILIKE $1) \
     AND ($2::text IS NULL OR genre = $2)";

/// Repository for catalog reads.
pub struct BookRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BookRepository<'a> {
    /// Create a new book repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of books matching `filter`, ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(
        &self,
        filter: &CatalogFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Book>, RepositoryError> {
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM library.book WHERE {FILTER_CLAUSE} \
             ORDER BY LOWER(title), id LIMIT $3 OFFSET $4"
        );

        let rows = sqlx::query_as::<_, BookRow>(&sql)
            .bind(filter.pattern())
            .bind(filter.genre.as_deref())
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Number of books matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, filter: &CatalogFilter) -> Result<i64, RepositoryError> {
        let sql = format!("SELECT COUNT(*) FROM library.book WHERE {FILTER_CLAUSE}");

        let (count,): (i64,) = sqlx::query_as(&sql)
            .bind(filter.pattern())
            .bind(filter.genre.as_deref())
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Get a book by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: BookId) -> Result<Option<Book>, RepositoryError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM library.book WHERE id = $1");

        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Most recently added books.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Book>, RepositoryError> {
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM library.book ORDER BY created_at DESC, id DESC LIMIT $1"
        );

        let rows = sqlx::query_as::<_, BookRow>(&sql)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Distinct genres in alphabetical order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn genres(&self) -> Result<Vec<String>, RepositoryError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT genre FROM library.book WHERE genre IS NOT NULL ORDER BY genre",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|(genre,)| genre).collect())
    }

    /// Average rating and review count for a book.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn rating_summary(&self, id: BookId) -> Result<RatingSummary, RepositoryError> {
        let row = sqlx::query_as::<_, RatingRow>(
            r"
            SELECT AVG(rating)::float8 AS average, COUNT(*) AS count
            FROM library.review
            WHERE book_id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(RatingSummary {
            average: row.average,
            count: row.count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern(" dune "), "%dune%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }
}
