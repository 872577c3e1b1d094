//! Catalog repository (write side).
//!
//! Callers validate [`BookDetails`] before writing; the repository only maps
//! the unique ISBN constraint to `Conflict`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shelfwise_core::{BookDetails, BookId};

use super::{RepositoryError, like_pattern};
use crate::models::CatalogBook;

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

impl From<BookRow> for CatalogBook {
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

const BOOK_COLUMNS: &str = "id, title, author, isbn, genre, description, cover_url, page_count, \
     published_year, created_at, updated_at";

const DUPLICATE_ISBN: &str = "a book with this ISBN already exists";

/// Repository for catalog writes.
pub struct BookRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BookRepository<'a> {
    /// Create a new book repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Books whose title, author or ISBN contains `query`, ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(
        &self,
        query: Option<&str>,
        limit: i64,
    ) -> Result<Vec<CatalogBook>, RepositoryError> {
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM library.book \
             WHERE $1::text IS NULL OR title ILIKE $1 OR author ILIKE $1 OR isbn ILIKE $1 \
             ORDER BY LOWER(title), id LIMIT $2"
        );

        let rows = sqlx::query_as::<_, BookRow>(&sql)
            .bind(query.map(like_pattern))
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a book by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: BookId) -> Result<Option<CatalogBook>, RepositoryError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM library.book WHERE id = $1");

        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Insert a book.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the ISBN is already cataloged.
    pub async fn create(&self, details: &BookDetails) -> Result<CatalogBook, RepositoryError> {
        let sql = format!(
            "INSERT INTO library.book \
             (title, author, isbn, genre, description, cover_url, page_count, published_year) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {BOOK_COLUMNS}"
        );

        let row = bind_details(sqlx::query_as::<_, BookRow>(&sql), details)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, DUPLICATE_ISBN))?;

        Ok(row.into())
    }

    /// Replace a book's details.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the book does not exist.
    /// Returns `RepositoryError::Conflict` if the ISBN belongs to another book.
    pub async fn update(
        &self,
        id: BookId,
        details: &BookDetails,
    ) -> Result<CatalogBook, RepositoryError> {
        let sql = format!(
            "UPDATE library.book SET \
             title = $1, author = $2, isbn = $3, genre = $4, description = $5, \
             cover_url = $6, page_count = $7, published_year = $8, updated_at = NOW() \
             WHERE id = $9 RETURNING {BOOK_COLUMNS}"
        );

        let row = bind_details(sqlx::query_as::<_, BookRow>(&sql), details)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, DUPLICATE_ISBN))?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Delete a book. Shelf entries and reviews go with it. Returns `false`
    /// if the book does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: BookId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM library.book WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

type BookQuery<'q> =
    sqlx::query::QueryAs<'q, sqlx::Postgres, BookRow, sqlx::postgres::PgArguments>;

fn bind_details<'q>(query: BookQuery<'q>, details: &'q BookDetails) -> BookQuery<'q> {
    query
        .bind(details.title.as_str())
        .bind(details.author.as_str())
        .bind(details.isbn.as_deref())
        .bind(details.genre.as_deref())
        .bind(details.description.as_deref())
        .bind(details.cover_url.as_deref())
        .bind(details.page_count)
        .bind(details.published_year)
}
