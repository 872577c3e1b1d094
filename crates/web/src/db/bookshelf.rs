//! Bookshelf storage.
//!
//! [`BookshelfStore`] is the seam between the shelf tracker and persistence.
//! Partial updates use `COALESCE($n, column)` so a `NULL` parameter leaves
//! the stored value alone.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use shelfwise_core::{BookId, OwnershipType, ReadingStatus, UserId};

use super::{Insertion, RepositoryError};
use crate::models::{ProgressUpdate, ShelfEntry, ShelfItem, ShelfStats, StatusChange};

/// Persistence operations the shelf tracker needs.
///
/// Update methods return `None` when the book is not on the user's shelf.
#[async_trait]
pub trait BookshelfStore: Send + Sync {
    /// Put a book on a shelf unless it is already there.
    ///
    /// Fails with [`RepositoryError::NotFound`] if the book does not exist.
    async fn insert_if_absent(
        &self,
        user_id: UserId,
        book_id: BookId,
        ownership: OwnershipType,
        initial: StatusChange,
    ) -> Result<Insertion<ShelfEntry>, RepositoryError>;

    async fn get(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<Option<ShelfEntry>, RepositoryError>;

    async fn update_status(
        &self,
        user_id: UserId,
        book_id: BookId,
        change: StatusChange,
    ) -> Result<Option<ShelfEntry>, RepositoryError>;

    async fn update_progress(
        &self,
        user_id: UserId,
        book_id: BookId,
        update: ProgressUpdate,
    ) -> Result<Option<ShelfEntry>, RepositoryError>;

    async fn update_ownership(
        &self,
        user_id: UserId,
        book_id: BookId,
        ownership: OwnershipType,
    ) -> Result<Option<ShelfEntry>, RepositoryError>;

    /// Returns `true` if an entry was removed.
    async fn remove(&self, user_id: UserId, book_id: BookId) -> Result<bool, RepositoryError>;

    /// Every entry on the shelf with its book, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ShelfItem>, RepositoryError>;

    async fn status_counts(&self, user_id: UserId) -> Result<ShelfStats, RepositoryError>;
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ShelfEntryRow {
    user_id: i32,
    book_id: i32,
    status: ReadingStatus,
    ownership: OwnershipType,
    date_added: DateTime<Utc>,
    date_started: Option<NaiveDate>,
    date_finished: Option<NaiveDate>,
    current_page: Option<i32>,
    total_pages: Option<i32>,
    reading_progress: f64,
}

impl From<ShelfEntryRow> for ShelfEntry {
    fn from(row: ShelfEntryRow) -> Self {
        Self {
            user_id: UserId::new(row.user_id),
            book_id: BookId::new(row.book_id),
            status: row.status,
            ownership: row.ownership,
            date_added: row.date_added,
            date_started: row.date_started,
            date_finished: row.date_finished,
            current_page: row.current_page,
            total_pages: row.total_pages,
            reading_progress: row.reading_progress,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ShelfItemRow {
    #[sqlx(flatten)]
    entry: ShelfEntryRow,
    title: String,
    author: String,
    genre: Option<String>,
    cover_url: Option<String>,
    page_count: Option<i32>,
}

impl From<ShelfItemRow> for ShelfItem {
    fn from(row: ShelfItemRow) -> Self {
        Self {
            entry: row.entry.into(),
            title: row.title,
            author: row.author,
            genre: row.genre,
            cover_url: row.cover_url,
            page_count: row.page_count,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatusCountsRow {
    want_to_read: i64,
    reading: i64,
    read: i64,
    total: i64,
}

const ENTRY_COLUMNS: &str = "user_id, book_id, status, ownership, date_added, date_started, \
     date_finished, current_page, total_pages, reading_progress";

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL` implementation of [`BookshelfStore`].
#[derive(Clone)]
pub struct PgBookshelfStore {
    pool: PgPool,
}

impl PgBookshelfStore {
    /// Create a new bookshelf store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookshelfStore for PgBookshelfStore {
    async fn insert_if_absent(
        &self,
        user_id: UserId,
        book_id: BookId,
        ownership: OwnershipType,
        initial: StatusChange,
    ) -> Result<Insertion<ShelfEntry>, RepositoryError> {
        let sql = format!(
            "INSERT INTO library.bookshelf_entry \
                 (user_id, book_id, status, ownership, date_started, date_finished) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (user_id, book_id) DO NOTHING \
             RETURNING {ENTRY_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ShelfEntryRow>(&sql)
            .bind(user_id.as_i32())
            .bind(book_id.as_i32())
            .bind(initial.status)
            .bind(ownership)
            .bind(initial.date_started)
            .bind(initial.date_finished)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "book already on shelf"))?;

        Ok(Insertion::from_returning(row.map(Into::into)))
    }

    async fn get(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<Option<ShelfEntry>, RepositoryError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM library.bookshelf_entry \
             WHERE user_id = $1 AND book_id = $2"
        );

        let row = sqlx::query_as::<_, ShelfEntryRow>(&sql)
            .bind(user_id.as_i32())
            .bind(book_id.as_i32())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn update_status(
        &self,
        user_id: UserId,
        book_id: BookId,
        change: StatusChange,
    ) -> Result<Option<ShelfEntry>, RepositoryError> {
        let sql = format!(
            "UPDATE library.bookshelf_entry \
             SET status = $3, \
                 date_started = COALESCE($4, date_started), \
                 date_finished = COALESCE($5, date_finished) \
             WHERE user_id = $1 AND book_id = $2 \
             RETURNING {ENTRY_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ShelfEntryRow>(&sql)
            .bind(user_id.as_i32())
            .bind(book_id.as_i32())
            .bind(change.status)
            .bind(change.date_started)
            .bind(change.date_finished)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn update_progress(
        &self,
        user_id: UserId,
        book_id: BookId,
        update: ProgressUpdate,
    ) -> Result<Option<ShelfEntry>, RepositoryError> {
        let sql = format!(
            "UPDATE library.bookshelf_entry \
             SET current_page = COALESCE($3, current_page), \
                 total_pages = COALESCE($4, total_pages), \
                 reading_progress = COALESCE($5, reading_progress) \
             WHERE user_id = $1 AND book_id = $2 \
             RETURNING {ENTRY_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ShelfEntryRow>(&sql)
            .bind(user_id.as_i32())
            .bind(book_id.as_i32())
            .bind(update.current_page)
            .bind(update.total_pages)
            .bind(update.reading_progress)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn update_ownership(
        &self,
        user_id: UserId,
        book_id: BookId,
        ownership: OwnershipType,
    ) -> Result<Option<ShelfEntry>, RepositoryError> {
        let sql = format!(
            "UPDATE library.bookshelf_entry SET ownership = $3 \
             WHERE user_id = $1 AND book_id = $2 \
             RETURNING {ENTRY_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ShelfEntryRow>(&sql)
            .bind(user_id.as_i32())
            .bind(book_id.as_i32())
            .bind(ownership)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn remove(&self, user_id: UserId, book_id: BookId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM library.bookshelf_entry WHERE user_id = $1 AND book_id = $2",
        )
        .bind(user_id.as_i32())
        .bind(book_id.as_i32())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ShelfItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, ShelfItemRow>(
            r"
            SELECT e.user_id, e.book_id, e.status, e.ownership, e.date_added,
                   e.date_started, e.date_finished, e.current_page, e.total_pages,
                   e.reading_progress,
                   b.title, b.author, b.genre, b.cover_url, b.page_count
            FROM library.bookshelf_entry e
            JOIN library.book b ON b.id = e.book_id
            WHERE e.user_id = $1
            ORDER BY e.date_added DESC, e.book_id DESC
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn status_counts(&self, user_id: UserId) -> Result<ShelfStats, RepositoryError> {
        let row = sqlx::query_as::<_, StatusCountsRow>(
            r"
            SELECT COUNT(*) FILTER (WHERE status = 'want_to_read') AS want_to_read,
                   COUNT(*) FILTER (WHERE status = 'reading') AS reading,
                   COUNT(*) FILTER (WHERE status = 'read') AS read,
                   COUNT(*) AS total
            FROM library.bookshelf_entry
            WHERE user_id = $1
            ",
        )
        .bind(user_id.as_i32())
        .fetch_one(&self.pool)
        .await?;

        Ok(ShelfStats {
            want_to_read: row.want_to_read,
            reading: row.reading,
            read: row.read,
            total: row.total,
        })
    }
}
