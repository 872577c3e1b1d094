//! Bookshelf types.

use chrono::{DateTime, NaiveDate, Utc};

use shelfwise_core::{BookId, OwnershipType, ReadingStatus, UserId};

/// One book on one reader's shelf.
#[derive(Debug, Clone, PartialEq)]
pub struct ShelfEntry {
    pub user_id: UserId,
    pub book_id: BookId,
    pub status: ReadingStatus,
    pub ownership: OwnershipType,
    pub date_added: DateTime<Utc>,
    pub date_started: Option<NaiveDate>,
    pub date_finished: Option<NaiveDate>,
    pub current_page: Option<i32>,
    pub total_pages: Option<i32>,
    /// Percentage, 0 to 100.
    pub reading_progress: f64,
}

/// A shelf entry joined with the book fields shown on the shelf page.
#[derive(Debug, Clone, PartialEq)]
pub struct ShelfItem {
    pub entry: ShelfEntry,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub cover_url: Option<String>,
    /// Catalog page count, used when the entry has no `total_pages`.
    pub page_count: Option<i32>,
}

impl ShelfItem {
    /// Pages in this copy: the reader's own count, else the catalog's.
    #[must_use]
    pub fn pages(&self) -> Option<i32> {
        self.entry.total_pages.or(self.page_count)
    }

    /// Progress rounded for display, e.g. `"37%"`.
    #[must_use]
    pub fn display_progress(&self) -> String {
        format!("{:.0}%", self.entry.reading_progress)
    }
}

/// Entry counts per reading status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShelfStats {
    pub want_to_read: i64,
    pub reading: i64,
    pub read: i64,
    pub total: i64,
}

impl ShelfStats {
    /// Count for a single status.
    #[must_use]
    pub const fn count(&self, status: ReadingStatus) -> i64 {
        match status {
            ReadingStatus::WantToRead => self.want_to_read,
            ReadingStatus::Reading => self.reading,
            ReadingStatus::Read => self.read,
        }
    }
}

/// A reader's year in books, computed from their shelf.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadingStats {
    pub year: i32,
    pub books_finished: usize,
    pub pages_read: i64,
    /// Most frequent genre among the year's finished books.
    pub top_genre: Option<String>,
}

/// Status transition as written to storage.
///
/// Dates left as `None` keep their stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub status: ReadingStatus,
    pub date_started: Option<NaiveDate>,
    pub date_finished: Option<NaiveDate>,
}

/// Partial progress update; only `Some` fields are written.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressUpdate {
    pub current_page: Option<i32>,
    pub total_pages: Option<i32>,
    pub reading_progress: Option<f64>,
}

impl ProgressUpdate {
    /// True when the update would not change anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.current_page.is_none() && self.total_pages.is_none() && self.reading_progress.is_none()
    }
}
