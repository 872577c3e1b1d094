//! Bookshelf status and progress tracker.
//!
//! Status transitions are free-form; the only rule is date stamping. Moving
//! to `Reading` stamps `date_started` with today unless a date is supplied or
//! one is already stored, and moving to `Read` does the same for
//! `date_finished`. Storage never stamps dates itself.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Utc};
use thiserror::Error;

use shelfwise_core::{BookId, OwnershipType, ReadingStatus, UserId};

use crate::db::{BookshelfStore, Insertion, RepositoryError};
use crate::models::{ProgressUpdate, ReadingStats, ShelfEntry, ShelfItem, ShelfStats, StatusChange};

/// Errors from shelf operations.
#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("That book is not on your shelf.")]
    NotOnShelf,

    #[error("That book is already on your shelf.")]
    AlreadyOnShelf,

    #[error("That book is not in the catalog.")]
    BookNotFound,

    #[error("Page numbers cannot be negative.")]
    NegativePage,

    #[error("Total pages must be at least one.")]
    InvalidTotalPages,

    #[error("Progress must be between 0 and 100 percent.")]
    ProgressOutOfRange,

    #[error("Current page cannot be past the last page.")]
    PageBeyondTotal,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ShelfError {
    /// Short code carried in `?error=` redirects.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotOnShelf => "not_on_shelf",
            Self::AlreadyOnShelf => "already_on_shelf",
            Self::BookNotFound => "book_not_found",
            Self::NegativePage => "negative_page",
            Self::InvalidTotalPages => "invalid_total_pages",
            Self::ProgressOutOfRange => "progress_out_of_range",
            Self::PageBeyondTotal => "page_beyond_total",
            Self::Repository(_) => "server_error",
        }
    }
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Shelf operations over any [`BookshelfStore`].
pub struct BookshelfService<S> {
    store: S,
    today: fn() -> NaiveDate,
}

impl<S: BookshelfStore> BookshelfService<S> {
    /// Create a shelf service that stamps dates with the current UTC day.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_clock(store, utc_today)
    }

    /// Create a shelf service with a custom source for "today".
    #[must_use]
    pub const fn with_clock(store: S, today: fn() -> NaiveDate) -> Self {
        Self { store, today }
    }

    /// Put a book on the user's shelf.
    ///
    /// # Errors
    ///
    /// Returns `ShelfError::AlreadyOnShelf` if the book is already shelved.
    /// Returns `ShelfError::BookNotFound` if the book does not exist.
    pub async fn add_book_to_shelf(
        &self,
        user_id: UserId,
        book_id: BookId,
        status: ReadingStatus,
        ownership: OwnershipType,
    ) -> Result<ShelfEntry, ShelfError> {
        let today = (self.today)();
        let initial = StatusChange {
            status,
            date_started: (status == ReadingStatus::Reading).then_some(today),
            date_finished: (status == ReadingStatus::Read).then_some(today),
        };

        let inserted = self
            .store
            .insert_if_absent(user_id, book_id, ownership, initial)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ShelfError::BookNotFound,
                other => ShelfError::Repository(other),
            })?;

        match inserted {
            Insertion::Created(entry) => {
                tracing::info!(
                    user_id = %user_id,
                    book_id = %book_id,
                    status = %status,
                    "Book shelved"
                );
                Ok(entry)
            }
            Insertion::AlreadyExists => Err(ShelfError::AlreadyOnShelf),
        }
    }

    /// Move a shelf entry to a new status.
    ///
    /// Supplied dates are stored as given. Dates not supplied keep their
    /// stored value, except for the stamping described in the module docs.
    ///
    /// # Errors
    ///
    /// Returns `ShelfError::NotOnShelf` if the book is not shelved.
    pub async fn update_status(
        &self,
        user_id: UserId,
        book_id: BookId,
        status: ReadingStatus,
        date_started: Option<NaiveDate>,
        date_finished: Option<NaiveDate>,
    ) -> Result<ShelfEntry, ShelfError> {
        let existing = self
            .store
            .get(user_id, book_id)
            .await?
            .ok_or(ShelfError::NotOnShelf)?;

        let today = (self.today)();
        let change = StatusChange {
            status,
            date_started: date_started.or_else(|| {
                (status == ReadingStatus::Reading && existing.date_started.is_none())
                    .then_some(today)
            }),
            date_finished: date_finished.or_else(|| {
                (status == ReadingStatus::Read && existing.date_finished.is_none())
                    .then_some(today)
            }),
        };

        let entry = self
            .store
            .update_status(user_id, book_id, change)
            .await?
            .ok_or(ShelfError::NotOnShelf)?;

        tracing::info!(
            user_id = %user_id,
            book_id = %book_id,
            from = %existing.status,
            to = %status,
            "Shelf status changed"
        );
        Ok(entry)
    }

    /// Update any of current page, progress percentage and total pages.
    ///
    /// Only supplied values are written. Progress is not derived from pages
    /// here; callers that want that use [`page_progress`].
    ///
    /// # Errors
    ///
    /// Returns a validation variant for out-of-range values.
    /// Returns `ShelfError::NotOnShelf` if the book is not shelved.
    pub async fn update_progress(
        &self,
        user_id: UserId,
        book_id: BookId,
        current_page: Option<i32>,
        progress: Option<f64>,
        total_pages: Option<i32>,
    ) -> Result<ShelfEntry, ShelfError> {
        let update = ProgressUpdate {
            current_page,
            total_pages,
            reading_progress: progress,
        };
        validate_progress(&update)?;

        let entry = if update.is_empty() {
            self.store.get(user_id, book_id).await?
        } else {
            self.store.update_progress(user_id, book_id, update).await?
        };

        entry.ok_or(ShelfError::NotOnShelf)
    }

    /// Change how the user owns their copy.
    ///
    /// # Errors
    ///
    /// Returns `ShelfError::NotOnShelf` if the book is not shelved.
    pub async fn update_ownership(
        &self,
        user_id: UserId,
        book_id: BookId,
        ownership: OwnershipType,
    ) -> Result<ShelfEntry, ShelfError> {
        self.store
            .update_ownership(user_id, book_id, ownership)
            .await?
            .ok_or(ShelfError::NotOnShelf)
    }

    /// Take a book off the user's shelf.
    ///
    /// # Errors
    ///
    /// Returns `ShelfError::NotOnShelf` if the book is not shelved.
    pub async fn remove_from_shelf(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<(), ShelfError> {
        if self.store.remove(user_id, book_id).await? {
            tracing::info!(user_id = %user_id, book_id = %book_id, "Book removed from shelf");
            Ok(())
        } else {
            Err(ShelfError::NotOnShelf)
        }
    }

    /// One entry, if the book is shelved.
    ///
    /// # Errors
    ///
    /// Returns `ShelfError::Repository` if the lookup fails.
    pub async fn get_entry(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<Option<ShelfEntry>, ShelfError> {
        Ok(self.store.get(user_id, book_id).await?)
    }

    /// The user's whole shelf, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ShelfError::Repository` if the lookup fails.
    pub async fn get_shelf(&self, user_id: UserId) -> Result<Vec<ShelfItem>, ShelfError> {
        Ok(self.store.list_for_user(user_id).await?)
    }

    /// Counts per status.
    ///
    /// # Errors
    ///
    /// Returns `ShelfError::Repository` if the lookup fails.
    pub async fn get_shelf_stats(&self, user_id: UserId) -> Result<ShelfStats, ShelfError> {
        Ok(self.store.status_counts(user_id).await?)
    }
}

fn validate_progress(update: &ProgressUpdate) -> Result<(), ShelfError> {
    if update.current_page.is_some_and(|page| page < 0) {
        return Err(ShelfError::NegativePage);
    }
    if update.total_pages.is_some_and(|total| total <= 0) {
        return Err(ShelfError::InvalidTotalPages);
    }
    if update
        .reading_progress
        .is_some_and(|pct| !(0.0..=100.0).contains(&pct))
    {
        return Err(ShelfError::ProgressOutOfRange);
    }
    if let (Some(page), Some(total)) = (update.current_page, update.total_pages)
        && page > total
    {
        return Err(ShelfError::PageBeyondTotal);
    }
    Ok(())
}

/// Percentage of `total` pages reached at `current`, clamped to 0..=100.
///
/// Returns 0 when `total` is not positive.
#[must_use]
pub fn page_progress(current: i32, total: i32) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (f64::from(current) / f64::from(total) * 100.0).clamp(0.0, 100.0)
}

/// Entries with status `Reading`, most recently started first.
#[must_use]
pub fn currently_reading(shelf: &[ShelfItem]) -> Vec<&ShelfItem> {
    let mut reading: Vec<&ShelfItem> = shelf
        .iter()
        .filter(|item| item.entry.status == ReadingStatus::Reading)
        .collect();
    // None sorts before Some, so undated entries go last.
    reading.sort_by(|a, b| b.entry.date_started.cmp(&a.entry.date_started));
    reading
}

/// Up to `limit` entries with status `Read`, most recently finished first.
#[must_use]
pub fn recently_finished(shelf: &[ShelfItem], limit: usize) -> Vec<&ShelfItem> {
    let mut finished: Vec<&ShelfItem> = shelf
        .iter()
        .filter(|item| item.entry.status == ReadingStatus::Read)
        .collect();
    finished.sort_by(|a, b| b.entry.date_finished.cmp(&a.entry.date_finished));
    finished.truncate(limit);
    finished
}

/// Books finished in `year`, the pages they add up to, and the favourite
/// genre among them.
#[must_use]
pub fn reading_stats(shelf: &[ShelfItem], year: i32) -> ReadingStats {
    let finished: Vec<&ShelfItem> = shelf
        .iter()
        .filter(|item| {
            item.entry.status == ReadingStatus::Read
                && item.entry.date_finished.is_some_and(|d| d.year() == year)
        })
        .collect();

    let pages_read = finished
        .iter()
        .filter_map(|item| item.pages())
        .map(i64::from)
        .sum();

    let mut genres: BTreeMap<&str, usize> = BTreeMap::new();
    for genre in finished.iter().filter_map(|item| item.genre.as_deref()) {
        *genres.entry(genre).or_default() += 1;
    }
    // Ties go to the alphabetically first genre.
    let top_genre = genres
        .into_iter()
        .max_by(|(a_name, a_count), (b_name, b_count)| {
            a_count.cmp(b_count).then_with(|| b_name.cmp(a_name))
        })
        .map(|(name, _)| name.to_owned());

    ReadingStats {
        year,
        books_finished: finished.len(),
        pages_read,
        top_genre,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryBookshelfStore;

    const READER: UserId = UserId::new(1);
    const DUNE: BookId = BookId::new(10);
    const EMMA: BookId = BookId::new(11);
    const HOBBIT: BookId = BookId::new(12);

    fn march_15() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service() -> BookshelfService<MemoryBookshelfStore> {
        let store = MemoryBookshelfStore::default()
            .with_book(10, "Dune", Some("Science Fiction"), Some(412))
            .with_book(11, "Emma", Some("Classic"), Some(474))
            .with_book(12, "The Hobbit", Some("Fantasy"), Some(310));
        BookshelfService::with_clock(store, march_15)
    }

    #[tokio::test]
    async fn test_add_defaults_and_rejects_duplicate() {
        let shelf = service();
        let entry = shelf
            .add_book_to_shelf(READER, DUNE, ReadingStatus::default(), OwnershipType::default())
            .await
            .unwrap();
        assert_eq!(entry.status, ReadingStatus::WantToRead);
        assert_eq!(entry.ownership, OwnershipType::Physical);
        assert_eq!(entry.date_started, None);

        let err = shelf
            .add_book_to_shelf(READER, DUNE, ReadingStatus::Reading, OwnershipType::Ebook)
            .await
            .unwrap_err();
        assert!(matches!(err, ShelfError::AlreadyOnShelf));
    }

    #[tokio::test]
    async fn test_add_unknown_book() {
        let shelf = service();
        let err = shelf
            .add_book_to_shelf(
                READER,
                BookId::new(999),
                ReadingStatus::WantToRead,
                OwnershipType::Physical,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ShelfError::BookNotFound));
    }

    #[tokio::test]
    async fn test_add_as_reading_stamps_start_date() {
        let shelf = service();
        let entry = shelf
            .add_book_to_shelf(READER, DUNE, ReadingStatus::Reading, OwnershipType::Audiobook)
            .await
            .unwrap();
        assert_eq!(entry.date_started, Some(march_15()));
        assert_eq!(entry.date_finished, None);
    }

    #[tokio::test]
    async fn test_status_reading_stamps_today_once() {
        let shelf = service();
        shelf
            .add_book_to_shelf(READER, DUNE, ReadingStatus::WantToRead, OwnershipType::Physical)
            .await
            .unwrap();

        let entry = shelf
            .update_status(READER, DUNE, ReadingStatus::Reading, None, None)
            .await
            .unwrap();
        assert_eq!(entry.date_started, Some(march_15()));

        // A supplied date wins over the stored one.
        let entry = shelf
            .update_status(READER, DUNE, ReadingStatus::Reading, Some(date(2024, 1, 2)), None)
            .await
            .unwrap();
        assert_eq!(entry.date_started, Some(date(2024, 1, 2)));

        // Re-entering Reading without a date keeps the stored one.
        shelf
            .update_status(READER, DUNE, ReadingStatus::WantToRead, None, None)
            .await
            .unwrap();
        let entry = shelf
            .update_status(READER, DUNE, ReadingStatus::Reading, None, None)
            .await
            .unwrap();
        assert_eq!(entry.date_started, Some(date(2024, 1, 2)));
    }

    #[tokio::test]
    async fn test_supplied_finish_date_persists() {
        let shelf = service();
        shelf
            .add_book_to_shelf(READER, EMMA, ReadingStatus::Reading, OwnershipType::Physical)
            .await
            .unwrap();

        let finished = date(2024, 2, 29);
        let entry = shelf
            .update_status(READER, EMMA, ReadingStatus::Read, None, Some(finished))
            .await
            .unwrap();
        assert_eq!(entry.date_finished, Some(finished));

        // Later unrelated changes leave it alone.
        shelf
            .update_progress(READER, EMMA, Some(474), Some(100.0), Some(474))
            .await
            .unwrap();
        shelf
            .update_ownership(READER, EMMA, OwnershipType::Ebook)
            .await
            .unwrap();
        let entry = shelf
            .update_status(READER, EMMA, ReadingStatus::Read, None, None)
            .await
            .unwrap();
        assert_eq!(entry.date_finished, Some(finished));
        assert_eq!(entry.ownership, OwnershipType::Ebook);
    }

    #[tokio::test]
    async fn test_status_of_missing_entry() {
        let shelf = service();
        let err = shelf
            .update_status(READER, DUNE, ReadingStatus::Read, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ShelfError::NotOnShelf));
    }

    #[tokio::test]
    async fn test_progress_partial_update() {
        let shelf = service();
        shelf
            .add_book_to_shelf(READER, DUNE, ReadingStatus::Reading, OwnershipType::Physical)
            .await
            .unwrap();

        let entry = shelf
            .update_progress(READER, DUNE, Some(100), None, Some(400))
            .await
            .unwrap();
        assert_eq!(entry.current_page, Some(100));
        assert_eq!(entry.total_pages, Some(400));
        assert!(entry.reading_progress.abs() < f64::EPSILON);

        let entry = shelf
            .update_progress(READER, DUNE, None, Some(30.0), None)
            .await
            .unwrap();
        assert_eq!(entry.current_page, Some(100));
        assert!((entry.reading_progress - 30.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_progress_validation() {
        let shelf = service();
        shelf
            .add_book_to_shelf(READER, DUNE, ReadingStatus::Reading, OwnershipType::Physical)
            .await
            .unwrap();

        let cases = [
            (Some(-1), None, None),
            (None, None, Some(0)),
            (None, Some(100.5), None),
            (None, Some(-0.1), None),
            (Some(500), None, Some(400)),
        ];
        for (page, pct, total) in cases {
            assert!(
                shelf.update_progress(READER, DUNE, page, pct, total).await.is_err(),
                "{page:?} {pct:?} {total:?} should be rejected"
            );
        }
        assert!(matches!(
            shelf.update_progress(READER, DUNE, Some(500), None, Some(400)).await,
            Err(ShelfError::PageBeyondTotal)
        ));
    }

    #[tokio::test]
    async fn test_remove_from_shelf() {
        let shelf = service();
        shelf
            .add_book_to_shelf(READER, DUNE, ReadingStatus::WantToRead, OwnershipType::Physical)
            .await
            .unwrap();

        shelf.remove_from_shelf(READER, DUNE).await.unwrap();
        assert!(shelf.get_entry(READER, DUNE).await.unwrap().is_none());
        assert!(matches!(
            shelf.remove_from_shelf(READER, DUNE).await,
            Err(ShelfError::NotOnShelf)
        ));
    }

    #[tokio::test]
    async fn test_shelf_stats_and_listing() {
        let shelf = service();
        shelf
            .add_book_to_shelf(READER, DUNE, ReadingStatus::Reading, OwnershipType::Physical)
            .await
            .unwrap();
        shelf
            .add_book_to_shelf(READER, EMMA, ReadingStatus::Read, OwnershipType::Physical)
            .await
            .unwrap();
        shelf
            .add_book_to_shelf(READER, HOBBIT, ReadingStatus::WantToRead, OwnershipType::Physical)
            .await
            .unwrap();
        shelf
            .add_book_to_shelf(UserId::new(2), HOBBIT, ReadingStatus::Read, OwnershipType::Physical)
            .await
            .unwrap();

        let stats = shelf.get_shelf_stats(READER).await.unwrap();
        assert_eq!(
            stats,
            ShelfStats {
                want_to_read: 1,
                reading: 1,
                read: 1,
                total: 3
            }
        );
        assert_eq!(stats.count(ReadingStatus::Read), 1);

        let items = shelf.get_shelf(READER).await.unwrap();
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["The Hobbit", "Emma", "Dune"]);
    }

    fn item(
        title: &str,
        status: ReadingStatus,
        started: Option<NaiveDate>,
        finished: Option<NaiveDate>,
        genre: &str,
        pages: i32,
    ) -> ShelfItem {
        ShelfItem {
            entry: ShelfEntry {
                user_id: READER,
                book_id: BookId::new(1),
                status,
                ownership: OwnershipType::Physical,
                date_added: Utc::now(),
                date_started: started,
                date_finished: finished,
                current_page: None,
                total_pages: None,
                reading_progress: 0.0,
            },
            title: title.to_owned(),
            author: "Someone".to_owned(),
            genre: Some(genre.to_owned()),
            cover_url: None,
            page_count: Some(pages),
        }
    }

    fn sample_shelf() -> Vec<ShelfItem> {
        vec![
            item("A", ReadingStatus::Reading, Some(date(2024, 1, 5)), None, "Fantasy", 100),
            item("B", ReadingStatus::Reading, Some(date(2024, 3, 1)), None, "Fantasy", 100),
            item("C", ReadingStatus::Reading, None, None, "Fantasy", 100),
            item("D", ReadingStatus::Read, None, Some(date(2024, 2, 1)), "Mystery", 200),
            item("E", ReadingStatus::Read, None, Some(date(2024, 5, 1)), "Mystery", 300),
            item("F", ReadingStatus::Read, None, Some(date(2023, 12, 30)), "Fantasy", 400),
            item("G", ReadingStatus::Read, None, Some(date(2024, 4, 1)), "Biography", 50),
            item("H", ReadingStatus::WantToRead, None, None, "Fantasy", 999),
        ]
    }

    fn titles(items: &[&ShelfItem]) -> Vec<String> {
        items.iter().map(|i| i.title.clone()).collect()
    }

    #[test]
    fn test_currently_reading_orders_by_start() {
        let shelf = sample_shelf();
        assert_eq!(titles(&currently_reading(&shelf)), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_recently_finished_limit() {
        let shelf = sample_shelf();
        assert_eq!(titles(&recently_finished(&shelf, 3)), vec!["E", "G", "D"]);
        assert!(recently_finished(&shelf, 0).is_empty());
    }

    #[test]
    fn test_reading_stats_for_year() {
        let stats = reading_stats(&sample_shelf(), 2024);
        assert_eq!(stats.books_finished, 3);
        assert_eq!(stats.pages_read, 550);
        assert_eq!(stats.top_genre.as_deref(), Some("Mystery"));

        let empty = reading_stats(&sample_shelf(), 2020);
        assert_eq!(empty.books_finished, 0);
        assert_eq!(empty.top_genre, None);
    }

    #[test]
    fn test_page_progress() {
        assert!((page_progress(50, 200) - 25.0).abs() < f64::EPSILON);
        assert!(page_progress(10, 0).abs() < f64::EPSILON);
        assert!((page_progress(300, 200) - 100.0).abs() < f64::EPSILON);
        assert!(page_progress(-5, 200).abs() < f64::EPSILON);
    }
}
