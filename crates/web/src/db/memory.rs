//! In-memory stores for unit-testing the goal and shelf services.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use shelfwise_core::{BookId, OwnershipType, ReadingGoalId, ReadingStatus, UserId};

use super::{BookshelfStore, GoalStore, Insertion, RepositoryError};
use crate::models::{ProgressUpdate, ReadingGoal, ShelfEntry, ShelfItem, ShelfStats, StatusChange};

/// [`GoalStore`] backed by a map keyed on `(user, year)`.
#[derive(Default)]
pub struct MemoryGoalStore {
    goals: Mutex<BTreeMap<(UserId, i32), ReadingGoal>>,
}

impl MemoryGoalStore {
    fn update(
        &self,
        user_id: UserId,
        year: i32,
        apply: impl FnOnce(&mut ReadingGoal),
    ) -> Option<ReadingGoal> {
        let mut goals = self.goals.lock().unwrap();
        let goal = goals.get_mut(&(user_id, year))?;
        apply(goal);
        goal.updated_at = Utc::now();
        Some(goal.clone())
    }
}

#[async_trait]
impl GoalStore for MemoryGoalStore {
    async fn insert_if_absent(
        &self,
        user_id: UserId,
        year: i32,
        target_books: i32,
    ) -> Result<Insertion<ReadingGoal>, RepositoryError> {
        let mut goals = self.goals.lock().unwrap();
        if goals.contains_key(&(user_id, year)) {
            return Ok(Insertion::AlreadyExists);
        }
        let next_id = i32::try_from(goals.len()).unwrap() + 1;
        let now = Utc::now();
        let goal = ReadingGoal {
            id: ReadingGoalId::new(next_id),
            user_id,
            year,
            target_books,
            books_read: 0,
            created_at: now,
            updated_at: now,
        };
        goals.insert((user_id, year), goal.clone());
        Ok(Insertion::Created(goal))
    }

    async fn get(
        &self,
        user_id: UserId,
        year: i32,
    ) -> Result<Option<ReadingGoal>, RepositoryError> {
        Ok(self.goals.lock().unwrap().get(&(user_id, year)).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ReadingGoal>, RepositoryError> {
        let goals = self.goals.lock().unwrap();
        Ok(goals
            .values()
            .rev()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn adjust_books_read(
        &self,
        user_id: UserId,
        year: i32,
        delta: i32,
    ) -> Result<Option<ReadingGoal>, RepositoryError> {
        Ok(self.update(user_id, year, |g| {
            g.books_read = (g.books_read + delta).max(0);
        }))
    }

    async fn set_books_read(
        &self,
        user_id: UserId,
        year: i32,
        books_read: i32,
    ) -> Result<Option<ReadingGoal>, RepositoryError> {
        Ok(self.update(user_id, year, |g| g.books_read = books_read))
    }

    async fn set_target(
        &self,
        user_id: UserId,
        year: i32,
        target_books: i32,
    ) -> Result<Option<ReadingGoal>, RepositoryError> {
        Ok(self.update(user_id, year, |g| g.target_books = target_books))
    }

    async fn delete(&self, user_id: UserId, year: i32) -> Result<bool, RepositoryError> {
        Ok(self.goals.lock().unwrap().remove(&(user_id, year)).is_some())
    }
}

/// Catalog fields the shelf listing joins in.
#[derive(Debug, Clone)]
pub struct MemoryBook {
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub page_count: Option<i32>,
}

/// [`BookshelfStore`] backed by maps; books must be registered with
/// [`MemoryBookshelfStore::with_book`] before they can be shelved.
#[derive(Default)]
pub struct MemoryBookshelfStore {
    books: Mutex<BTreeMap<BookId, MemoryBook>>,
    entries: Mutex<BTreeMap<(UserId, BookId), ShelfEntry>>,
    /// Monotonic counter so `date_added` orders by insertion.
    clock: Mutex<i64>,
}

impl MemoryBookshelfStore {
    #[must_use]
    pub fn with_book(self, id: i32, title: &str, genre: Option<&str>, pages: Option<i32>) -> Self {
        self.books.lock().unwrap().insert(
            BookId::new(id),
            MemoryBook {
                title: title.to_owned(),
                author: "Test Author".to_owned(),
                genre: genre.map(str::to_owned),
                page_count: pages,
            },
        );
        self
    }

    fn update(
        &self,
        user_id: UserId,
        book_id: BookId,
        apply: impl FnOnce(&mut ShelfEntry),
    ) -> Option<ShelfEntry> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.get_mut(&(user_id, book_id))?;
        apply(entry);
        Some(entry.clone())
    }
}

#[async_trait]
impl BookshelfStore for MemoryBookshelfStore {
    async fn insert_if_absent(
        &self,
        user_id: UserId,
        book_id: BookId,
        ownership: OwnershipType,
        initial: StatusChange,
    ) -> Result<Insertion<ShelfEntry>, RepositoryError> {
        if !self.books.lock().unwrap().contains_key(&book_id) {
            return Err(RepositoryError::NotFound);
        }
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(&(user_id, book_id)) {
            return Ok(Insertion::AlreadyExists);
        }
        let mut clock = self.clock.lock().unwrap();
        *clock += 1;
        let entry = ShelfEntry {
            user_id,
            book_id,
            status: initial.status,
            ownership,
            date_added: Utc.timestamp_opt(1_700_000_000 + *clock, 0).unwrap(),
            date_started: initial.date_started,
            date_finished: initial.date_finished,
            current_page: None,
            total_pages: None,
            reading_progress: 0.0,
        };
        entries.insert((user_id, book_id), entry.clone());
        Ok(Insertion::Created(entry))
    }

    async fn get(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<Option<ShelfEntry>, RepositoryError> {
        Ok(self.entries.lock().unwrap().get(&(user_id, book_id)).cloned())
    }

    async fn update_status(
        &self,
        user_id: UserId,
        book_id: BookId,
        change: StatusChange,
    ) -> Result<Option<ShelfEntry>, RepositoryError> {
        Ok(self.update(user_id, book_id, |e| {
            e.status = change.status;
            e.date_started = change.date_started.or(e.date_started);
            e.date_finished = change.date_finished.or(e.date_finished);
        }))
    }

    async fn update_progress(
        &self,
        user_id: UserId,
        book_id: BookId,
        update: ProgressUpdate,
    ) -> Result<Option<ShelfEntry>, RepositoryError> {
        Ok(self.update(user_id, book_id, |e| {
            e.current_page = update.current_page.or(e.current_page);
            e.total_pages = update.total_pages.or(e.total_pages);
            e.reading_progress = update.reading_progress.unwrap_or(e.reading_progress);
        }))
    }

    async fn update_ownership(
        &self,
        user_id: UserId,
        book_id: BookId,
        ownership: OwnershipType,
    ) -> Result<Option<ShelfEntry>, RepositoryError> {
        Ok(self.update(user_id, book_id, |e| e.ownership = ownership))
    }

    async fn remove(&self, user_id: UserId, book_id: BookId) -> Result<bool, RepositoryError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .remove(&(user_id, book_id))
            .is_some())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ShelfItem>, RepositoryError> {
        let books = self.books.lock().unwrap();
        let entries = self.entries.lock().unwrap();
        let mut items: Vec<ShelfItem> = entries
            .values()
            .filter(|e| e.user_id == user_id)
            .filter_map(|e| {
                let book = books.get(&e.book_id)?;
                Some(ShelfItem {
                    entry: e.clone(),
                    title: book.title.clone(),
                    author: book.author.clone(),
                    genre: book.genre.clone(),
                    cover_url: None,
                    page_count: book.page_count,
                })
            })
            .collect();
        items.sort_by(|a, b| b.entry.date_added.cmp(&a.entry.date_added));
        Ok(items)
    }

    async fn status_counts(&self, user_id: UserId) -> Result<ShelfStats, RepositoryError> {
        let entries = self.entries.lock().unwrap();
        let mut stats = ShelfStats::default();
        for entry in entries.values().filter(|e| e.user_id == user_id) {
            match entry.status {
                ReadingStatus::WantToRead => stats.want_to_read += 1,
                ReadingStatus::Reading => stats.reading += 1,
                ReadingStatus::Read => stats.read += 1,
            }
            stats.total += 1;
        }
        Ok(stats)
    }
}
