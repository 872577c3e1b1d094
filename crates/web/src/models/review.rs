//! Review types.

use chrono::{DateTime, Utc};

use shelfwise_core::{BookId, ReviewId, UserId};

/// A reader's rating of a book, optionally with text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub book_id: BookId,
    /// Author's display name (joined from `user`).
    pub reviewer_name: String,
    /// Book title (joined from `book`).
    pub book_title: String,
    /// 1 to 5.
    pub rating: i16,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Rating as filled and empty stars, e.g. `"★★★☆☆"`.
    #[must_use]
    pub fn stars(&self) -> String {
        let filled = usize::try_from(self.rating.clamp(0, 5)).unwrap_or(0);
        format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
    }
}
