//! Catalog book types.

use chrono::{DateTime, Utc};

use shelfwise_core::{BookDetails, BookId};

/// A catalog book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub details: BookDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The subset of a book shown in lists and on shelves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSummary {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub cover_url: Option<String>,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.details.title.clone(),
            author: book.details.author.clone(),
            genre: book.details.genre.clone(),
            cover_url: book.details.cover_url.clone(),
        }
    }
}

/// Aggregate of all reviews for a book.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RatingSummary {
    /// Mean rating, `None` when there are no reviews.
    pub average: Option<f64>,
    pub count: i64,
}

impl RatingSummary {
    /// Average rounded to one decimal place for display, e.g. `"4.3"`.
    #[must_use]
    pub fn display_average(&self) -> Option<String> {
        self.average.map(|avg| format!("{avg:.1}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_average_rounds() {
        let summary = RatingSummary {
            average: Some(4.266_666),
            count: 3,
        };
        assert_eq!(summary.display_average().as_deref(), Some("4.3"));
        assert_eq!(RatingSummary::default().display_average(), None);
    }
}
