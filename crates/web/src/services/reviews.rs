//! Book reviews: one rating per reader and book, with optional text.

use sqlx::PgPool;
use thiserror::Error;

use shelfwise_core::{BookId, UserId};

use crate::db::{RepositoryError, ReviewRepository};
use crate::models::Review;

/// Maximum review text length, in characters.
pub const MAX_REVIEW_LENGTH: usize = 5000;

/// Errors from review operations.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Ratings must be between 1 and 5 stars.")]
    InvalidRating,

    #[error("Reviews can be at most {max} characters.", max = MAX_REVIEW_LENGTH)]
    TooLong,

    #[error("That book is not in the catalog.")]
    BookNotFound,

    #[error("You haven't reviewed that book.")]
    NotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ReviewError {
    /// Short code carried in `?error=` redirects.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidRating => "invalid_rating",
            Self::TooLong => "review_too_long",
            Self::BookNotFound => "book_not_found",
            Self::NotFound => "review_not_found",
            Self::Repository(_) => "server_error",
        }
    }
}

/// Check a rating and normalize review text (trimmed, blank becomes `None`).
///
/// # Errors
///
/// Returns `ReviewError::InvalidRating` or `ReviewError::TooLong`.
pub fn validate_review(rating: i16, body: Option<&str>) -> Result<Option<String>, ReviewError> {
    if !(1..=5).contains(&rating) {
        return Err(ReviewError::InvalidRating);
    }

    let body = body.map(str::trim).filter(|b| !b.is_empty());
    if body.is_some_and(|b| b.chars().count() > MAX_REVIEW_LENGTH) {
        return Err(ReviewError::TooLong);
    }

    Ok(body.map(str::to_owned))
}

/// Review service.
pub struct ReviewService<'a> {
    reviews: ReviewRepository<'a>,
}

impl<'a> ReviewService<'a> {
    /// Create a new review service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            reviews: ReviewRepository::new(pool),
        }
    }

    /// Write or replace the user's review of a book.
    ///
    /// # Errors
    ///
    /// Returns a validation variant for a bad rating or body.
    /// Returns `ReviewError::BookNotFound` if the book does not exist.
    pub async fn upsert_review(
        &self,
        user_id: UserId,
        book_id: BookId,
        rating: i16,
        body: Option<&str>,
    ) -> Result<Review, ReviewError> {
        let body = validate_review(rating, body)?;

        let review = self
            .reviews
            .upsert(user_id, book_id, rating, body.as_deref())
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ReviewError::BookNotFound,
                other => ReviewError::Repository(other),
            })?;

        tracing::info!(user_id = %user_id, book_id = %book_id, rating, "Review saved");
        Ok(review)
    }

    /// Delete the user's review of a book.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::NotFound` if there is no such review.
    pub async fn delete_review(&self, user_id: UserId, book_id: BookId) -> Result<(), ReviewError> {
        if self.reviews.delete(user_id, book_id).await? {
            Ok(())
        } else {
            Err(ReviewError::NotFound)
        }
    }

    /// The user's own review of a book, if any.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Repository` if the query fails.
    pub async fn own_review(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<Option<Review>, ReviewError> {
        Ok(self.reviews.get(user_id, book_id).await?)
    }

    /// All reviews of a book, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Repository` if the query fails.
    pub async fn reviews_for_book(&self, book_id: BookId) -> Result<Vec<Review>, ReviewError> {
        Ok(self.reviews.for_book(book_id).await?)
    }

    /// All of a user's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Repository` if the query fails.
    pub async fn reviews_by_user(&self, user_id: UserId) -> Result<Vec<Review>, ReviewError> {
        Ok(self.reviews.by_user(user_id).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_range() {
        assert!(matches!(validate_review(0, None), Err(ReviewError::InvalidRating)));
        assert!(matches!(validate_review(6, None), Err(ReviewError::InvalidRating)));
        assert!(validate_review(1, None).is_ok());
        assert!(validate_review(5, None).is_ok());
    }

    #[test]
    fn test_body_normalized() {
        assert_eq!(validate_review(4, Some("  loved it ")).unwrap().as_deref(), Some("loved it"));
        assert_eq!(validate_review(4, Some("   ")).unwrap(), None);
    }

    #[test]
    fn test_body_length_limit() {
        let long = "a".repeat(MAX_REVIEW_LENGTH + 1);
        assert!(matches!(validate_review(3, Some(&long)), Err(ReviewError::TooLong)));
        let max = "a".repeat(MAX_REVIEW_LENGTH);
        assert!(validate_review(3, Some(&max)).is_ok());
    }
}
