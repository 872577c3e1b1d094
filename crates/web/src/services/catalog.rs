//! Catalog browsing: paginated search, genres and book detail.

use sqlx::PgPool;
use thiserror::Error;

use shelfwise_core::BookId;

use crate::db::books::CatalogFilter;
use crate::db::{BookRepository, RepositoryError, ReviewRepository};
use crate::models::{Book, RatingSummary, Review};

/// Books per catalog page.
pub const PAGE_SIZE: i64 = 20;

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("That book is not in the catalog.")]
    BookNotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// One page of search results.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub books: Vec<Book>,
    /// 1-based page number actually shown.
    pub page: i64,
    pub total_books: i64,
    pub total_pages: i64,
}

impl CatalogPage {
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// A book with its reviews and rating aggregate.
#[derive(Debug, Clone)]
pub struct BookDetail {
    pub book: Book,
    pub rating: RatingSummary,
    pub reviews: Vec<Review>,
}

/// Number of pages needed for `total` items, at least 1.
#[must_use]
pub const fn total_pages(total: i64, per_page: i64) -> i64 {
    if total <= 0 || per_page <= 0 {
        return 1;
    }
    (total + per_page - 1) / per_page
}

/// Clamp a requested page into `1..=last`.
#[must_use]
pub fn clamp_page(requested: Option<i64>, last: i64) -> i64 {
    requested.unwrap_or(1).clamp(1, last.max(1))
}

/// Catalog service.
pub struct CatalogService<'a> {
    books: BookRepository<'a>,
    reviews: ReviewRepository<'a>,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            books: BookRepository::new(pool),
            reviews: ReviewRepository::new(pool),
        }
    }

    /// Search the catalog.
    ///
    /// Blank query and genre strings are treated as absent. Out-of-range
    /// pages are clamped.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if a query fails.
    pub async fn browse(
        &self,
        query: Option<&str>,
        genre: Option<&str>,
        page: Option<i64>,
    ) -> Result<CatalogPage, CatalogError> {
        let filter = CatalogFilter {
            query: non_blank(query),
            genre: non_blank(genre),
        };

        let total_books = self.books.count(&filter).await?;
        let total_pages = total_pages(total_books, PAGE_SIZE);
        let page = clamp_page(page, total_pages);

        let books = self
            .books
            .search(&filter, PAGE_SIZE, (page - 1) * PAGE_SIZE)
            .await?;

        Ok(CatalogPage {
            books,
            page,
            total_books,
            total_pages,
        })
    }

    /// Distinct genres for the filter dropdown.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn genres(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self.books.genres().await?)
    }

    /// Most recently added books.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Book>, CatalogError> {
        Ok(self.books.recent(limit).await?)
    }

    /// A single book.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::BookNotFound` if the book does not exist.
    pub async fn get_book(&self, id: BookId) -> Result<Book, CatalogError> {
        self.books
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::BookNotFound)
    }

    /// A book with its reviews and average rating.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::BookNotFound` if the book does not exist.
    pub async fn book_detail(&self, id: BookId) -> Result<BookDetail, CatalogError> {
        let book = self.get_book(id).await?;
        let rating = self.books.rating_summary(id).await?;
        let reviews = self.reviews.for_book(id).await?;

        Ok(BookDetail {
            book,
            rating,
            reviews,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(59, 20), 3);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(None, 3), 1);
        assert_eq!(clamp_page(Some(0), 3), 1);
        assert_eq!(clamp_page(Some(-4), 3), 1);
        assert_eq!(clamp_page(Some(2), 3), 2);
        assert_eq!(clamp_page(Some(9), 3), 3);
        assert_eq!(clamp_page(Some(9), 0), 1);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  dune ")), Some("dune".to_owned()));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
