//! Catalog editing: add, edit and delete books.

use sqlx::PgPool;
use thiserror::Error;

use shelfwise_core::{BookDetails, BookDetailsError, BookId};

use crate::db::{BookRepository, RepositoryError};
use crate::models::CatalogBook;

/// Books listed per admin catalog page.
pub const LIST_LIMIT: i64 = 100;

/// Errors from catalog edits.
#[derive(Debug, Error)]
pub enum CatalogAdminError {
    #[error("{0}")]
    Invalid(#[from] BookDetailsError),

    #[error("A book with this ISBN is already in the catalog.")]
    DuplicateIsbn,

    #[error("That book doesn't exist.")]
    NotFound,

    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CatalogAdminError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => Self::DuplicateIsbn,
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

/// Catalog editing service.
pub struct CatalogAdminService<'a> {
    books: BookRepository<'a>,
}

impl<'a> CatalogAdminService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            books: BookRepository::new(pool),
        }
    }

    /// Books matching a search, blank queries list everything.
    ///
    /// # Errors
    ///
    /// Returns `CatalogAdminError::Repository` if the query fails.
    pub async fn list(&self, query: Option<&str>) -> Result<Vec<CatalogBook>, CatalogAdminError> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        Ok(self.books.search(query, LIST_LIMIT).await?)
    }

    /// # Errors
    ///
    /// Returns `CatalogAdminError::NotFound` if the book does not exist.
    pub async fn get(&self, id: BookId) -> Result<CatalogBook, CatalogAdminError> {
        self.books
            .get_by_id(id)
            .await?
            .ok_or(CatalogAdminError::NotFound)
    }

    /// Validate and insert a book.
    ///
    /// # Errors
    ///
    /// Returns `CatalogAdminError::Invalid` or `DuplicateIsbn`.
    pub async fn add_book(&self, details: BookDetails) -> Result<CatalogBook, CatalogAdminError> {
        let details = details.validated()?;
        let book = self.books.create(&details).await?;
        tracing::info!(book_id = %book.id, title = %book.details.title, "Book added");
        Ok(book)
    }

    /// Validate and replace a book's details.
    ///
    /// # Errors
    ///
    /// Returns `CatalogAdminError::Invalid`, `DuplicateIsbn` or `NotFound`.
    pub async fn update_book(
        &self,
        id: BookId,
        details: BookDetails,
    ) -> Result<CatalogBook, CatalogAdminError> {
        let details = details.validated()?;
        let book = self.books.update(id, &details).await?;
        tracing::info!(book_id = %book.id, "Book updated");
        Ok(book)
    }

    /// # Errors
    ///
    /// Returns `CatalogAdminError::NotFound` if the book does not exist.
    pub async fn delete_book(&self, id: BookId) -> Result<(), CatalogAdminError> {
        if !self.books.delete(id).await? {
            return Err(CatalogAdminError::NotFound);
        }
        tracing::info!(book_id = %id, "Book deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_conflict_is_duplicate_isbn() {
        let err = CatalogAdminError::from(RepositoryError::Conflict("isbn".to_owned()));
        assert!(matches!(err, CatalogAdminError::DuplicateIsbn));
        let err = CatalogAdminError::from(RepositoryError::NotFound);
        assert!(matches!(err, CatalogAdminError::NotFound));
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err = CatalogAdminError::from(BookDetailsError::InvalidIsbn);
        assert_eq!(err.to_string(), "ISBN must have 10 or 13 digits");
    }
}
