//! Seed the book catalog from a YAML file.
//!
//! ```yaml
//! books:
//!   - title: The Left Hand of Darkness
//!     author: Ursula K. Le Guin
//!     isbn: "9780441478125"
//!     genre: Science Fiction
//!     page_count: 304
//!     published_year: 1969
//!   - title: Piranesi
//!     author: Susanna Clarke
//! ```
//!
//! Each entry is validated like a book added in the admin area. Entries whose
//! ISBN is already in the catalog are skipped, invalid entries are reported
//! and skipped, and the command keeps going.

use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};

use shelfwise_admin::db;
use shelfwise_admin::services::{CatalogAdminError, CatalogAdminService};
use shelfwise_core::BookDetails;

/// Errors that stop a seeding run.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Could not read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Catalog error: {0}")]
    Catalog(CatalogAdminError),
}

/// Top-level shape of a seed file.
#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    books: Vec<BookDetails>,
}

/// Outcome of a seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub duplicates: usize,
    pub invalid: usize,
}

fn parse_seed_file(content: &str) -> Result<Vec<BookDetails>, SeedError> {
    let file: SeedFile = serde_yaml::from_str(content)?;
    Ok(file.books)
}

/// Add every book in `file_path` to the catalog.
///
/// # Errors
///
/// Returns `SeedError` if the database URL is missing, the file cannot be
/// read or parsed, or the database fails. Per-book validation failures and
/// duplicates are counted, not returned.
pub async fn books(file_path: &str) -> Result<SeedSummary, SeedError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| SeedError::MissingEnvVar("ADMIN_DATABASE_URL"))?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file_path.to_owned()));
    }

    info!(path = %file_path, "Loading books from file");
    let content = tokio::fs::read_to_string(path).await?;
    let books = parse_seed_file(&content)?;
    info!(books = books.len(), "Parsed seed file");

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let catalog = CatalogAdminService::new(&pool);
    let mut summary = SeedSummary::default();

    for details in books {
        let title = details.title.clone();
        match catalog.add_book(details).await {
            Ok(_) => summary.inserted += 1,
            Err(CatalogAdminError::DuplicateIsbn) => {
                warn!(title = %title, "Skipping book, ISBN already in catalog");
                summary.duplicates += 1;
            }
            Err(CatalogAdminError::Invalid(reason)) => {
                error!(title = %title, "Skipping invalid book: {reason}");
                summary.invalid += 1;
            }
            Err(other) => return Err(SeedError::Catalog(other)),
        }
    }

    info!("Seeding complete!");
    info!("  Books inserted: {}", summary.inserted);
    info!("  Duplicates skipped: {}", summary.duplicates);
    if summary.invalid > 0 {
        error!("  Invalid entries: {}", summary.invalid);
    }

    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_file() {
        let yaml = r#"
books:
  - title: Piranesi
    author: Susanna Clarke
    isbn: "9781635575637"
    page_count: 272
  - title: Kindred
    author: Octavia E. Butler
"#;
        let books = parse_seed_file(yaml).unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].page_count, Some(272));
        assert_eq!(books[1].isbn, None);
        assert_eq!(books[1].author, "Octavia E. Butler");
    }

    #[test]
    fn test_parse_empty_seed_file() {
        assert!(parse_seed_file("books: []").unwrap().is_empty());
        assert!(parse_seed_file("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_missing_author() {
        assert!(matches!(
            parse_seed_file("books:\n  - title: Untitled\n"),
            Err(SeedError::Yaml(_))
        ));
    }
}
