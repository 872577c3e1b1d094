//! Book catalog details and their validation.
//!
//! Both the admin book form and the CLI catalog seeder build a
//! [`BookDetails`] and run it through [`BookDetails::validated`] before
//! anything reaches the database.

use serde::{Deserialize, Serialize};

/// Errors produced when validating [`BookDetails`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BookDetailsError {
    /// A required field is blank.
    #[error("{0} is required")]
    Required(&'static str),
    /// A field exceeds its maximum length.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Field name.
        field: &'static str,
        /// Maximum allowed length.
        max: usize,
    },
    /// ISBN is not 10 or 13 characters after normalization.
    #[error("ISBN must have 10 or 13 digits")]
    InvalidIsbn,
    /// Cover URL is not an http(s) URL.
    #[error("cover URL must start with http:// or https://")]
    InvalidCoverUrl,
    /// Page count is zero or negative.
    #[error("page count must be positive")]
    InvalidPageCount,
    /// Published year is outside a plausible range.
    #[error("published year must be between {min} and {max}")]
    InvalidPublishedYear {
        /// Earliest accepted year.
        min: i32,
        /// Latest accepted year.
        max: i32,
    },
}

/// Mutable descriptive fields of a catalog book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDetails {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub page_count: Option<i32>,
    #[serde(default)]
    pub published_year: Option<i32>,
}

impl BookDetails {
    /// Maximum length of title, author and genre.
    pub const MAX_SHORT_FIELD: usize = 255;
    /// Maximum length of the description.
    pub const MAX_DESCRIPTION: usize = 10_000;
    /// Earliest accepted publication year.
    pub const MIN_YEAR: i32 = 1000;
    /// Latest accepted publication year.
    pub const MAX_YEAR: i32 = 2100;

    /// Trim every field, turn blank optional fields into `None`, normalize the
    /// ISBN and check all constraints.
    ///
    /// # Errors
    ///
    /// Returns the first [`BookDetailsError`] encountered.
    pub fn validated(self) -> Result<Self, BookDetailsError> {
        let title = required(self.title, "title")?;
        let author = required(self.author, "author")?;
        let genre = optional(self.genre);
        let description = optional(self.description);
        let cover_url = optional(self.cover_url);

        check_len(&title, "title", Self::MAX_SHORT_FIELD)?;
        check_len(&author, "author", Self::MAX_SHORT_FIELD)?;
        if let Some(genre) = &genre {
            check_len(genre, "genre", Self::MAX_SHORT_FIELD)?;
        }
        if let Some(description) = &description {
            check_len(description, "description", Self::MAX_DESCRIPTION)?;
        }

        let isbn = match optional(self.isbn) {
            Some(raw) => Some(normalize_isbn(&raw).ok_or(BookDetailsError::InvalidIsbn)?),
            None => None,
        };

        if let Some(url) = &cover_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(BookDetailsError::InvalidCoverUrl);
        }

        if self.page_count.is_some_and(|pages| pages <= 0) {
            return Err(BookDetailsError::InvalidPageCount);
        }

        if self
            .published_year
            .is_some_and(|year| !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year))
        {
            return Err(BookDetailsError::InvalidPublishedYear {
                min: Self::MIN_YEAR,
                max: Self::MAX_YEAR,
            });
        }

        Ok(Self {
            title,
            author,
            isbn,
            genre,
            description,
            cover_url,
            page_count: self.page_count,
            published_year: self.published_year,
        })
    }
}

/// Strip dashes and spaces from an ISBN and check its shape.
///
/// Accepts ISBN-10 (nine digits followed by a digit or `X`) and ISBN-13
/// (thirteen digits). Check digits are not verified; catalog data from
/// publishers is frequently off by one and rejecting it helps nobody.
#[must_use]
pub fn normalize_isbn(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let valid = match cleaned.len() {
        10 => cleaned
            .char_indices()
            .all(|(i, c)| c.is_ascii_digit() || (i == 9 && c == 'X')),
        13 => cleaned.chars().all(|c| c.is_ascii_digit()),
        _ => false,
    };

    valid.then_some(cleaned)
}

fn required(value: String, field: &'static str) -> Result<String, BookDetailsError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BookDetailsError::Required(field));
    }
    Ok(trimmed.to_owned())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn check_len(value: &str, field: &'static str, max: usize) -> Result<(), BookDetailsError> {
    if value.chars().count() > max {
        return Err(BookDetailsError::TooLong { field, max });
    }
    Ok(())
}
