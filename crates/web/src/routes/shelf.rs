//! Bookshelf route handlers.
//!
//! Forms post back here from both the shelf page and book pages; `return_to`
//! picks which page the redirect lands on.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use shelfwise_core::{BookId, OwnershipType, ReadingStatus, UserId};

use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, ShelfItem, ShelfStats};
use crate::routes::{Flash, FlashForm, MessageQuery, empty_as_none, flash_redirect};
use crate::services::bookshelf::page_progress;
use crate::services::{CatalogError, CatalogService};
use crate::state::AppState;

// =============================================================================
// Query and Form Types
// =============================================================================

/// Shelf page parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ShelfQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<ReadingStatus>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Add-to-shelf form data.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub book_id: i32,
    #[serde(default)]
    pub status: ReadingStatus,
    #[serde(default)]
    pub ownership: OwnershipType,
    pub return_to: Option<String>,
}

/// Status change form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: ReadingStatus,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date_started: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date_finished: Option<NaiveDate>,
    pub return_to: Option<String>,
}

/// Progress form data. Blank fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct ProgressForm {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub current_page: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub total_pages: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub progress: Option<f64>,
    pub return_to: Option<String>,
}

/// Ownership form data.
#[derive(Debug, Deserialize)]
pub struct OwnershipForm {
    pub ownership: OwnershipType,
    pub return_to: Option<String>,
}

impl ProgressForm {
    /// Whether the percentage has to come from pages with a total the form
    /// did not carry.
    const fn needs_known_total(&self) -> bool {
        self.progress.is_none() && self.current_page.is_some() && self.total_pages.is_none()
    }

    /// Percentage to record: the one submitted, else the page ratio when a
    /// total is known from the form or from `known_total`.
    fn derived_progress(&self, known_total: Option<i32>) -> Option<f64> {
        self.progress.or_else(|| {
            let current = self.current_page?;
            let total = self.total_pages.or(known_total)?;
            Some(page_progress(current, total))
        })
    }
}

/// Form data carrying only a return target.
#[derive(Debug, Default, Deserialize)]
pub struct ReturnForm {
    pub return_to: Option<String>,
}

/// Where a shelf form redirects: the book page if asked for, else the shelf.
fn return_path(return_to: Option<&str>, book_id: i32) -> String {
    match return_to {
        Some("book") => format!("/books/{book_id}"),
        _ => "/shelf".to_owned(),
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Bookshelf page template.
#[derive(Template, WebTemplate)]
#[template(path = "shelf/index.html")]
pub struct ShelfTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Flash,
    pub items: Vec<ShelfItem>,
    pub stats: ShelfStats,
    pub tabs: Vec<StatusTab>,
    pub statuses: [ReadingStatus; 3],
    pub ownerships: [OwnershipType; 3],
}

/// A status filter tab with its entry count.
pub struct StatusTab {
    pub status: ReadingStatus,
    pub count: i64,
    pub active: bool,
}

fn status_tabs(stats: &ShelfStats, filter: Option<ReadingStatus>) -> Vec<StatusTab> {
    ReadingStatus::ALL
        .into_iter()
        .map(|status| StatusTab {
            status,
            count: stats.count(status),
            active: filter == Some(status),
        })
        .collect()
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the reader's shelf, optionally filtered by status.
#[instrument(skip(state, user, query), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<ShelfQuery>,
) -> Result<impl IntoResponse, AppError> {
    let shelf = state.shelf();
    let mut items = shelf.get_shelf(user.id).await?;
    let stats = shelf.get_shelf_stats(user.id).await?;

    if let Some(status) = query.status {
        items.retain(|item| item.entry.status == status);
    }

    let flash = Flash::from(&MessageQuery {
        error: query.error,
        success: query.success,
    });

    Ok(ShelfTemplate {
        current_user: Some(user),
        flash,
        items,
        tabs: status_tabs(&stats, query.status),
        stats,
        statuses: ReadingStatus::ALL,
        ownerships: OwnershipType::ALL,
    })
}

/// Put a book on the shelf.
#[instrument(skip(state, user, form), fields(user_id = %user.id, book_id = form.book_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    FlashForm(form): FlashForm<AddForm>,
) -> Result<Redirect, AppError> {
    let result = state
        .shelf()
        .add_book_to_shelf(user.id, BookId::new(form.book_id), form.status, form.ownership)
        .await;

    if result.is_ok() {
        add_breadcrumb(
            "shelf",
            "Added book to shelf",
            Some(&[("book_id", &form.book_id.to_string())]),
        );
    }

    let path = return_path(form.return_to.as_deref(), form.book_id);
    flash_redirect(result, &path, "shelved")
}

/// Change the reading status of a shelved book.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(book_id): Path<i32>,
    FlashForm(form): FlashForm<StatusForm>,
) -> Result<Redirect, AppError> {
    let result = state
        .shelf()
        .update_status(
            user.id,
            BookId::new(book_id),
            form.status,
            form.date_started,
            form.date_finished,
        )
        .await;

    let path = return_path(form.return_to.as_deref(), book_id);
    flash_redirect(result, &path, "status_updated")
}

/// Total pages already known for a shelved book: the reader's own count,
/// else the catalog's page count.
async fn known_total_pages(
    state: &AppState,
    user_id: UserId,
    book_id: BookId,
) -> Result<Option<i32>, AppError> {
    let Some(entry) = state.shelf().get_entry(user_id, book_id).await? else {
        return Ok(None);
    };
    if entry.total_pages.is_some() {
        return Ok(entry.total_pages);
    }

    match CatalogService::new(state.pool()).get_book(book_id).await {
        Ok(book) => Ok(book.details.page_count),
        Err(CatalogError::BookNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Record reading progress. A page without a percentage sets the
/// percentage from the page ratio.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn update_progress(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(book_id): Path<i32>,
    FlashForm(form): FlashForm<ProgressForm>,
) -> Result<Redirect, AppError> {
    let id = BookId::new(book_id);
    let known_total = if form.needs_known_total() {
        known_total_pages(&state, user.id, id).await?
    } else {
        None
    };

    let result = state
        .shelf()
        .update_progress(
            user.id,
            id,
            form.current_page,
            form.derived_progress(known_total),
            form.total_pages,
        )
        .await;

    let path = return_path(form.return_to.as_deref(), book_id);
    flash_redirect(result, &path, "progress_updated")
}

/// Change how the reader owns the book.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn update_ownership(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(book_id): Path<i32>,
    FlashForm(form): FlashForm<OwnershipForm>,
) -> Result<Redirect, AppError> {
    let result = state
        .shelf()
        .update_ownership(user.id, BookId::new(book_id), form.ownership)
        .await;

    let path = return_path(form.return_to.as_deref(), book_id);
    flash_redirect(result, &path, "ownership_updated")
}

/// Take a book off the shelf.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(book_id): Path<i32>,
    FlashForm(form): FlashForm<ReturnForm>,
) -> Result<Redirect, AppError> {
    let result = state
        .shelf()
        .remove_from_shelf(user.id, BookId::new(book_id))
        .await;

    let path = return_path(form.return_to.as_deref(), book_id);
    flash_redirect(result, &path, "removed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_tabs() {
        let stats = ShelfStats {
            want_to_read: 4,
            reading: 2,
            read: 9,
            total: 15,
        };
        let tabs = status_tabs(&stats, Some(ReadingStatus::Reading));
        let counts: Vec<i64> = tabs.iter().map(|t| t.count).collect();
        assert_eq!(counts, vec![4, 2, 9]);
        let active: Vec<ReadingStatus> = tabs
            .iter()
            .filter(|t| t.active)
            .map(|t| t.status)
            .collect();
        assert_eq!(active, vec![ReadingStatus::Reading]);
    }

    fn progress_form(
        current_page: Option<i32>,
        total_pages: Option<i32>,
        progress: Option<f64>,
    ) -> ProgressForm {
        ProgressForm {
            current_page,
            total_pages,
            progress,
            return_to: None,
        }
    }

    fn assert_progress(actual: Option<f64>, expected: f64) {
        let actual = actual.unwrap_or(f64::NAN);
        assert!((actual - expected).abs() < f64::EPSILON, "{actual} != {expected}");
    }

    #[test]
    fn test_progress_from_submitted_pages() {
        let form = progress_form(Some(200), Some(400), None);
        assert!(!form.needs_known_total());
        assert_progress(form.derived_progress(None), 50.0);
        // The submitted total wins over a stored one
        assert_progress(form.derived_progress(Some(1000)), 50.0);
    }

    #[test]
    fn test_progress_from_known_total() {
        let form = progress_form(Some(30), None, None);
        assert!(form.needs_known_total());
        assert_progress(form.derived_progress(Some(120)), 25.0);
        assert!(form.derived_progress(None).is_none());
    }

    #[test]
    fn test_submitted_percentage_kept() {
        let form = progress_form(Some(200), Some(400), Some(10.0));
        assert!(!form.needs_known_total());
        assert_progress(form.derived_progress(Some(120)), 10.0);

        let form = progress_form(None, Some(400), None);
        assert!(!form.needs_known_total());
        assert!(form.derived_progress(None).is_none());
    }

    #[test]
    fn test_return_path() {
        assert_eq!(return_path(Some("book"), 7), "/books/7");
        assert_eq!(return_path(Some("shelf"), 7), "/shelf");
        assert_eq!(return_path(Some("https://evil.example"), 7), "/shelf");
        assert_eq!(return_path(None, 7), "/shelf");
    }
}
