//! Catalog route handlers: browse, book detail and reviews.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use shelfwise_core::{BookId, OwnershipType, ReadingStatus};

use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{CurrentUser, Review, ShelfEntry};
use crate::routes::{Flash, FlashForm, MessageQuery, empty_as_none, flash_redirect};
use crate::services::catalog::{BookDetail, CatalogPage};
use crate::services::{CatalogService, ReviewService};
use crate::state::AppState;

// =============================================================================
// Query and Form Types
// =============================================================================

/// Catalog search parameters.
#[derive(Debug, Default, Deserialize)]
pub struct BrowseQuery {
    pub q: Option<String>,
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
}

impl BrowseQuery {
    /// Query string for another page of the same search.
    #[must_use]
    pub fn page_link(&self, page: i64) -> String {
        let mut link = format!("/books?page={page}");
        if let Some(q) = self.q.as_deref().filter(|q| !q.trim().is_empty()) {
            link.push_str("&q=");
            link.push_str(&urlencoding::encode(q));
        }
        if let Some(genre) = self.genre.as_deref().filter(|g| !g.trim().is_empty()) {
            link.push_str("&genre=");
            link.push_str(&urlencoding::encode(genre));
        }
        link
    }
}

/// Review form data.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub rating: i16,
    pub body: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Catalog browse template.
#[derive(Template, WebTemplate)]
#[template(path = "books/index.html")]
pub struct BrowseTemplate {
    pub current_user: Option<CurrentUser>,
    pub results: CatalogPage,
    pub genres: Vec<String>,
    pub query: BrowseQuery,
}

/// Book detail template.
#[derive(Template, WebTemplate)]
#[template(path = "books/show.html")]
pub struct BookTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Flash,
    pub detail: BookDetail,
    /// The viewer's shelf entry for this book.
    pub shelf_entry: Option<ShelfEntry>,
    /// The viewer's own review.
    pub own_review: Option<Review>,
    pub statuses: [ReadingStatus; 3],
    pub ownerships: [OwnershipType; 3],
    pub rating_options: Vec<RatingOption>,
}

/// One choice in the star rating dropdown.
pub struct RatingOption {
    pub value: i16,
    pub selected: bool,
}

/// Five to one stars, with the reader's current rating selected.
fn rating_options(current: Option<i16>) -> Vec<RatingOption> {
    (1..=5)
        .rev()
        .map(|value| RatingOption {
            value,
            selected: current == Some(value),
        })
        .collect()
}

// =============================================================================
// Handlers
// =============================================================================

/// Browse and search the catalog.
#[instrument(skip(state, current_user))]
pub async fn browse(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<BrowseQuery>,
) -> Result<impl IntoResponse, AppError> {
    let catalog = CatalogService::new(state.pool());
    let results = catalog
        .browse(query.q.as_deref(), query.genre.as_deref(), query.page)
        .await?;
    let genres = catalog.genres().await?;

    Ok(BrowseTemplate {
        current_user,
        results,
        genres,
        query,
    })
}

/// Show a book with its reviews.
#[instrument(skip(state, current_user, query))]
pub async fn detail(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Path(id): Path<i32>,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let book_id = BookId::new(id);
    let detail = CatalogService::new(state.pool()).book_detail(book_id).await?;

    let (shelf_entry, own_review) = match &current_user {
        Some(user) => (
            state.shelf().get_entry(user.id, book_id).await?,
            ReviewService::new(state.pool())
                .own_review(user.id, book_id)
                .await?,
        ),
        None => (None, None),
    };

    let rating_options = rating_options(own_review.as_ref().map(|r| r.rating));

    Ok(BookTemplate {
        current_user,
        flash: Flash::from(&query),
        detail,
        shelf_entry,
        own_review,
        statuses: ReadingStatus::ALL,
        ownerships: OwnershipType::ALL,
        rating_options,
    })
}

/// Write or replace the reader's review.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn save_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    FlashForm(form): FlashForm<ReviewForm>,
) -> Result<Redirect, AppError> {
    let result = ReviewService::new(state.pool())
        .upsert_review(user.id, BookId::new(id), form.rating, form.body.as_deref())
        .await;
    flash_redirect(result, &format!("/books/{id}"), "review_saved")
}

/// Delete the reader's review.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    let result = ReviewService::new(state.pool())
        .delete_review(user.id, BookId::new(id))
        .await;
    flash_redirect(result, &format!("/books/{id}"), "review_deleted")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_link_keeps_filters() {
        let query = BrowseQuery {
            q: Some("le guin".to_owned()),
            genre: Some("Science Fiction".to_owned()),
            page: Some(1),
        };
        assert_eq!(
            query.page_link(2),
            "/books?page=2&q=le%20guin&genre=Science%20Fiction"
        );
    }

    #[test]
    fn test_rating_options_select_current() {
        let options = rating_options(Some(4));
        let values: Vec<i16> = options.iter().map(|o| o.value).collect();
        assert_eq!(values, vec![5, 4, 3, 2, 1]);
        assert!(options.iter().filter(|o| o.selected).all(|o| o.value == 4));
        assert!(rating_options(None).iter().all(|o| !o.selected));
    }

    #[test]
    fn test_page_link_skips_blank_filters() {
        let query = BrowseQuery {
            q: Some("  ".to_owned()),
            genre: None,
            page: None,
        };
        assert_eq!(query.page_link(3), "/books?page=3");
    }
}
