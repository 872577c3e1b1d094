//! Catalog management: list, add, edit and delete books.
//!
//! Invalid submissions re-render the form with the entered values and the
//! validation message; successful writes redirect to the list.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use shelfwise_core::{BookDetails, BookId};

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{CatalogBook, CurrentAdmin};
use crate::routes::{Flash, MessageQuery};
use crate::services::{CatalogAdminError, CatalogAdminService};
use crate::state::AppState;

/// Search and message parameters.
#[derive(Debug, Default, Deserialize)]
pub struct BooksQuery {
    pub q: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Book form as submitted. Every field is text so a bad number can be
/// shown back to the admin unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_url: String,
    #[serde(default)]
    pub page_count: String,
    #[serde(default)]
    pub published_year: String,
}

impl BookForm {
    /// Convert to unvalidated details. Blank text becomes `None`; the
    /// numeric fields must parse if present.
    ///
    /// # Errors
    ///
    /// Returns the message to show when a numeric field is not a number.
    pub fn to_details(&self) -> Result<BookDetails, &'static str> {
        Ok(BookDetails {
            title: self.title.clone(),
            author: self.author.clone(),
            isbn: non_blank(&self.isbn),
            genre: non_blank(&self.genre),
            description: non_blank(&self.description),
            cover_url: non_blank(&self.cover_url),
            page_count: parse_number(&self.page_count)
                .map_err(|()| "Page count must be a whole number.")?,
            published_year: parse_number(&self.published_year)
                .map_err(|()| "Published year must be a whole number.")?,
        })
    }
}

impl From<&CatalogBook> for BookForm {
    fn from(book: &CatalogBook) -> Self {
        let d = &book.details;
        Self {
            title: d.title.clone(),
            author: d.author.clone(),
            isbn: d.isbn.clone().unwrap_or_default(),
            genre: d.genre.clone().unwrap_or_default(),
            description: d.description.clone().unwrap_or_default(),
            cover_url: d.cover_url.clone().unwrap_or_default(),
            page_count: d.page_count.map(|n| n.to_string()).unwrap_or_default(),
            published_year: d.published_year.map(|n| n.to_string()).unwrap_or_default(),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

fn parse_number(value: &str) -> Result<Option<i32>, ()> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| ())
}

/// Book list template.
#[derive(Template, WebTemplate)]
#[template(path = "books/index.html")]
pub struct BooksTemplate {
    pub current_admin: Option<CurrentAdmin>,
    pub flash: Flash,
    pub query: String,
    pub books: Vec<CatalogBook>,
}

/// Add/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "books/form.html")]
pub struct BookFormTemplate {
    pub current_admin: Option<CurrentAdmin>,
    pub flash: Flash,
    pub heading: &'static str,
    pub action: String,
    pub form: BookForm,
}

impl BookFormTemplate {
    fn new_book(admin: CurrentAdmin, form: BookForm, flash: Flash) -> Self {
        Self {
            current_admin: Some(admin),
            flash,
            heading: "Add a book",
            action: "/books".to_owned(),
            form,
        }
    }

    fn edit_book(admin: CurrentAdmin, id: BookId, form: BookForm, flash: Flash) -> Self {
        Self {
            current_admin: Some(admin),
            flash,
            heading: "Edit book",
            action: format!("/books/{id}"),
            form,
        }
    }
}

/// List and search the catalog.
///
/// GET /books?q=
#[instrument(skip(admin, state, query), fields(admin_id = %admin.id))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<BooksQuery>,
) -> Result<BooksTemplate, AppError> {
    let books = CatalogAdminService::new(state.pool())
        .list(query.q.as_deref())
        .await?;

    let flash = Flash::from(&MessageQuery {
        error: query.error,
        success: query.success,
    });

    Ok(BooksTemplate {
        current_admin: Some(admin),
        flash,
        query: query.q.unwrap_or_default().trim().to_owned(),
        books,
    })
}

/// Empty add form.
///
/// GET /books/new
pub async fn new_form(RequireAdminAuth(admin): RequireAdminAuth) -> BookFormTemplate {
    BookFormTemplate::new_book(admin, BookForm::default(), Flash::default())
}

/// Add a book.
///
/// POST /books
#[instrument(skip(admin, state, form), fields(admin_id = %admin.id))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<BookForm>,
) -> Result<Response, AppError> {
    let details = match form.to_details() {
        Ok(details) => details,
        Err(message) => {
            return Ok(
                BookFormTemplate::new_book(admin, form, Flash::error(message)).into_response(),
            );
        }
    };

    match CatalogAdminService::new(state.pool()).add_book(details).await {
        Ok(_) => Ok(Redirect::to("/books?success=book_added").into_response()),
        Err(err @ (CatalogAdminError::Invalid(_) | CatalogAdminError::DuplicateIsbn)) => {
            let flash = Flash::error(err.to_string());
            Ok(BookFormTemplate::new_book(admin, form, flash).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// Edit form prefilled from the catalog.
///
/// GET /books/{id}/edit
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn edit_form(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<BookFormTemplate, AppError> {
    let id = BookId::new(id);
    let book = CatalogAdminService::new(state.pool()).get(id).await?;

    Ok(BookFormTemplate::edit_book(
        admin,
        id,
        BookForm::from(&book),
        Flash::default(),
    ))
}

/// Save edits to a book.
///
/// POST /books/{id}
#[instrument(skip(admin, state, form), fields(admin_id = %admin.id))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<BookForm>,
) -> Result<Response, AppError> {
    let id = BookId::new(id);
    let details = match form.to_details() {
        Ok(details) => details,
        Err(message) => {
            return Ok(
                BookFormTemplate::edit_book(admin, id, form, Flash::error(message)).into_response(),
            );
        }
    };

    match CatalogAdminService::new(state.pool())
        .update_book(id, details)
        .await
    {
        Ok(_) => Ok(Redirect::to("/books?success=book_updated").into_response()),
        Err(CatalogAdminError::NotFound) => {
            Ok(Redirect::to("/books?error=book_not_found").into_response())
        }
        Err(err @ (CatalogAdminError::Invalid(_) | CatalogAdminError::DuplicateIsbn)) => Ok(
            BookFormTemplate::edit_book(admin, id, form, Flash::error(err.to_string()))
                .into_response(),
        ),
        Err(err) => Err(err.into()),
    }
}

/// Delete a book, with its shelf entries and reviews.
///
/// POST /books/{id}/delete
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    match CatalogAdminService::new(state.pool())
        .delete_book(BookId::new(id))
        .await
    {
        Ok(()) => Ok(Redirect::to("/books?success=book_deleted")),
        Err(CatalogAdminError::NotFound) => Ok(Redirect::to("/books?error=book_not_found")),
        Err(err) => Err(err.into()),
    }
}
