//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! GET  /auth/login               - Login page
//! POST /auth/login               - Email + password login
//! POST /auth/logout              - Logout
//!
//! # Dashboard
//! GET  /                         - Row counts across the library
//!
//! # Readers
//! GET  /users?q=                 - List and search readers
//! POST /users/{id}/restrict      - Block sign-in
//! POST /users/{id}/unrestrict    - Allow sign-in again
//! POST /users/{id}/delete        - Delete reader and their data
//!
//! # Catalog
//! GET  /books?q=                 - List and search books
//! GET  /books/new                - Add form
//! POST /books                    - Add a book
//! GET  /books/{id}/edit          - Edit form
//! POST /books/{id}               - Save edits
//! POST /books/{id}/delete        - Delete a book
//!
//! # Admin Users (super admin only)
//! GET  /admin-users              - List admin users
//! ```

pub mod admin_users;
pub mod auth;
pub mod books;
pub mod dashboard;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Deserialize;

use crate::state::AppState;

/// Create the full router for the admin area.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/users", get(users::index))
        .route("/users/{id}/restrict", post(users::restrict))
        .route("/users/{id}/unrestrict", post(users::unrestrict))
        .route("/users/{id}/delete", post(users::delete))
        .route("/books", get(books::index).post(books::create))
        .route("/books/new", get(books::new_form))
        .route("/books/{id}", post(books::update))
        .route("/books/{id}/edit", get(books::edit_form))
        .route("/books/{id}/delete", post(books::delete))
        .route("/admin-users", get(admin_users::index))
}

/// Query parameters for error/success display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Status text resolved from a [`MessageQuery`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flash {
    pub error: Option<String>,
    pub success: Option<&'static str>,
}

impl Flash {
    /// A flash carrying one error, for re-rendered forms.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            error: Some(text.into()),
            success: None,
        }
    }
}

impl From<&MessageQuery> for Flash {
    fn from(query: &MessageQuery) -> Self {
        Self {
            error: query.error.as_deref().map(|code| error_text(code).to_owned()),
            success: query.success.as_deref().and_then(success_text),
        }
    }
}

/// Text for an `?error=` code. Unknown codes get a generic message.
#[must_use]
pub fn error_text(code: &str) -> &'static str {
    match code {
        "user_not_found" => "That reader no longer exists.",
        "book_not_found" => "That book no longer exists.",
        _ => "Something went wrong. Please try again.",
    }
}

/// Text for a `?success=` code. Unknown codes show nothing.
#[must_use]
pub fn success_text(code: &str) -> Option<&'static str> {
    Some(match code {
        "logged_out" => "You've been logged out.",
        "user_restricted" => "Reader restricted. They can no longer sign in.",
        "user_unrestricted" => "Reader can sign in again.",
        "user_deleted" => "Reader and all their data deleted.",
        "book_added" => "Book added to the catalog.",
        "book_updated" => "Book saved.",
        "book_deleted" => "Book deleted.",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_from_query() {
        let query = MessageQuery {
            error: Some("book_not_found".to_owned()),
            success: Some("no_such_code".to_owned()),
        };
        let flash = Flash::from(&query);
        assert_eq!(flash.error.as_deref(), Some("That book no longer exists."));
        assert_eq!(flash.success, None);
    }

    #[test]
    fn test_unknown_error_code_is_generic() {
        assert_eq!(
            error_text("<script>"),
            "Something went wrong. Please try again."
        );
    }
}
