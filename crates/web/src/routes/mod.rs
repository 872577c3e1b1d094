//! HTTP route handlers for the reader site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                               - Home page (recent additions)
//!
//! # Auth (rate limited)
//! GET  /auth/login                     - Login page
//! POST /auth/login                     - Login action
//! GET  /auth/register                  - Register page
//! POST /auth/register                  - Register action
//! POST /auth/logout                    - Logout action
//!
//! # Catalog
//! GET  /books?q=&genre=&page=          - Browse and search
//! GET  /books/{id}                     - Book detail with reviews
//! POST /books/{id}/reviews             - Write or replace own review
//! POST /books/{id}/reviews/delete      - Delete own review
//!
//! # Bookshelf (requires auth)
//! GET  /shelf?status=                  - Shelf with status counts
//! POST /shelf                          - Add a book
//! POST /shelf/{book_id}/status         - Change status (optional dates)
//! POST /shelf/{book_id}/progress       - Update pages / percentage
//! POST /shelf/{book_id}/ownership      - Change ownership type
//! POST /shelf/{book_id}/remove         - Remove from shelf
//!
//! # Reading goals (requires auth)
//! GET  /goals                          - Current goal, analytics, history
//! POST /goals                          - Set a goal
//! POST /goals/{year}/increment         - One more book read
//! POST /goals/{year}/decrement         - One fewer book read
//! POST /goals/{year}/progress          - Set books read
//! POST /goals/{year}/target            - Change target
//! POST /goals/{year}/delete            - Delete goal
//!
//! # Clubs (requires auth)
//! GET  /clubs                          - All clubs and mine
//! POST /clubs                          - Create a club
//! GET  /clubs/{id}                     - Members and discussion
//! POST /clubs/{id}/join|leave|delete
//! POST /clubs/{id}/discussions         - Post to the discussion
//!
//! # Friends (requires auth)
//! GET  /friends                        - Friends and incoming requests
//! POST /friends                        - Send a request by email
//! POST /friends/{id}/accept|remove
//!
//! # Account (requires auth)
//! GET  /account                        - Reading dashboard
//! ```
//!
//! Form posts answer with a redirect carrying `?success=<code>` or
//! `?error=<code>`; the target page turns the code into text through
//! [`Flash`].

pub mod account;
pub mod auth;
pub mod books;
pub mod clubs;
pub mod friends;
pub mod goals;
pub mod home;
pub mod shelf;

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;

use axum::{
    Form, Router,
    extract::{FromRequest, OriginalUri, Request},
    response::Redirect,
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use shelfwise_core::EmailError;

use crate::error::AppError;
use crate::middleware::{auth_rate_limiter, form_rate_limiter};
use crate::services::auth::{MAX_DISPLAY_NAME_LENGTH, MIN_PASSWORD_LENGTH};
use crate::services::{
    AuthError, CatalogError, ClubError, FriendError, GoalError, ReviewError, ShelfError,
};
use crate::state::AppState;

/// Create the full router for the reader site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/account", get(account::dashboard))
        .nest("/auth", auth_routes())
        .nest("/books", book_routes())
        .nest("/shelf", shelf_routes())
        .nest("/goals", goal_routes())
        .nest("/clubs", club_routes())
        .nest("/friends", friend_routes())
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the catalog routes router.
pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(books::browse))
        .route("/{id}", get(books::detail))
        .route("/{id}/reviews", post(books::save_review))
        .route("/{id}/reviews/delete", post(books::delete_review))
}

/// Create the bookshelf routes router.
pub fn shelf_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(shelf::index).post(shelf::add))
        .route("/{book_id}/status", post(shelf::update_status))
        .route("/{book_id}/progress", post(shelf::update_progress))
        .route("/{book_id}/ownership", post(shelf::update_ownership))
        .route("/{book_id}/remove", post(shelf::remove))
}

/// Create the reading goal routes router.
pub fn goal_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(goals::index).post(goals::set_goal))
        .route("/{year}/increment", post(goals::increment))
        .route("/{year}/decrement", post(goals::decrement))
        .route("/{year}/progress", post(goals::update_progress))
        .route("/{year}/target", post(goals::update_target))
        .route("/{year}/delete", post(goals::delete))
}

/// Create the book club routes router.
pub fn club_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(clubs::index).post(clubs::create))
        .route("/{id}", get(clubs::detail))
        .route("/{id}/join", post(clubs::join))
        .route("/{id}/leave", post(clubs::leave))
        .route("/{id}/delete", post(clubs::delete))
        .route("/{id}/discussions", post(clubs::post_discussion))
        .layer(form_rate_limiter())
}

/// Create the friends routes router.
pub fn friend_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(friends::index).post(friends::send_request))
        .route("/{id}/accept", post(friends::accept))
        .route("/{id}/remove", post(friends::remove))
        .layer(form_rate_limiter())
}

// =============================================================================
// Flash Messages
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Status text resolved from a [`MessageQuery`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flash {
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

impl From<&MessageQuery> for Flash {
    fn from(query: &MessageQuery) -> Self {
        Self {
            error: query.error.as_deref().map(error_text),
            success: query.success.as_deref().and_then(success_text),
        }
    }
}

/// Code for a form submission that failed to parse.
const INVALID_FORM: &str = "invalid_form";

const GENERIC_ERROR: &str = "Something went wrong. Please try again.";

/// Error codes raised by handlers rather than services.
const FORM_ERRORS: [(&str, &str); 2] = [
    ("password_mismatch", "Passwords do not match."),
    (INVALID_FORM, "Please check the form and try again."),
];

/// `(code, text)` for each business error.
fn flash_entries<E: FlashCode>(
    errors: impl IntoIterator<Item = E>,
) -> Vec<(&'static str, String)> {
    errors
        .into_iter()
        .map(|e| (e.code(), e.to_string()))
        .collect()
}

/// Every `?error=` code with its text, taken from the service errors'
/// `Display` output.
static ERROR_TEXT: LazyLock<HashMap<&'static str, String>> = LazyLock::new(|| {
    let mut text: HashMap<&'static str, String> = [
        flash_entries([
            AuthError::InvalidEmail(EmailError::Empty),
            AuthError::InvalidCredentials,
            AuthError::UserAlreadyExists,
            AuthError::WeakPassword {
                min: MIN_PASSWORD_LENGTH,
            },
            AuthError::InvalidDisplayName {
                max: MAX_DISPLAY_NAME_LENGTH,
            },
            AuthError::AccountRestricted,
        ]),
        flash_entries([
            GoalError::NotFound,
            GoalError::AlreadyExists,
            GoalError::InvalidTarget,
            GoalError::NegativeProgress,
        ]),
        flash_entries([
            ShelfError::NotOnShelf,
            ShelfError::AlreadyOnShelf,
            ShelfError::BookNotFound,
            ShelfError::NegativePage,
            ShelfError::InvalidTotalPages,
            ShelfError::ProgressOutOfRange,
            ShelfError::PageBeyondTotal,
        ]),
        flash_entries([CatalogError::BookNotFound]),
        flash_entries([
            ReviewError::InvalidRating,
            ReviewError::TooLong,
            ReviewError::BookNotFound,
            ReviewError::NotFound,
        ]),
        flash_entries([
            ClubError::InvalidName,
            ClubError::DescriptionTooLong,
            ClubError::InvalidPost,
            ClubError::NotFound,
            ClubError::AlreadyMember,
            ClubError::NotMember,
            ClubError::OwnerCannotLeave,
            ClubError::NotOwner,
        ]),
        flash_entries([
            FriendError::UserNotFound,
            FriendError::SelfRequest,
            FriendError::AlreadyExists,
            FriendError::RequestNotFound,
            FriendError::NotFriends,
        ]),
    ]
    .into_iter()
    .flatten()
    .collect();

    text.extend(FORM_ERRORS.map(|(code, message)| (code, message.to_owned())));
    text
});

/// Text for an `?error=` code. Unknown codes get a generic message.
#[must_use]
pub fn error_text(code: &str) -> &'static str {
    ERROR_TEXT.get(code).map_or(GENERIC_ERROR, String::as_str)
}

/// Text for a `?success=` code. Unknown codes show nothing.
#[must_use]
pub fn success_text(code: &str) -> Option<&'static str> {
    Some(match code {
        "registered" => "Welcome to Shelfwise!",
        "logged_out" => "You've been logged out.",
        "goal_set" => "Reading goal set.",
        "goal_updated" => "Reading goal updated.",
        "goal_deleted" => "Reading goal deleted.",
        "shelved" => "Book added to your shelf.",
        "status_updated" => "Reading status updated.",
        "progress_updated" => "Progress saved.",
        "ownership_updated" => "Ownership updated.",
        "removed" => "Book removed from your shelf.",
        "review_saved" => "Review saved.",
        "review_deleted" => "Review deleted.",
        "club_created" => "Club created.",
        "joined" => "You joined the club.",
        "left" => "You left the club.",
        "club_deleted" => "Club deleted.",
        "posted" => "Posted.",
        "request_sent" => "Friend request sent.",
        "friend_added" => "Friend request accepted.",
        "friend_removed" => "Friend removed.",
        _ => return None,
    })
}

/// Redirect to `path` with one status code in the query string.
///
/// Codes are fixed ASCII identifiers, so no encoding is needed.
fn redirect_with(path: &str, key: &str, code: &str) -> Redirect {
    let separator = if path.contains('?') { '&' } else { '?' };
    Redirect::to(&format!("{path}{separator}{key}={code}"))
}

/// Service errors that a form handler reports through `?error=`. The
/// `Display` text is what the reader sees.
pub trait FlashCode: Into<AppError> + Display {
    /// Code for the redirect.
    fn code(&self) -> &'static str;

    /// Whether this is an unexpected failure rather than a business outcome.
    fn is_unexpected(&self) -> bool;
}

macro_rules! impl_flash_code {
    ($($error:ident),* $(,)?) => {
        $(
            impl FlashCode for $error {
                fn code(&self) -> &'static str {
                    $error::code(self)
                }

                fn is_unexpected(&self) -> bool {
                    matches!(self, $error::Repository(_))
                }
            }
        )*
    };
}

impl_flash_code!(GoalError, ShelfError, ReviewError, ClubError, FriendError);

impl FlashCode for AuthError {
    fn code(&self) -> &'static str {
        Self::code(self)
    }

    fn is_unexpected(&self) -> bool {
        matches!(self, Self::Repository(_) | Self::PasswordHash)
    }
}

impl FlashCode for CatalogError {
    fn code(&self) -> &'static str {
        match self {
            Self::BookNotFound => "book_not_found",
            Self::Repository(_) => "server_error",
        }
    }

    fn is_unexpected(&self) -> bool {
        matches!(self, Self::Repository(_))
    }
}

/// Turn a form action's result into a redirect back to `path`.
///
/// Business errors come back as `?error=<code>`; unexpected failures
/// propagate as `AppError`.
///
/// # Errors
///
/// Returns the `AppError` for unexpected failures.
pub fn flash_redirect<T, E: FlashCode>(
    result: Result<T, E>,
    path: &str,
    success: &str,
) -> Result<Redirect, AppError> {
    match result {
        Ok(_) => Ok(redirect_with(path, "success", success)),
        Err(e) if e.is_unexpected() => Err(e.into()),
        Err(e) => Ok(redirect_with(path, "error", e.code())),
    }
}

/// [`Form`] for redirecting handlers. A submission that does not parse
/// sends the reader back to the section's index with `?error=invalid_form`
/// instead of a plain-text 422.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlashForm<T>(pub T);

impl<T, S> FromRequest<S> for FlashForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // Nested routers see a stripped URI
        let section = req.extensions().get::<OriginalUri>().map_or_else(
            || section_path(req.uri().path()),
            |uri| section_path(uri.path()),
        );

        match Form::<T>::from_request(req, state).await {
            Ok(Form(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, section = %section, "Rejected form submission");
                Err(redirect_with(&section, "error", INVALID_FORM))
            }
        }
    }
}

/// First path segment, e.g. `/goals` for `/goals/2026/progress`.
fn section_path(path: &str) -> String {
    let first = path.trim_start_matches('/').split('/').next().unwrap_or_default();
    format!("/{first}")
}

/// Deserialize a form field where an empty input means "not supplied".
///
/// # Errors
///
/// Returns a deserialization error if a non-empty value does not parse.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;
    use tower::ServiceExt;

    use super::*;

    fn location(redirect: Redirect) -> String {
        let response = redirect.into_response();
        response
            .headers()
            .get("location")
            .unwrap()
            .to_str()
            .unwrap()
            .to_owned()
    }

    #[test]
    fn test_flash_from_query() {
        let query = MessageQuery {
            error: Some("goal_exists".to_owned()),
            success: Some("nonsense".to_owned()),
        };
        let flash = Flash::from(&query);
        assert_eq!(flash.error, Some("You already have a reading goal for that year."));
        assert_eq!(flash.success, None);
    }

    #[test]
    fn test_unknown_error_code_is_generic() {
        assert_eq!(error_text("<script>"), GENERIC_ERROR);
    }

    #[test]
    fn test_error_text_is_service_display() {
        assert_eq!(
            error_text(GoalError::NotFound.code()),
            GoalError::NotFound.to_string()
        );
        assert_eq!(
            error_text(ClubError::OwnerCannotLeave.code()),
            "Owners can't leave their own club. Delete it instead."
        );
        assert_eq!(
            error_text(AuthError::InvalidCredentials.code()),
            "Invalid email or password."
        );
        assert_eq!(
            error_text("weak_password"),
            "Passwords must be at least 8 characters."
        );
        assert_eq!(error_text("password_mismatch"), "Passwords do not match.");
    }

    #[test]
    fn test_every_service_code_has_text() {
        let codes = [
            ShelfError::NotOnShelf.code(),
            ShelfError::ProgressOutOfRange.code(),
            ReviewError::TooLong.code(),
            ClubError::InvalidName.code(),
            FriendError::AlreadyExists.code(),
            AuthError::AccountRestricted.code(),
            INVALID_FORM,
        ];
        for code in codes {
            assert_ne!(error_text(code), GENERIC_ERROR, "missing text for {code}");
        }
    }

    #[test]
    fn test_flash_redirect_success_and_error() {
        let ok: Result<(), GoalError> = Ok(());
        assert_eq!(
            location(flash_redirect(ok, "/goals", "goal_set").unwrap()),
            "/goals?success=goal_set"
        );

        let err: Result<(), GoalError> = Err(GoalError::InvalidTarget);
        assert_eq!(
            location(flash_redirect(err, "/goals", "goal_set").unwrap()),
            "/goals?error=invalid_target"
        );
    }

    #[test]
    fn test_flash_redirect_appends_to_existing_query() {
        let err: Result<(), ShelfError> = Err(ShelfError::NotOnShelf);
        assert_eq!(
            location(flash_redirect(err, "/shelf?status=reading", "removed").unwrap()),
            "/shelf?status=reading&error=not_on_shelf"
        );
    }

    #[test]
    fn test_flash_redirect_propagates_unexpected() {
        let err: Result<(), ClubError> = Err(ClubError::Repository(
            crate::db::RepositoryError::DataCorruption("bad role".to_owned()),
        ));
        assert!(flash_redirect(err, "/clubs", "joined").is_err());
    }

    #[test]
    fn test_section_path() {
        assert_eq!(section_path("/goals/2026/progress"), "/goals");
        assert_eq!(section_path("/shelf"), "/shelf");
        assert_eq!(section_path("/"), "/");
    }

    #[derive(Debug, Deserialize)]
    struct BooksReadForm {
        books_read: i32,
    }

    async fn post_books_read(body: &'static str) -> axum::response::Response {
        let goals = Router::new().route(
            "/{year}/progress",
            post(|FlashForm(form): FlashForm<BooksReadForm>| async move {
                form.books_read.to_string()
            }),
        );
        Router::new()
            .nest("/goals", goals)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/goals/2026/progress")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_flash_form_accepts_valid_submission() {
        let response = post_books_read("books_read=7").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_flash_form_redirects_malformed_submission() {
        for body in ["books_read=seven", "books_read=", ""] {
            let response = post_books_read(body).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "body {body:?}");
            assert_eq!(
                response.headers()[header::LOCATION],
                "/goals?error=invalid_form"
            );
        }
    }

    #[derive(Debug, Deserialize)]
    struct PagesForm {
        #[serde(default, deserialize_with = "empty_as_none")]
        current_page: Option<i32>,
        #[serde(default, deserialize_with = "empty_as_none")]
        total_pages: Option<i32>,
    }

    #[test]
    fn test_empty_as_none() {
        let form: PagesForm =
            serde_json::from_str(r#"{"current_page": " 42 ", "total_pages": ""}"#).unwrap();
        assert_eq!(form.current_page, Some(42));
        assert_eq!(form.total_pages, None);

        let form: PagesForm = serde_json::from_str("{}").unwrap();
        assert_eq!(form.current_page, None);

        assert!(serde_json::from_str::<PagesForm>(r#"{"current_page": "forty"}"#).is_err());
    }
}
