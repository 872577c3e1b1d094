//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Route handlers turn expected business errors
//! into redirects carrying an `error=` code and return `Result<T, AppError>`
//! for everything else.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{
    AuthError, CatalogError, ClubError, FriendError, GoalError, ReviewError, ShelfError,
};

/// Application-level error type for the reader site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User may not perform this action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with existing data.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::AccountRestricted => StatusCode::FORBIDDEN,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword { .. }
                | AuthError::InvalidEmail(_)
                | AuthError::InvalidDisplayName { .. } => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash) => {
                "Authentication error".to_string()
            }
            Self::Auth(err) => err.to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Map a service error onto `AppError`: repository failures stay server
/// errors, business variants keep their user-facing text.
macro_rules! from_service_error {
    ($error:ident { $($variant:pat => $kind:ident),* $(,)? }) => {
        impl From<$error> for AppError {
            fn from(err: $error) -> Self {
                match err {
                    $error::Repository(e) => Self::Database(e),
                    $($variant => Self::$kind(err.to_string()),)*
                }
            }
        }
    };
}

from_service_error!(GoalError {
    GoalError::NotFound => NotFound,
    GoalError::AlreadyExists => Conflict,
    GoalError::InvalidTarget | GoalError::NegativeProgress => BadRequest,
});

from_service_error!(ShelfError {
    ShelfError::NotOnShelf | ShelfError::BookNotFound => NotFound,
    ShelfError::AlreadyOnShelf => Conflict,
    ShelfError::NegativePage
    | ShelfError::InvalidTotalPages
    | ShelfError::ProgressOutOfRange
    | ShelfError::PageBeyondTotal => BadRequest,
});

from_service_error!(CatalogError {
    CatalogError::BookNotFound => NotFound,
});

from_service_error!(ReviewError {
    ReviewError::BookNotFound | ReviewError::NotFound => NotFound,
    ReviewError::InvalidRating | ReviewError::TooLong => BadRequest,
});

from_service_error!(ClubError {
    ClubError::NotFound => NotFound,
    ClubError::AlreadyMember => Conflict,
    ClubError::NotMember | ClubError::OwnerCannotLeave | ClubError::NotOwner => Forbidden,
    ClubError::InvalidName | ClubError::DescriptionTooLong | ClubError::InvalidPost => BadRequest,
});

from_service_error!(FriendError {
    FriendError::UserNotFound | FriendError::RequestNotFound | FriendError::NotFriends => NotFound,
    FriendError::AlreadyExists => Conflict,
    FriendError::SelfRequest => BadRequest,
});

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("shelf", "Added book to shelf", Some(&[("book_id", "42")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("book 123".to_string());
        assert_eq!(err.to_string(), "Not found: book 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(get_status(AppError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(get_status(AppError::Unauthorized("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(AppError::Forbidden("x".into())), StatusCode::FORBIDDEN);
        assert_eq!(get_status(AppError::BadRequest("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(AppError::Conflict("x".into())), StatusCode::CONFLICT);
        assert_eq!(get_status(AppError::RateLimited), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            get_status(AppError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(get_status(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(AuthError::AccountRestricted), StatusCode::FORBIDDEN);
        assert_eq!(get_status(AuthError::UserAlreadyExists), StatusCode::CONFLICT);
        assert_eq!(
            get_status(AuthError::WeakPassword { min: 8 }),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_service_errors_map_to_client_statuses() {
        assert_eq!(get_status(GoalError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(get_status(GoalError::AlreadyExists), StatusCode::CONFLICT);
        assert_eq!(get_status(ShelfError::AlreadyOnShelf), StatusCode::CONFLICT);
        assert_eq!(get_status(ShelfError::NegativePage), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(ClubError::NotOwner), StatusCode::FORBIDDEN);
        assert_eq!(get_status(FriendError::SelfRequest), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(CatalogError::BookNotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_repository_failures_stay_server_errors() {
        let err: AppError = ReviewError::Repository(RepositoryError::NotFound).into();
        assert!(matches!(err, AppError::Database(RepositoryError::NotFound)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
