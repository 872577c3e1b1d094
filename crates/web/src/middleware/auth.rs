//! Authentication extractors.
//!
//! The session context is read from the session store once per request and
//! handed to handlers as an owned, immutable [`CurrentUser`]. Handlers never
//! write to it; only login and logout replace it.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a signed-in reader.
///
/// If nobody is logged in, HTML requests are redirected to the login page and
/// API requests get `401 Unauthorized`.
///
/// # Example
///
/// ```rust,ignore
/// async fn shelf_page(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.display_name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but nobody is logged in.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl AuthRejection {
    fn for_path(path: &str) -> Self {
        if path.starts_with("/api/") {
            Self::Unauthorized
        } else {
            Self::RedirectToLogin
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let rejection = AuthRejection::for_path(parts.uri.path());

        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or(rejection)?;

        tracing::Span::current().record("user_id", user.id.as_i32());

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current reader.
///
/// Unlike `RequireAuth`, this never rejects the request.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Store the reader in the session after login.
///
/// The session ID is cycled first so a pre-login session cannot be fixated.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Drop the whole session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_depends_on_path() {
        assert_eq!(AuthRejection::for_path("/shelf"), AuthRejection::RedirectToLogin);
        assert_eq!(AuthRejection::for_path("/api/goals"), AuthRejection::Unauthorized);
    }

    #[test]
    fn test_rejection_responses() {
        let redirect = AuthRejection::RedirectToLogin.into_response();
        assert_eq!(redirect.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            redirect.headers().get("location").map(|v| v.as_bytes()),
            Some(&b"/auth/login"[..])
        );

        let unauthorized = AuthRejection::Unauthorized.into_response();
        assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);
    }
}
