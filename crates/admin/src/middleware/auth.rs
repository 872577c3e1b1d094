//! Authentication middleware and extractors for admin.
//!
//! The session holds a [`CurrentAdmin`] written at login. Handlers receive
//! it through [`RequireAdminAuth`] or [`RequireSuperAdmin`] and never read
//! the session themselves.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentAdmin, session_keys};

/// Extractor that requires admin authentication.
///
/// If the admin is not logged in, returns a redirect to the login page
/// for HTML requests, or 401 Unauthorized for API requests.
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Error returned when admin authentication is required but the user is not logged in.
#[derive(Debug, PartialEq, Eq)]
pub enum AdminAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Logged in, but not a super admin.
    Forbidden,
}

impl AdminAuthRejection {
    fn for_path(path: &str) -> Self {
        if path.starts_with("/api/") {
            Self::Unauthorized
        } else {
            Self::RedirectToLogin
        }
    }
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "Only super admins can access this resource",
            )
                .into_response(),
        }
    }
}

async fn session_admin(parts: &Parts) -> Result<CurrentAdmin, AdminAuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AdminAuthRejection::Unauthorized)?;

    session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
        .ok_or_else(|| AdminAuthRejection::for_path(parts.uri.path()))
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_admin(parts).await.map(Self)
    }
}

/// Extractor that optionally gets the current admin.
pub struct OptionalAdminAuth(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdminAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_admin(parts).await.ok()))
    }
}

/// Extractor that requires super admin authentication.
///
/// If the admin is not logged in, redirects to login.
/// If the admin is not a super admin, returns 403 Forbidden.
pub struct RequireSuperAdmin(pub CurrentAdmin);

impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = session_admin(parts).await?;
        if !admin.is_super_admin() {
            tracing::warn!(
                admin_id = %admin.id,
                path = %parts.uri.path(),
                "Super admin route denied"
            );
            return Err(AdminAuthRejection::Forbidden);
        }
        Ok(Self(admin))
    }
}

/// Store the admin in the session after login, on a fresh session ID.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Drop the whole session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
