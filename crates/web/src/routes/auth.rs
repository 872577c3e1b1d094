//! Authentication route handlers.
//!
//! Email and password login and registration. A successful login writes the
//! reader's [`CurrentUser`] into the session; every later request reads it
//! back through the auth extractors.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::routes::{Flash, FlashCode, MessageQuery, redirect_with};
use crate::services::AuthService;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Flash,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Flash,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page. Signed-in readers go straight to their account.
pub async fn login_page(
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if current_user.is_some() {
        return Redirect::to("/account").into_response();
    }

    LoginTemplate {
        current_user: None,
        flash: Flash::from(&query),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, AppError> {
    let user = match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => user,
        Err(e) if e.is_unexpected() => return Err(e.into()),
        Err(e) => {
            tracing::info!(reason = e.code(), "Login rejected");
            return Ok(redirect_with("/auth/login", "error", e.code()));
        }
    };

    sign_in(&session, &user.to_current_user()).await?;
    Ok(Redirect::to("/account"))
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if current_user.is_some() {
        return Redirect::to("/account").into_response();
    }

    RegisterTemplate {
        current_user: None,
        flash: Flash::from(&query),
    }
    .into_response()
}

/// Handle registration form submission. New readers are signed in at once.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, AppError> {
    if form.password != form.password_confirm {
        return Ok(redirect_with("/auth/register", "error", "password_mismatch"));
    }

    let user = match AuthService::new(state.pool())
        .register(&form.email, &form.display_name, &form.password)
        .await
    {
        Ok(user) => user,
        Err(e) if e.is_unexpected() => return Err(e.into()),
        Err(e) => return Ok(redirect_with("/auth/register", "error", e.code())),
    };

    sign_in(&session, &user.to_current_user()).await?;
    Ok(redirect_with("/account", "success", "registered"))
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear session: {e}")))?;
    clear_sentry_user();

    Ok(redirect_with("/auth/login", "success", "logged_out"))
}

async fn sign_in(session: &Session, user: &CurrentUser) -> Result<(), AppError> {
    set_current_user(session, user)
        .await
        .map_err(|e| AppError::Internal(format!("failed to set session: {e}")))?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "Reader signed in");
    Ok(())
}
