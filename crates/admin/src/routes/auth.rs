//! Authentication route handlers for admin.

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
use crate::middleware::{OptionalAdminAuth, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::routes::{Flash, MessageQuery};
use crate::services::{AdminAuthError, AdminAuthService};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub current_admin: Option<CurrentAdmin>,
    pub flash: Flash,
    pub email: String,
}

/// Render the login page.
///
/// GET /auth/login
pub async fn login_page(
    OptionalAdminAuth(admin): OptionalAdminAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        current_admin: None,
        flash: Flash::from(&query),
        email: String::new(),
    }
    .into_response()
}

/// Check credentials and start an admin session.
///
/// POST /auth/login
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match AdminAuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(admin) => {
            let current = CurrentAdmin::from(&admin);
            set_current_admin(&session, &current).await?;
            set_sentry_user(admin.id.as_i32(), Some(admin.email.as_str()));
            Ok(Redirect::to("/").into_response())
        }
        Err(AdminAuthError::InvalidCredentials) => Ok(LoginTemplate {
            current_admin: None,
            flash: Flash::error("Invalid email or password."),
            email: form.email,
        }
        .into_response()),
        Err(other) => Err(other.into()),
    }
}

/// Logout and clear session.
///
/// POST /auth/logout
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/auth/login?success=logged_out"))
}
