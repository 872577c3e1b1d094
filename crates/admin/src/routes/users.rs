//! Reader account moderation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use shelfwise_core::UserId;

use crate::db::ReaderRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{CurrentAdmin, Reader};
use crate::routes::Flash;
use crate::state::AppState;

/// Readers listed per page.
const LIST_LIMIT: i64 = 100;

/// Search and message parameters.
#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    pub q: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Reader list template.
#[derive(Template, WebTemplate)]
#[template(path = "users/index.html")]
pub struct UsersTemplate {
    pub current_admin: Option<CurrentAdmin>,
    pub flash: Flash,
    pub query: String,
    pub readers: Vec<Reader>,
}

/// List and search readers.
///
/// GET /users?q=
#[instrument(skip(admin, state, query), fields(admin_id = %admin.id))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<UsersQuery>,
) -> Result<UsersTemplate, AppError> {
    let search = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let readers = ReaderRepository::new(state.pool())
        .search(search, LIST_LIMIT)
        .await?;

    let flash = Flash::from(&crate::routes::MessageQuery {
        error: query.error,
        success: query.success,
    });

    Ok(UsersTemplate {
        current_admin: Some(admin),
        flash,
        query: search.unwrap_or_default().to_owned(),
        readers,
    })
}

/// Block a reader from signing in.
///
/// POST /users/{id}/restrict
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn restrict(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    set_restricted(&state, UserId::new(id), true).await
}

/// Allow a restricted reader to sign in again.
///
/// POST /users/{id}/unrestrict
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn unrestrict(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    set_restricted(&state, UserId::new(id), false).await
}

async fn set_restricted(
    state: &AppState,
    id: UserId,
    restricted: bool,
) -> Result<Redirect, AppError> {
    if !ReaderRepository::new(state.pool())
        .set_restricted(id, restricted)
        .await?
    {
        return Ok(Redirect::to("/users?error=user_not_found"));
    }

    tracing::info!(user_id = %id, restricted, "Reader restriction changed");
    Ok(Redirect::to(if restricted {
        "/users?success=user_restricted"
    } else {
        "/users?success=user_unrestricted"
    }))
}

/// Delete a reader and everything they own.
///
/// POST /users/{id}/delete
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    let id = UserId::new(id);
    if !ReaderRepository::new(state.pool()).delete(id).await? {
        return Ok(Redirect::to("/users?error=user_not_found"));
    }

    tracing::warn!(user_id = %id, "Reader deleted by admin");
    Ok(Redirect::to("/users?success=user_deleted"))
}
