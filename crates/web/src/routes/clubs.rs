//! Book club route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use shelfwise_core::{ClubId, ClubRole};

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{ClubSummary, CurrentUser};
use crate::routes::{Flash, FlashForm, MessageQuery, flash_redirect};
use crate::services::ClubService;
use crate::services::clubs::ClubDetail;
use crate::state::AppState;

/// New club form data.
#[derive(Debug, Deserialize)]
pub struct ClubForm {
    pub name: String,
    pub description: Option<String>,
}

/// Discussion post form data.
#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub body: String,
}

/// Club list template.
#[derive(Template, WebTemplate)]
#[template(path = "clubs/index.html")]
pub struct ClubsTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Flash,
    pub clubs: Vec<ClubSummary>,
    pub my_clubs: Vec<ClubSummary>,
}

/// Club page template.
#[derive(Template, WebTemplate)]
#[template(path = "clubs/show.html")]
pub struct ClubTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Flash,
    pub detail: ClubDetail,
}

impl ClubTemplate {
    fn is_owner(&self) -> bool {
        self.detail.viewer_role == Some(ClubRole::Owner)
    }

    fn is_member(&self) -> bool {
        self.detail.viewer_role.is_some()
    }
}

/// List all clubs and the reader's own.
#[instrument(skip(state, user, query), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let service = ClubService::new(state.pool());
    let clubs = service.list_clubs().await?;
    let my_clubs = service.clubs_for(user.id).await?;

    Ok(ClubsTemplate {
        current_user: Some(user),
        flash: Flash::from(&query),
        clubs,
        my_clubs,
    })
}

/// Create a club. The creator becomes its owner.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    FlashForm(form): FlashForm<ClubForm>,
) -> Result<Redirect, AppError> {
    let result = ClubService::new(state.pool())
        .create_club(user.id, &form.name, form.description.as_deref())
        .await;

    let path = match &result {
        Ok(club) => format!("/clubs/{}", club.id),
        Err(_) => "/clubs".to_owned(),
    };
    flash_redirect(result, &path, "club_created")
}

/// Show a club's members and discussion.
#[instrument(skip(state, user, query), fields(user_id = %user.id))]
pub async fn detail(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let detail = ClubService::new(state.pool())
        .club_detail(ClubId::new(id), user.id)
        .await?;

    Ok(ClubTemplate {
        current_user: Some(user),
        flash: Flash::from(&query),
        detail,
    })
}

/// Join a club.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn join(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    let result = ClubService::new(state.pool())
        .join_club(ClubId::new(id), user.id)
        .await;
    flash_redirect(result, &format!("/clubs/{id}"), "joined")
}

/// Leave a club.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn leave(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    let result = ClubService::new(state.pool())
        .leave_club(ClubId::new(id), user.id)
        .await;
    flash_redirect(result, &format!("/clubs/{id}"), "left")
}

/// Delete a club (owner only).
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    let result = ClubService::new(state.pool())
        .delete_club(ClubId::new(id), user.id)
        .await;

    // A deleted club has no page to return to
    let path = if result.is_ok() {
        "/clubs".to_owned()
    } else {
        format!("/clubs/{id}")
    };
    flash_redirect(result, &path, "club_deleted")
}

/// Post to a club's discussion.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn post_discussion(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    FlashForm(form): FlashForm<PostForm>,
) -> Result<Redirect, AppError> {
    let result = ClubService::new(state.pool())
        .post_discussion(ClubId::new(id), user.id, &form.body)
        .await;
    flash_redirect(result, &format!("/clubs/{id}"), "posted")
}
