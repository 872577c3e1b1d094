//! Friend route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use shelfwise_core::UserId;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Friend, FriendRequest};
use crate::routes::{Flash, FlashForm, MessageQuery, flash_redirect};
use crate::services::FriendService;
use crate::state::AppState;

/// Friend request form data.
#[derive(Debug, Deserialize)]
pub struct RequestForm {
    pub email: String,
}

/// Friends page template.
#[derive(Template, WebTemplate)]
#[template(path = "friends/index.html")]
pub struct FriendsTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Flash,
    pub friends: Vec<Friend>,
    pub requests: Vec<FriendRequest>,
}

/// List friends and incoming requests.
#[instrument(skip(state, user, query), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let service = FriendService::new(state.pool());
    let friends = service.list_friends(user.id).await?;
    let requests = service.pending_requests(user.id).await?;

    Ok(FriendsTemplate {
        current_user: Some(user),
        flash: Flash::from(&query),
        friends,
        requests,
    })
}

/// Send a friend request by email.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn send_request(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    FlashForm(form): FlashForm<RequestForm>,
) -> Result<Redirect, AppError> {
    let result = FriendService::new(state.pool())
        .send_request(user.id, &form.email)
        .await;
    flash_redirect(result, "/friends", "request_sent")
}

/// Accept a request from reader `id`.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn accept(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    let result = FriendService::new(state.pool())
        .accept_request(user.id, UserId::new(id))
        .await;
    flash_redirect(result, "/friends", "friend_added")
}

/// Remove a friend, or decline a request.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    let result = FriendService::new(state.pool())
        .remove_friend(user.id, UserId::new(id))
        .await;
    flash_redirect(result, "/friends", "friend_removed")
}
