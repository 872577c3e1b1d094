//! Reading goal route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, GoalProgress, ReadingGoal, ReadingStats};
use crate::routes::{Flash, FlashForm, MessageQuery, flash_redirect};
use crate::services::bookshelf::reading_stats;
use crate::services::goals::{motivational_message, progress_analytics};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// New goal form data. The year defaults to the current one.
#[derive(Debug, Deserialize)]
pub struct GoalForm {
    pub year: Option<i32>,
    pub target_books: i32,
}

/// Absolute progress form data.
#[derive(Debug, Deserialize)]
pub struct ProgressForm {
    pub books_read: i32,
}

/// Target change form data.
#[derive(Debug, Deserialize)]
pub struct TargetForm {
    pub target_books: i32,
}

// =============================================================================
// Templates
// =============================================================================

/// A past or future goal with its completion figure.
pub struct GoalRow {
    pub goal: ReadingGoal,
    pub progress: GoalProgress,
}

/// Goals page template.
#[derive(Template, WebTemplate)]
#[template(path = "goals/index.html")]
pub struct GoalsTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Flash,
    pub year: i32,
    pub current: Option<GoalRow>,
    pub message: String,
    pub stats: ReadingStats,
    pub history: Vec<GoalRow>,
}

// =============================================================================
// Handlers
// =============================================================================

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Display the current goal with analytics, plus other years.
#[instrument(skip(state, user, query), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let today = today();
    let year = today.year();

    let goals = state.goals().list_goals(user.id).await?;
    let shelf = state.shelf().get_shelf(user.id).await?;

    let (current, history): (Vec<_>, Vec<_>) = goals
        .into_iter()
        .map(|goal| GoalRow {
            progress: progress_analytics(&goal, today),
            goal,
        })
        .partition(|row| row.goal.year == year);
    let current = current.into_iter().next();

    Ok(GoalsTemplate {
        current_user: Some(user),
        flash: Flash::from(&query),
        year,
        message: motivational_message(current.as_ref().map(|row| &row.goal)),
        stats: reading_stats(&shelf, year),
        current,
        history,
    })
}

/// Set a goal.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn set_goal(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    FlashForm(form): FlashForm<GoalForm>,
) -> Result<Redirect, AppError> {
    let year = form.year.unwrap_or_else(|| today().year());
    let result = state
        .goals()
        .set_goal(user.id, year, form.target_books)
        .await;
    flash_redirect(result, "/goals", "goal_set")
}

/// One more book read.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn increment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(year): Path<i32>,
) -> Result<Redirect, AppError> {
    let result = state.goals().increment_progress(user.id, year).await;
    flash_redirect(result, "/goals", "goal_updated")
}

/// One fewer book read.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn decrement(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(year): Path<i32>,
) -> Result<Redirect, AppError> {
    let result = state.goals().decrement_progress(user.id, year).await;
    flash_redirect(result, "/goals", "goal_updated")
}

/// Set the number of books read.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update_progress(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(year): Path<i32>,
    FlashForm(form): FlashForm<ProgressForm>,
) -> Result<Redirect, AppError> {
    let result = state
        .goals()
        .update_progress(user.id, year, form.books_read)
        .await;
    flash_redirect(result, "/goals", "goal_updated")
}

/// Change a goal's target.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update_target(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(year): Path<i32>,
    FlashForm(form): FlashForm<TargetForm>,
) -> Result<Redirect, AppError> {
    let result = state
        .goals()
        .update_target(user.id, year, form.target_books)
        .await;
    flash_redirect(result, "/goals", "goal_updated")
}

/// Delete a goal.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(year): Path<i32>,
) -> Result<Redirect, AppError> {
    let result = state.goals().delete_goal(user.id, year).await;
    flash_redirect(result, "/goals", "goal_deleted")
}
