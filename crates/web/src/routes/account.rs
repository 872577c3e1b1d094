//! Account dashboard.
//!
//! One page summarizing the reader's year: goal progress, books in hand,
//! recent finishes and shelf counts.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{Datelike, Utc};
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{
    CurrentUser, GoalProgress, ReadingGoal, ReadingStats, Review, ShelfItem, ShelfStats,
};
use crate::routes::{Flash, MessageQuery};
use crate::services::bookshelf::{currently_reading, reading_stats, recently_finished};
use crate::services::goals::{motivational_message, progress_analytics};
use crate::services::{ClubService, FriendService, ReviewService};
use crate::state::AppState;

/// Finished books listed on the dashboard.
const RECENTLY_FINISHED: usize = 5;

/// Account dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct DashboardTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Flash,
    pub year: i32,
    pub goal: Option<ReadingGoal>,
    pub progress: Option<GoalProgress>,
    pub message: String,
    pub reading_now: Vec<ShelfItem>,
    pub finished: Vec<ShelfItem>,
    pub stats: ReadingStats,
    pub shelf_stats: ShelfStats,
    pub club_count: usize,
    pub friend_count: usize,
    pub pending_requests: usize,
    pub recent_reviews: Vec<Review>,
}

/// Display the reading dashboard.
#[instrument(skip(state, user, query), fields(user_id = %user.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let today = Utc::now().date_naive();
    let year = today.year();

    let goal = state.goals().get_goal(user.id, year).await?;
    let progress = goal.as_ref().map(|g| progress_analytics(g, today));

    let shelf_service = state.shelf();
    let shelf = shelf_service.get_shelf(user.id).await?;
    let shelf_stats = shelf_service.get_shelf_stats(user.id).await?;

    let friends = FriendService::new(state.pool());
    let friend_count = friends.list_friends(user.id).await?.len();
    let pending_requests = friends.pending_requests(user.id).await?.len();
    let club_count = ClubService::new(state.pool()).clubs_for(user.id).await?.len();

    let mut recent_reviews = ReviewService::new(state.pool())
        .reviews_by_user(user.id)
        .await?;
    recent_reviews.truncate(3);

    Ok(DashboardTemplate {
        current_user: Some(user),
        flash: Flash::from(&query),
        year,
        message: motivational_message(goal.as_ref()),
        goal,
        progress,
        reading_now: currently_reading(&shelf).into_iter().cloned().collect(),
        finished: recently_finished(&shelf, RECENTLY_FINISHED)
            .into_iter()
            .cloned()
            .collect(),
        stats: reading_stats(&shelf, year),
        shelf_stats,
        club_count,
        friend_count,
        pending_requests,
        recent_reviews,
    })
}
