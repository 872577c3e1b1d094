//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use chrono::{Datelike, Utc};
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{Book, CurrentUser};
use crate::services::CatalogService;
use crate::services::goals::motivational_message;
use crate::state::AppState;

/// Books shown in the "recently added" strip.
const RECENT_BOOKS: i64 = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub current_user: Option<CurrentUser>,
    pub recent_books: Vec<Book>,
    /// Encouragement for the signed-in reader's current goal.
    pub goal_message: Option<String>,
}

/// Display the home page.
#[instrument(skip(state, current_user))]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
) -> Result<impl IntoResponse, AppError> {
    let recent_books = CatalogService::new(state.pool())
        .recent(RECENT_BOOKS)
        .await?;

    let goal_message = match &current_user {
        Some(user) => {
            let goal = state
                .goals()
                .get_goal(user.id, Utc::now().year())
                .await?;
            Some(motivational_message(goal.as_ref()))
        }
        None => None,
    };

    Ok(HomeTemplate {
        current_user,
        recent_books,
        goal_message,
    })
}
