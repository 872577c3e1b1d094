//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::db::StatsRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{CurrentAdmin, DashboardCounts};
use crate::state::AppState;

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub current_admin: Option<CurrentAdmin>,
    pub counts: DashboardCounts,
}

/// Dashboard page handler.
///
/// GET /
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<DashboardTemplate, AppError> {
    let counts = StatsRepository::new(state.pool()).counts().await?;

    Ok(DashboardTemplate {
        current_admin: Some(admin),
        counts,
    })
}
