//! Admin users list (super admin only).

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use shelfwise_core::AdminRole;

use crate::db::AdminUserRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireSuperAdmin;
use crate::models::{AdminUser, CurrentAdmin};
use crate::state::AppState;

/// Admin users page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin_users/index.html")]
pub struct AdminUsersTemplate {
    pub current_admin: Option<CurrentAdmin>,
    pub admins: Vec<AdminUser>,
    pub super_admin_count: i64,
}

/// Admin users list page handler.
///
/// GET /admin-users
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn index(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
) -> Result<AdminUsersTemplate, AppError> {
    let repo = AdminUserRepository::new(state.pool());
    let admins = repo.list_all().await?;
    let super_admin_count = repo.count_by_role(AdminRole::SuperAdmin).await?;

    Ok(AdminUsersTemplate {
        current_admin: Some(admin),
        admins,
        super_admin_count,
    })
}
