//! Admin user domain types.

use chrono::{DateTime, Utc};

use shelfwise_core::{AdminRole, AdminUserId, Email};

use super::CurrentAdmin;

/// An admin user (domain type).
#[derive(Debug, Clone)]
pub struct AdminUser {
    /// Unique admin user ID.
    pub id: AdminUserId,
    /// Admin's email address.
    pub email: Email,
    /// Admin's display name.
    pub name: String,
    /// Admin's role/permission level.
    pub role: AdminRole,
    /// When the admin was created.
    pub created_at: DateTime<Utc>,
    /// When the admin was last updated.
    pub updated_at: DateTime<Utc>,
}

impl AdminUser {
    /// Whether this admin may manage other admins.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.role == AdminRole::SuperAdmin
    }
}

impl From<&AdminUser> for CurrentAdmin {
    fn from(admin: &AdminUser) -> Self {
        Self {
            id: admin.id,
            email: admin.email.clone(),
            name: admin.name.clone(),
            role: admin.role,
        }
    }
}
