//! Session-related types for admin authentication.

use serde::{Deserialize, Serialize};

use shelfwise_core::{AdminRole, AdminUserId, Email};

/// Session-stored admin identity.
///
/// Built once at login and handed to handlers unchanged by the auth
/// extractors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin's database ID.
    pub id: AdminUserId,
    /// Admin's email address.
    pub email: Email,
    /// Admin's display name.
    pub name: String,
    /// Admin's role/permission level.
    pub role: AdminRole,
}

impl CurrentAdmin {
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.role == AdminRole::SuperAdmin
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
