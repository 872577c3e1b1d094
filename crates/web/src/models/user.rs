//! User domain types.

use chrono::{DateTime, Utc};

use shelfwise_core::{Email, UserId, UserRole};

use super::CurrentUser;

/// A registered reader (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Email address, stored lowercased.
    pub email: Email,
    pub display_name: String,
    /// Restricted accounts cannot sign in.
    pub is_restricted: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Session identity for this user.
    #[must_use]
    pub fn to_current_user(&self) -> CurrentUser {
        CurrentUser {
            id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            role: UserRole::Member,
        }
    }
}
