//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use shelfwise_core::{Email, UserId, UserRole};

/// Session-stored reader identity.
///
/// Written once at login and read by the auth extractors on every request;
/// handlers only ever see an immutable copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Name shown in the header and on club posts.
    pub display_name: String,
    #[serde(default)]
    pub role: UserRole,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
