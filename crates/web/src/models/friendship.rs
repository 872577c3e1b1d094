//! Friendship types.

use chrono::{DateTime, Utc};

use shelfwise_core::UserId;

/// An accepted friend, from the viewing user's side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Friend {
    pub user_id: UserId,
    pub display_name: String,
    pub since: DateTime<Utc>,
}

/// A pending request addressed to the viewing user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendRequest {
    pub requester_id: UserId,
    pub requester_name: String,
    pub created_at: DateTime<Utc>,
}
