//! Book club types.

use chrono::{DateTime, Utc};

use shelfwise_core::{ClubId, ClubRole, DiscussionId, UserId};

/// A book club.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Club {
    pub id: ClubId,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// A club with its member count, for the club list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClubSummary {
    pub club: Club,
    pub member_count: i64,
}

/// A member of a club.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClubMember {
    pub user_id: UserId,
    pub display_name: String,
    pub role: ClubRole,
    pub joined_at: DateTime<Utc>,
}

/// A post in a club's discussion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discussion {
    pub id: DiscussionId,
    pub club_id: ClubId,
    pub user_id: UserId,
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
