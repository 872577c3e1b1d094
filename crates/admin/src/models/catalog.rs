//! Library-side records as the admin area sees them.

use chrono::{DateTime, Utc};

use shelfwise_core::{BookDetails, BookId, Email, UserId};

/// A reader account with a little context for moderation.
#[derive(Debug, Clone)]
pub struct Reader {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
    pub is_restricted: bool,
    /// Books on the reader's shelf.
    pub shelf_count: i64,
    pub created_at: DateTime<Utc>,
}

/// A catalog book.
#[derive(Debug, Clone)]
pub struct CatalogBook {
    pub id: BookId,
    pub details: BookDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct DashboardCounts {
    pub users: i64,
    pub restricted_users: i64,
    pub books: i64,
    pub shelf_entries: i64,
    pub goals: i64,
    pub reviews: i64,
    pub clubs: i64,
}

impl DashboardCounts {
    /// Readers who can still sign in.
    #[must_use]
    pub const fn active_users(&self) -> i64 {
        self.users - self.restricted_users
    }
}
