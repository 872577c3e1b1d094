//! Aggregate counts for the admin dashboard.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::DashboardCounts;

/// Repository for dashboard aggregates.
pub struct StatsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepository<'a> {
    /// Create a new stats repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Row counts across the library schema, in one round trip.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn counts(&self) -> Result<DashboardCounts, RepositoryError> {
        let counts = sqlx::query_as::<_, DashboardCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM library."user") AS users,
                (SELECT COUNT(*) FROM library."user" WHERE is_restricted) AS restricted_users,
                (SELECT COUNT(*) FROM library.book) AS books,
                (SELECT COUNT(*) FROM library.bookshelf_entry) AS shelf_entries,
                (SELECT COUNT(*) FROM library.reading_goal) AS goals,
                (SELECT COUNT(*) FROM library.review) AS reviews,
                (SELECT COUNT(*) FROM library.book_club) AS clubs
            "#,
        )
        .fetch_one(self.pool)
        .await?;

        Ok(counts)
    }
}
