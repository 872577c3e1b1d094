//! Book club repository: clubs, memberships and discussions.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shelfwise_core::{ClubId, ClubRole, DiscussionId, UserId};

use super::{Insertion, RepositoryError};
use crate::models::{Club, ClubMember, ClubSummary, Discussion};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ClubRow {
    id: i32,
    name: String,
    description: Option<String>,
    owner_id: i32,
    created_at: DateTime<Utc>,
}

impl From<ClubRow> for Club {
    fn from(row: ClubRow) -> Self {
        Self {
            id: ClubId::new(row.id),
            name: row.name,
            description: row.description,
            owner_id: UserId::new(row.owner_id),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ClubSummaryRow {
    #[sqlx(flatten)]
    club: ClubRow,
    member_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    user_id: i32,
    display_name: String,
    role: ClubRole,
    joined_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct DiscussionRow {
    id: i32,
    club_id: i32,
    user_id: i32,
    author_name: String,
    body: String,
    created_at: DateTime<Utc>,
}

impl From<DiscussionRow> for Discussion {
    fn from(row: DiscussionRow) -> Self {
        Self {
            id: DiscussionId::new(row.id),
            club_id: ClubId::new(row.club_id),
            user_id: UserId::new(row.user_id),
            author_name: row.author_name,
            body: row.body,
            created_at: row.created_at,
        }
    }
}

const SUMMARY_SELECT: &str = r"
    SELECT c.id, c.name, c.description, c.owner_id, c.created_at,
           (SELECT COUNT(*) FROM library.club_membership m WHERE m.club_id = c.id) AS member_count
    FROM library.book_club c
";

// =============================================================================
// Repository
// =============================================================================

/// Repository for book club database operations.
pub struct ClubRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ClubRepository<'a> {
    /// Create a new club repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a club and make its owner the first member.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        owner_id: UserId,
        name: &str,
        description: Option<&str>,
    ) -> Result<Club, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ClubRow>(
            r"
            INSERT INTO library.book_club (name, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, owner_id, created_at
            ",
        )
        .bind(name)
        .bind(description)
        .bind(owner_id.as_i32())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO library.club_membership (club_id, user_id, role)
            VALUES ($1, $2, 'owner')
            ",
        )
        .bind(row.id)
        .bind(owner_id.as_i32())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// All clubs with member counts, largest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_counts(&self) -> Result<Vec<ClubSummary>, RepositoryError> {
        let sql = format!("{SUMMARY_SELECT} ORDER BY member_count DESC, c.name");

        let rows = sqlx::query_as::<_, ClubSummaryRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(summary_from_row).collect())
    }

    /// Clubs the user belongs to.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_member(&self, user_id: UserId) -> Result<Vec<ClubSummary>, RepositoryError> {
        let sql = format!(
            "{SUMMARY_SELECT} WHERE EXISTS (SELECT 1 FROM library.club_membership m \
             WHERE m.club_id = c.id AND m.user_id = $1) ORDER BY c.name"
        );

        let rows = sqlx::query_as::<_, ClubSummaryRow>(&sql)
            .bind(user_id.as_i32())
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(summary_from_row).collect())
    }

    /// Get a club by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, club_id: ClubId) -> Result<Option<Club>, RepositoryError> {
        let row = sqlx::query_as::<_, ClubRow>(
            "SELECT id, name, description, owner_id, created_at FROM library.book_club WHERE id = $1",
        )
        .bind(club_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Members in join order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn members(&self, club_id: ClubId) -> Result<Vec<ClubMember>, RepositoryError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT m.user_id, u.display_name, m.role, m.joined_at
            FROM library.club_membership m
            JOIN library."user" u ON u.id = m.user_id
            WHERE m.club_id = $1
            ORDER BY m.joined_at, m.user_id
            "#,
        )
        .bind(club_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ClubMember {
                user_id: UserId::new(r.user_id),
                display_name: r.display_name,
                role: r.role,
                joined_at: r.joined_at,
            })
            .collect())
    }

    /// The user's role in the club, `None` if not a member.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn role_of(
        &self,
        club_id: ClubId,
        user_id: UserId,
    ) -> Result<Option<ClubRole>, RepositoryError> {
        let row: Option<(ClubRole,)> = sqlx::query_as(
            "SELECT role FROM library.club_membership WHERE club_id = $1 AND user_id = $2",
        )
        .bind(club_id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(role,)| role))
    }

    /// Add a member unless they already belong.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the club does not exist.
    pub async fn join(
        &self,
        club_id: ClubId,
        user_id: UserId,
    ) -> Result<Insertion<()>, RepositoryError> {
        let row: Option<(i32,)> = sqlx::query_as(
            r"
            INSERT INTO library.club_membership (club_id, user_id, role)
            VALUES ($1, $2, 'member')
            ON CONFLICT (club_id, user_id) DO NOTHING
            RETURNING club_id
            ",
        )
        .bind(club_id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "already a member"))?;

        Ok(Insertion::from_returning(row.map(|_| ())))
    }

    /// Returns `true` if a membership was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn leave(&self, club_id: ClubId, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM library.club_membership WHERE club_id = $1 AND user_id = $2",
        )
        .bind(club_id.as_i32())
        .bind(user_id.as_i32())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a club with its memberships and discussions.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, club_id: ClubId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM library.book_club WHERE id = $1")
            .bind(club_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Post to a club's discussion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the club does not exist.
    pub async fn post_discussion(
        &self,
        club_id: ClubId,
        user_id: UserId,
        body: &str,
    ) -> Result<Discussion, RepositoryError> {
        let row = sqlx::query_as::<_, DiscussionRow>(
            r#"
            WITH posted AS (
                INSERT INTO library.club_discussion (club_id, user_id, body)
                VALUES ($1, $2, $3)
                RETURNING id, club_id, user_id, body, created_at
            )
            SELECT p.id, p.club_id, p.user_id, u.display_name AS author_name, p.body, p.created_at
            FROM posted p
            JOIN library."user" u ON u.id = p.user_id
            "#,
        )
        .bind(club_id.as_i32())
        .bind(user_id.as_i32())
        .bind(body)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "duplicate discussion"))?;

        Ok(row.into())
    }

    /// Most recent posts first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn discussions(
        &self,
        club_id: ClubId,
        limit: i64,
    ) -> Result<Vec<Discussion>, RepositoryError> {
        let rows = sqlx::query_as::<_, DiscussionRow>(
            r#"
            SELECT d.id, d.club_id, d.user_id, u.display_name AS author_name, d.body, d.created_at
            FROM library.club_discussion d
            JOIN library."user" u ON u.id = d.user_id
            WHERE d.club_id = $1
            ORDER BY d.created_at DESC, d.id DESC
            LIMIT $2
            "#,
        )
        .bind(club_id.as_i32())
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

fn summary_from_row(row: ClubSummaryRow) -> ClubSummary {
    ClubSummary {
        club: row.club.into(),
        member_count: row.member_count,
    }
}
