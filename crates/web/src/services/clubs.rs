//! Book clubs: creation, membership and discussion.
//!
//! The owner is a member with role `owner`. Owners cannot leave their club;
//! they delete it instead. Only members may post.

use sqlx::PgPool;
use thiserror::Error;

use shelfwise_core::{ClubId, ClubRole, UserId};

use crate::db::{ClubRepository, Insertion, RepositoryError};
use crate::models::{Club, ClubMember, ClubSummary, Discussion};

const MIN_NAME_LENGTH: usize = 3;
const MAX_NAME_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 1000;
const MAX_POST_LENGTH: usize = 2000;

/// Posts shown on a club page.
pub const DISCUSSION_PAGE_SIZE: i64 = 50;

/// Errors from club operations.
#[derive(Debug, Error)]
pub enum ClubError {
    #[error(
        "Club names must be between {min} and {max} characters.",
        min = MIN_NAME_LENGTH,
        max = MAX_NAME_LENGTH
    )]
    InvalidName,

    #[error("Descriptions can be at most {max} characters.", max = MAX_DESCRIPTION_LENGTH)]
    DescriptionTooLong,

    #[error("Posts must be between 1 and {max} characters.", max = MAX_POST_LENGTH)]
    InvalidPost,

    #[error("That club doesn't exist.")]
    NotFound,

    #[error("You're already a member of this club.")]
    AlreadyMember,

    #[error("You're not a member of this club.")]
    NotMember,

    #[error("Owners can't leave their own club. Delete it instead.")]
    OwnerCannotLeave,

    #[error("Only the club owner can do that.")]
    NotOwner,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ClubError {
    /// Short code carried in `?error=` redirects.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidName => "invalid_club_name",
            Self::DescriptionTooLong => "description_too_long",
            Self::InvalidPost => "invalid_post",
            Self::NotFound => "club_not_found",
            Self::AlreadyMember => "already_member",
            Self::NotMember => "not_member",
            Self::OwnerCannotLeave => "owner_cannot_leave",
            Self::NotOwner => "not_owner",
            Self::Repository(_) => "server_error",
        }
    }
}

/// Trimmed club name and optional description.
///
/// # Errors
///
/// Returns `ClubError::InvalidName` or `ClubError::DescriptionTooLong`.
pub fn validate_club(
    name: &str,
    description: Option<&str>,
) -> Result<(String, Option<String>), ClubError> {
    let name = name.trim();
    let len = name.chars().count();
    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&len) {
        return Err(ClubError::InvalidName);
    }

    let description = description.map(str::trim).filter(|d| !d.is_empty());
    if description.is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH) {
        return Err(ClubError::DescriptionTooLong);
    }

    Ok((name.to_owned(), description.map(str::to_owned)))
}

/// Trimmed discussion post.
///
/// # Errors
///
/// Returns `ClubError::InvalidPost` if blank or too long.
pub fn validate_post(body: &str) -> Result<String, ClubError> {
    let body = body.trim();
    let len = body.chars().count();
    if len == 0 || len > MAX_POST_LENGTH {
        return Err(ClubError::InvalidPost);
    }
    Ok(body.to_owned())
}

/// A club page: the club, its members, recent posts and the viewer's role.
#[derive(Debug, Clone)]
pub struct ClubDetail {
    pub club: Club,
    pub members: Vec<ClubMember>,
    pub discussions: Vec<Discussion>,
    pub viewer_role: Option<ClubRole>,
}

/// Club service.
pub struct ClubService<'a> {
    clubs: ClubRepository<'a>,
}

impl<'a> ClubService<'a> {
    /// Create a new club service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            clubs: ClubRepository::new(pool),
        }
    }

    /// Create a club owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns a validation variant for a bad name or description.
    pub async fn create_club(
        &self,
        owner_id: UserId,
        name: &str,
        description: Option<&str>,
    ) -> Result<Club, ClubError> {
        let (name, description) = validate_club(name, description)?;
        let club = self
            .clubs
            .create(owner_id, &name, description.as_deref())
            .await?;

        tracing::info!(club_id = %club.id, owner_id = %owner_id, "Club created");
        Ok(club)
    }

    /// All clubs with member counts.
    ///
    /// # Errors
    ///
    /// Returns `ClubError::Repository` if the query fails.
    pub async fn list_clubs(&self) -> Result<Vec<ClubSummary>, ClubError> {
        Ok(self.clubs.list_with_counts().await?)
    }

    /// Clubs the user belongs to.
    ///
    /// # Errors
    ///
    /// Returns `ClubError::Repository` if the query fails.
    pub async fn clubs_for(&self, user_id: UserId) -> Result<Vec<ClubSummary>, ClubError> {
        Ok(self.clubs.for_member(user_id).await?)
    }

    /// Everything shown on a club page.
    ///
    /// # Errors
    ///
    /// Returns `ClubError::NotFound` if the club does not exist.
    pub async fn club_detail(
        &self,
        club_id: ClubId,
        viewer: UserId,
    ) -> Result<ClubDetail, ClubError> {
        let club = self.clubs.get(club_id).await?.ok_or(ClubError::NotFound)?;
        let members = self.clubs.members(club_id).await?;
        let discussions = self
            .clubs
            .discussions(club_id, DISCUSSION_PAGE_SIZE)
            .await?;
        let viewer_role = members
            .iter()
            .find(|m| m.user_id == viewer)
            .map(|m| m.role);

        Ok(ClubDetail {
            club,
            members,
            discussions,
            viewer_role,
        })
    }

    /// Join a club as a member.
    ///
    /// # Errors
    ///
    /// Returns `ClubError::AlreadyMember` or `ClubError::NotFound`.
    pub async fn join_club(&self, club_id: ClubId, user_id: UserId) -> Result<(), ClubError> {
        let joined = self
            .clubs
            .join(club_id, user_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ClubError::NotFound,
                other => ClubError::Repository(other),
            })?;

        match joined {
            Insertion::Created(()) => Ok(()),
            Insertion::AlreadyExists => Err(ClubError::AlreadyMember),
        }
    }

    /// Leave a club.
    ///
    /// # Errors
    ///
    /// Returns `ClubError::OwnerCannotLeave` for the owner and
    /// `ClubError::NotMember` for non-members.
    pub async fn leave_club(&self, club_id: ClubId, user_id: UserId) -> Result<(), ClubError> {
        match self.clubs.role_of(club_id, user_id).await? {
            None => Err(ClubError::NotMember),
            Some(ClubRole::Owner) => Err(ClubError::OwnerCannotLeave),
            Some(ClubRole::Member) => {
                self.clubs.leave(club_id, user_id).await?;
                Ok(())
            }
        }
    }

    /// Delete a club. Owner only.
    ///
    /// # Errors
    ///
    /// Returns `ClubError::NotFound` or `ClubError::NotOwner`.
    pub async fn delete_club(&self, club_id: ClubId, user_id: UserId) -> Result<(), ClubError> {
        let club = self.clubs.get(club_id).await?.ok_or(ClubError::NotFound)?;
        if club.owner_id != user_id {
            return Err(ClubError::NotOwner);
        }

        self.clubs.delete(club_id).await?;
        tracing::info!(club_id = %club_id, "Club deleted");
        Ok(())
    }

    /// Post to a club's discussion. Members only.
    ///
    /// # Errors
    ///
    /// Returns `ClubError::InvalidPost` or `ClubError::NotMember`.
    pub async fn post_discussion(
        &self,
        club_id: ClubId,
        user_id: UserId,
        body: &str,
    ) -> Result<Discussion, ClubError> {
        let body = validate_post(body)?;
        if self.clubs.role_of(club_id, user_id).await?.is_none() {
            return Err(ClubError::NotMember);
        }

        self.clubs
            .post_discussion(club_id, user_id, &body)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ClubError::NotFound,
                other => ClubError::Repository(other),
            })
    }

    /// Recent posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ClubError::Repository` if the query fails.
    pub async fn discussions(&self, club_id: ClubId) -> Result<Vec<Discussion>, ClubError> {
        Ok(self
            .clubs
            .discussions(club_id, DISCUSSION_PAGE_SIZE)
            .await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_club_name_bounds() {
        assert!(matches!(validate_club("ab", None), Err(ClubError::InvalidName)));
        assert!(matches!(
            validate_club(&"x".repeat(101), None),
            Err(ClubError::InvalidName)
        ));
        let (name, description) = validate_club("  Sci-Fi Circle ", Some("  ")).unwrap();
        assert_eq!(name, "Sci-Fi Circle");
        assert_eq!(description, None);
    }

    #[test]
    fn test_club_description_limit() {
        let long = "d".repeat(1001);
        assert!(matches!(
            validate_club("Readers", Some(&long)),
            Err(ClubError::DescriptionTooLong)
        ));
    }

    #[test]
    fn test_post_bounds() {
        assert!(matches!(validate_post("   "), Err(ClubError::InvalidPost)));
        assert!(matches!(
            validate_post(&"p".repeat(2001)),
            Err(ClubError::InvalidPost)
        ));
        assert_eq!(validate_post(" Chapter 3 was wild ").unwrap(), "Chapter 3 was wild");
    }
}
