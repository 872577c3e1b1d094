//! Friendships between readers.

use sqlx::PgPool;
use thiserror::Error;

use shelfwise_core::{Email, UserId};

use crate::db::{FriendshipRepository, Insertion, RepositoryError, UserRepository};
use crate::models::{Friend, FriendRequest};

/// Errors from friendship operations.
#[derive(Debug, Error)]
pub enum FriendError {
    #[error("No reader with that email address.")]
    UserNotFound,

    #[error("You can't send a friend request to yourself.")]
    SelfRequest,

    #[error("You're already friends, or a request is already pending.")]
    AlreadyExists,

    #[error("That friend request no longer exists.")]
    RequestNotFound,

    #[error("You're not friends with that reader.")]
    NotFriends,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl FriendError {
    /// Short code carried in `?error=` redirects.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound => "user_not_found",
            Self::SelfRequest => "self_request",
            Self::AlreadyExists => "already_friends",
            Self::RequestNotFound => "request_not_found",
            Self::NotFriends => "not_friends",
            Self::Repository(_) => "server_error",
        }
    }
}

/// Friendship service.
pub struct FriendService<'a> {
    friendships: FriendshipRepository<'a>,
    users: UserRepository<'a>,
}

impl<'a> FriendService<'a> {
    /// Create a new friendship service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            friendships: FriendshipRepository::new(pool),
            users: UserRepository::new(pool),
        }
    }

    /// Send a friend request to the reader with `to_email`.
    ///
    /// # Errors
    ///
    /// Returns `FriendError::UserNotFound` for unknown or malformed emails,
    /// `FriendError::SelfRequest` for the sender's own email, and
    /// `FriendError::AlreadyExists` if the pair already has a request or
    /// friendship in either direction.
    pub async fn send_request(&self, from: UserId, to_email: &str) -> Result<(), FriendError> {
        let email = Email::parse(to_email).map_err(|_| FriendError::UserNotFound)?;
        let to = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(FriendError::UserNotFound)?;

        if to.id == from {
            return Err(FriendError::SelfRequest);
        }

        match self.friendships.request(from, to.id).await? {
            Insertion::Created(()) => {
                tracing::info!(from = %from, to = %to.id, "Friend request sent");
                Ok(())
            }
            Insertion::AlreadyExists => Err(FriendError::AlreadyExists),
        }
    }

    /// Accept a pending request from `requester`.
    ///
    /// # Errors
    ///
    /// Returns `FriendError::RequestNotFound` if there is no pending request.
    pub async fn accept_request(&self, user: UserId, requester: UserId) -> Result<(), FriendError> {
        if self.friendships.accept(requester, user).await? {
            Ok(())
        } else {
            Err(FriendError::RequestNotFound)
        }
    }

    /// Remove a friend, or decline or cancel a pending request.
    ///
    /// # Errors
    ///
    /// Returns `FriendError::NotFriends` if the pair has no row.
    pub async fn remove_friend(&self, user: UserId, other: UserId) -> Result<(), FriendError> {
        if self.friendships.remove(user, other).await? {
            Ok(())
        } else {
            Err(FriendError::NotFriends)
        }
    }

    /// Accepted friends.
    ///
    /// # Errors
    ///
    /// Returns `FriendError::Repository` if the query fails.
    pub async fn list_friends(&self, user: UserId) -> Result<Vec<Friend>, FriendError> {
        Ok(self.friendships.friends(user).await?)
    }

    /// Requests waiting for the user's answer.
    ///
    /// # Errors
    ///
    /// Returns `FriendError::Repository` if the query fails.
    pub async fn pending_requests(&self, user: UserId) -> Result<Vec<FriendRequest>, FriendError> {
        Ok(self.friendships.incoming(user).await?)
    }
}
