//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
///
/// Business variants display as the text shown to the reader.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("Please enter a valid email address.")]
    InvalidEmail(#[from] shelfwise_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// User already exists.
    #[error("An account with this email already exists.")]
    UserAlreadyExists,

    /// Password too short.
    #[error("Passwords must be at least {min} characters.")]
    WeakPassword { min: usize },

    /// Display name empty or too long.
    #[error("Display names must be between 1 and {max} characters.")]
    InvalidDisplayName { max: usize },

    /// The account has been restricted by an administrator.
    #[error("This account has been restricted. Please contact support.")]
    AccountRestricted,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Short code carried in `?error=` redirects.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidEmail(_) => "invalid_email",
            Self::InvalidCredentials => "invalid_credentials",
            Self::UserAlreadyExists => "email_taken",
            Self::WeakPassword { .. } => "weak_password",
            Self::InvalidDisplayName { .. } => "invalid_display_name",
            Self::AccountRestricted => "account_restricted",
            Self::Repository(_) | Self::PasswordHash => "server_error",
        }
    }
}
