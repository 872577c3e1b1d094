//! Admin authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during admin authentication operations.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] shelfwise_core::EmailError),

    /// Unknown email or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Admin user already exists.
    #[error("admin user already exists")]
    UserAlreadyExists,

    /// Name is blank or too long.
    #[error("name must be between 1 and {max} characters")]
    InvalidName { max: usize },

    /// Password too short.
    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    /// Hashing or hash parsing failed.
    #[error("password hash error: {0}")]
    PasswordHash(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
