//! Admin authentication service.
//!
//! Email and password login against argon2id hashes in `admin.admin_user`.
//! There is no self-service signup: admins are created with
//! `sw-cli admin create`.

mod error;

pub use error::AdminAuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use shelfwise_core::{AdminRole, Email};

use crate::db::RepositoryError;
use crate::db::admin_users::AdminUserRepository;
use crate::models::AdminUser;

/// Minimum admin password length.
pub const MIN_PASSWORD_LENGTH: usize = 12;

const MAX_NAME_LENGTH: usize = 100;

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    users: AdminUserRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: AdminUserRepository::new(pool),
        }
    }

    /// Check an email and password.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` for an unknown email, a
    /// malformed email or a wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser, AdminAuthError> {
        let email = Email::parse(email).map_err(|_| AdminAuthError::InvalidCredentials)?;

        let Some((admin, hash)) = self.users.get_with_password(&email).await? else {
            tracing::warn!("Admin login attempt for unknown email");
            return Err(AdminAuthError::InvalidCredentials);
        };

        if !verify_password(password, &hash)? {
            tracing::warn!(admin_id = %admin.id, "Admin login with wrong password");
            return Err(AdminAuthError::InvalidCredentials);
        }

        tracing::info!(admin_id = %admin.id, "Admin logged in");
        Ok(admin)
    }

    /// Create an admin account.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidEmail`, `InvalidName` or
    /// `WeakPassword` for bad input, and `UserAlreadyExists` for a duplicate
    /// email.
    pub async fn create_admin(
        &self,
        email: &str,
        name: &str,
        role: AdminRole,
        password: &str,
    ) -> Result<AdminUser, AdminAuthError> {
        let email = Email::parse(email)?;
        let name = validate_name(name)?;
        validate_password(password)?;
        let hash = hash_password(password)?;

        let admin = self
            .users
            .create(&email, &name, role, &hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AdminAuthError::UserAlreadyExists,
                other => AdminAuthError::Repository(other),
            })?;

        tracing::info!(admin_id = %admin.id, role = %admin.role, "Admin user created");
        Ok(admin)
    }
}

/// Trimmed admin display name.
///
/// # Errors
///
/// Returns `AdminAuthError::InvalidName` if blank or too long.
pub fn validate_name(name: &str) -> Result<String, AdminAuthError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
        return Err(AdminAuthError::InvalidName {
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(name.to_owned())
}

/// # Errors
///
/// Returns `AdminAuthError::WeakPassword` if shorter than
/// [`MIN_PASSWORD_LENGTH`].
pub fn validate_password(password: &str) -> Result<(), AdminAuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminAuthError::WeakPassword {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

/// Hash a password with argon2id and a random salt.
///
/// # Errors
///
/// Returns `AdminAuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AdminAuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AdminAuthError::PasswordHash(e.to_string()))
}

/// # Errors
///
/// Returns `AdminAuthError::PasswordHash` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AdminAuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AdminAuthError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
