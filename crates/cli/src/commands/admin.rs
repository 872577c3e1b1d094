//! Admin user management commands.
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for the admin schema

use secrecy::SecretString;
use thiserror::Error;

use shelfwise_admin::db;
use shelfwise_admin::services::auth::{AdminAuthError, AdminAuthService};
use shelfwise_core::AdminRole;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, admin")]
    InvalidRole(String),

    /// Validation or storage failure from the admin service.
    #[error(transparent)]
    Auth(#[from] AdminAuthError),
}

/// Parse a role name as accepted on the command line.
fn parse_role(role: &str) -> Result<AdminRole, AdminError> {
    role.trim()
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))
}

/// Create a new admin user with a password.
///
/// # Returns
///
/// The ID of the created admin user.
///
/// # Errors
///
/// Returns `AdminError` for a bad role, a missing database URL, a failed
/// connection, or any validation failure from account creation (invalid
/// email, blank name, short password, duplicate email).
pub async fn create_user(
    email: &str,
    name: &str,
    role: &str,
    password: &str,
) -> Result<i32, AdminError> {
    dotenvy::dotenv().ok();

    let role = parse_role(role)?;

    let database_url = std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| AdminError::MissingEnvVar("ADMIN_DATABASE_URL"))?;

    tracing::info!("Connecting to admin database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Creating admin user: {} ({})", email, role);
    let admin = AdminAuthService::new(&pool)
        .create_admin(email, name, role, password)
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}, Role: {}",
        admin.id,
        admin.email,
        admin.role
    );

    Ok(admin.id.as_i32())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role("super_admin").unwrap(), AdminRole::SuperAdmin);
        assert_eq!(parse_role(" admin ").unwrap(), AdminRole::Admin);
        assert!(matches!(
            parse_role("viewer"),
            Err(AdminError::InvalidRole(r)) if r == "viewer"
        ));
    }
}
