//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `WEB_DATABASE_URL` - `PostgreSQL` connection string for the reader site
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for the admin area
//!
//! Both fall back to `DATABASE_URL` when the two schemas share one database.

use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

fn database_url(key: &'static str) -> Result<String, MigrationError> {
    dotenvy::dotenv().ok();
    std::env::var(key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar(key))
}

/// Run reader site (`library` schema) migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the URL is missing, the connection fails or a
/// migration fails.
pub async fn web() -> Result<(), MigrationError> {
    let database_url = database_url("WEB_DATABASE_URL")?;

    tracing::info!("Connecting to web database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running web migrations...");
    sqlx::migrate!("../web/migrations").run(&pool).await?;

    tracing::info!("Web migrations complete!");
    Ok(())
}

/// Run admin (`admin` schema) migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the URL is missing, the connection fails or a
/// migration fails.
pub async fn admin() -> Result<(), MigrationError> {
    let database_url = database_url("ADMIN_DATABASE_URL")?;

    tracing::info!("Connecting to admin database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running admin migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Admin migrations complete!");
    Ok(())
}
