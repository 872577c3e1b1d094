//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions, stored in the
//! `library.session` table.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::WebConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "shelfwise_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// # Panics
///
/// Panics if the schema name or table name is invalid (never the case for
/// the hardcoded "library" and "session" values).
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &WebConfig,
) -> SessionManagerLayer<PostgresStore> {
    // The session table is created by the web migrations
    let store = PostgresStore::new(pool.clone())
        .with_schema_name("library")
        .expect("valid schema name")
        .with_table_name("session")
        .expect("valid table name");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
