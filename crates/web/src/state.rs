//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::WebConfig;
use crate::db::{PgBookshelfStore, PgGoalStore};
use crate::services::{BookshelfService, ReadingGoalService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    pool: PgPool,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: WebConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, pool }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Reading goal engine backed by `PostgreSQL`.
    #[must_use]
    pub fn goals(&self) -> ReadingGoalService<PgGoalStore> {
        ReadingGoalService::new(PgGoalStore::new(self.inner.pool.clone()))
    }

    /// Bookshelf tracker backed by `PostgreSQL`.
    #[must_use]
    pub fn shelf(&self) -> BookshelfService<PgBookshelfStore> {
        BookshelfService::new(PgBookshelfStore::new(self.inner.pool.clone()))
    }
}
