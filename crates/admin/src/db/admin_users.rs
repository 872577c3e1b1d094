//! Admin user repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shelfwise_core::{AdminRole, AdminUserId, Email};

use super::RepositoryError;
use crate::models::AdminUser;

#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: i32,
    email: String,
    name: String,
    role: AdminRole,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AdminUserRow> for AdminUser {
    type Error = RepositoryError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: AdminUserId::new(row.id),
            email,
            name: row.name,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AdminWithPasswordRow {
    #[sqlx(flatten)]
    admin: AdminUserRow,
    password_hash: String,
}

const ADMIN_COLUMNS: &str = "id, email, name, role, created_at, updated_at";

/// Repository for admin user database operations.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all admin users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM admin.admin_user ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, AdminUserRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an admin user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM admin.admin_user WHERE id = $1");
        let row = sqlx::query_as::<_, AdminUserRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an admin user and their password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(AdminUser, String)>, RepositoryError> {
        let sql = format!(
            "SELECT {ADMIN_COLUMNS}, password_hash FROM admin.admin_user \
             WHERE LOWER(email) = LOWER($1)"
        );
        let row = sqlx::query_as::<_, AdminWithPasswordRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some((AdminUser::try_from(row.admin)?, row.password_hash)))
    }

    /// Create a new admin user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        role: AdminRole,
        password_hash: &str,
    ) -> Result<AdminUser, RepositoryError> {
        let sql = format!(
            "INSERT INTO admin.admin_user (email, name, role, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING {ADMIN_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AdminUserRow>(&sql)
            .bind(email.as_str())
            .bind(name)
            .bind(role)
            .bind(password_hash)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "admin email already exists"))?;

        row.try_into()
    }

    /// Count admin users with a given role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_role(&self, role: AdminRole) -> Result<i64, RepositoryError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM admin.admin_user WHERE role = $1")
                .bind(role)
                .fetch_one(self.pool)
                .await?;

        Ok(count)
    }
}
