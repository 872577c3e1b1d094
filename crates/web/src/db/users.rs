//! User repository for database operations.
//!
//! Reader accounts and their password hashes. Emails are stored lowercased
//! and matched case-insensitively.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shelfwise_core::{Email, UserId};

use super::RepositoryError;
use crate::models::User;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    display_name: String,
    is_restricted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            display_name: row.display_name,
            is_restricted: row.is_restricted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserWithPasswordRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: Option<String>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, display_name, is_restricted, created_at, updated_at
            FROM library."user"
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, display_name, is_restricted, created_at, updated_at
            FROM library."user"
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a new user with email and password.
    ///
    /// The user row and the password row are written in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        email: &Email,
        display_name: &str,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO library."user" (email, display_name)
            VALUES ($1, $2)
            RETURNING id, email, display_name, is_restricted, created_at, updated_at
            "#,
        )
        .bind(email.as_str())
        .bind(display_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "email already exists"))?;

        let user = User::try_from(row)?;

        sqlx::query(
            r"
            INSERT INTO library.user_password (user_id, password_hash)
            VALUES ($1, $2)
            ",
        )
        .bind(user.id.as_i32())
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Get a user and their password hash by email.
    ///
    /// Returns `None` if the user doesn't exist or has no password set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithPasswordRow>(
            r#"
            SELECT u.id, u.email, u.display_name, u.is_restricted,
                   u.created_at, u.updated_at,
                   p.password_hash
            FROM library."user" u
            LEFT JOIN library.user_password p ON u.id = p.user_id
            WHERE LOWER(u.email) = LOWER($1)
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let Some(password_hash) = row.password_hash else {
            return Ok(None);
        };

        Ok(Some((row.user.try_into()?, password_hash)))
    }
}
