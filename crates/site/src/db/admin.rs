//! Admin user and session repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use lakeside_core::{AdminSessionId, AdminUserId, Username};

use super::{RepositoryError, count_to_usize};
use crate::models::admin::{AdminSession, AdminUser};
use crate::services::auth::AuthStore;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: i32,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminUserRow> for AdminUser {
    type Error = RepositoryError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            id: AdminUserId::new(row.id),
            username,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AdminSessionRow {
    id: i32,
    token: String,
    admin_user_id: i32,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<AdminSessionRow> for AdminSession {
    fn from(row: AdminSessionRow) -> Self {
        Self {
            id: AdminSessionId::new(row.id),
            token: row.token,
            admin_user_id: AdminUserId::new(row.admin_user_id),
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for admin users and their sessions.
pub struct AdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all admin users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_users(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminUserRow>(
            r"
            SELECT id, username, password_hash, created_at
            FROM admin_user
            ORDER BY created_at, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

impl AuthStore for AdminRepository<'_> {
    async fn find_user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            r"
            SELECT id, username, password_hash, created_at
            FROM admin_user
            WHERE username = $1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn count_users(&self) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_user")
            .fetch_one(self.pool)
            .await?;
        count_to_usize(count)
    }

    async fn create_user(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<AdminUser, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            r"
            INSERT INTO admin_user (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at
            ",
        )
        .bind(username.as_str())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!("username {username} already exists"));
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    async fn update_password(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            r"
            UPDATE admin_user
            SET password_hash = $2, updated_at = NOW()
            WHERE username = $1
            RETURNING id, username, password_hash, created_at
            ",
        )
        .bind(username.as_str())
        .bind(password_hash)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn insert_session(
        &self,
        admin_user_id: AdminUserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<AdminSession, RepositoryError> {
        let row = sqlx::query_as::<_, AdminSessionRow>(
            r"
            INSERT INTO admin_session (token, admin_user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, token, admin_user_id, expires_at, created_at
            ",
        )
        .bind(token)
        .bind(admin_user_id)
        .bind(expires_at)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_session(&self, token: &str) -> Result<Option<AdminSession>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminSessionRow>(
            r"
            SELECT id, token, admin_user_id, expires_at, created_at
            FROM admin_session
            WHERE token = $1
            ",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete_session(&self, token: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM admin_session WHERE token = $1")
            .bind(token)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_sessions_for_user(
        &self,
        admin_user_id: AdminUserId,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM admin_session WHERE admin_user_id = $1")
            .bind(admin_user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
