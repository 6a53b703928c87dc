//! Failures raised by admin login, sessions and account management.

use thiserror::Error;

use crate::db::RepositoryError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Session token missing, unknown, or past its expiry.
    #[error("session invalid or expired")]
    SessionInvalidOrExpired,

    /// No admin exists and production requires explicit credentials.
    #[error("ADMIN_USERNAME and ADMIN_PASSWORD must be set in production")]
    MissingBootstrapCredentials,

    /// Username failed validation.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] lakeside_core::UsernameError),

    /// Password rejected before hashing.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password reset named an account that does not exist.
    #[error("admin user not found")]
    UserNotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// argon2 failed to hash or parse a stored hash.
    #[error("password hashing error")]
    PasswordHash,
}
