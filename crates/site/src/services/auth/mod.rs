//! Admin authentication service.
//!
//! Username/password login against Argon2 hashes, database-backed sessions
//! identified by an opaque random token, and the first-boot admin bootstrap.
//!
//! Sessions last 24 hours. Expiry is checked lazily: a request carrying an
//! expired token deletes the session row and is treated as signed out. There
//! is no background cleanup.

mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;

use std::future::Future;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use rand::{Rng, distr::Alphanumeric, seq::IndexedRandom};
use secrecy::ExposeSecret;
use tracing::instrument;

use lakeside_core::{AdminUserId, Username};

pub use error::AuthError;

use crate::config::AdminBootstrapConfig;
use crate::db::RepositoryError;
use crate::models::admin::{AdminSession, AdminUser};

/// How long a session stays valid after login.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Length of generated session tokens.
const SESSION_TOKEN_LENGTH: usize = 64;

/// Minimum password length for new or reset passwords.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum accepted password length.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Username used when bootstrapping outside production without configuration.
pub const FALLBACK_ADMIN_USERNAME: &str = "admin";

/// Password used when bootstrapping outside production without configuration.
pub const FALLBACK_ADMIN_PASSWORD: &str = "admin123";

/// Persistence needed by [`AuthService`].
pub trait AuthStore: Send + Sync {
    fn find_user_by_username(
        &self,
        username: &Username,
    ) -> impl Future<Output = Result<Option<AdminUser>, RepositoryError>> + Send;

    fn count_users(&self) -> impl Future<Output = Result<usize, RepositoryError>> + Send;

    fn create_user(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> impl Future<Output = Result<AdminUser, RepositoryError>> + Send;

    /// Returns `None` if no user has that username.
    fn update_password(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> impl Future<Output = Result<Option<AdminUser>, RepositoryError>> + Send;

    fn insert_session(
        &self,
        admin_user_id: AdminUserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<AdminSession, RepositoryError>> + Send;

    fn find_session(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<AdminSession>, RepositoryError>> + Send;

    /// Returns `false` if no session had that token.
    fn delete_session(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    fn delete_sessions_for_user(
        &self,
        admin_user_id: AdminUserId,
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;
}

/// Authentication service for admin login and sessions.
pub struct AuthService<S> {
    store: S,
}

impl<S: AuthStore> AuthService<S> {
    /// Create a new auth service over a store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Verify credentials and open a new 24 hour session.
    ///
    /// The username is trimmed and matched exactly.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the user does not exist or
    /// the password does not match.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<AdminSession, AuthError> {
        let username = Username::parse(username).map_err(|_| AuthError::InvalidCredentials)?;

        let Some(user) = self.store.find_user_by_username(&username).await? else {
            tracing::info!(%username, "Login failed: unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if verify_password(password, &user.password_hash).is_err() {
            tracing::info!(%username, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = generate_token();
        let expires_at = Utc::now() + Duration::hours(SESSION_TTL_HOURS);
        let session = self.store.insert_session(user.id, &token, expires_at).await?;

        tracing::info!(%username, admin_user_id = %user.id, "Admin logged in");
        Ok(session)
    }

    /// Resolve a token to its live session.
    ///
    /// An expired session is deleted as a side effect.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionInvalidOrExpired` if the token is missing,
    /// unknown, or expired.
    pub async fn current_session(&self, token: Option<&str>) -> Result<AdminSession, AuthError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::SessionInvalidOrExpired)?;

        let session = self
            .store
            .find_session(token)
            .await?
            .ok_or(AuthError::SessionInvalidOrExpired)?;

        if session.is_expired(Utc::now()) {
            self.store.delete_session(token).await?;
            tracing::debug!(session_id = %session.id, "Expired admin session removed");
            return Err(AuthError::SessionInvalidOrExpired);
        }

        Ok(session)
    }

    /// Whether `token` belongs to a live session. Fails closed.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store fails.
    pub async fn validate_session(&self, token: Option<&str>) -> Result<bool, AuthError> {
        match self.current_session(token).await {
            Ok(_) => Ok(true),
            Err(AuthError::SessionInvalidOrExpired) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Delete the session for `token`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store fails.
    pub async fn revoke_session(&self, token: Option<&str>) -> Result<(), AuthError> {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.store.delete_session(token).await?;
        }
        Ok(())
    }

    /// Create the first admin if none exists.
    ///
    /// Uses the configured credentials, or `admin` / `admin123` outside
    /// production. Returns the created user, or `None` if an admin already
    /// existed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingBootstrapCredentials` in production when no
    /// admin exists and credentials are not configured.
    pub async fn ensure_default_admin(
        &self,
        bootstrap: &AdminBootstrapConfig,
        production: bool,
    ) -> Result<Option<AdminUser>, AuthError> {
        if self.store.count_users().await? > 0 {
            return Ok(None);
        }

        let (username, password) = match (&bootstrap.username, &bootstrap.password) {
            (Some(username), Some(password)) => {
                (username.clone(), password.expose_secret().to_owned())
            }
            _ if production => return Err(AuthError::MissingBootstrapCredentials),
            (username, password) => (
                username
                    .clone()
                    .unwrap_or_else(|| FALLBACK_ADMIN_USERNAME.to_owned()),
                password.as_ref().map_or_else(
                    || FALLBACK_ADMIN_PASSWORD.to_owned(),
                    |p| p.expose_secret().to_owned(),
                ),
            ),
        };

        let username = Username::parse(&username)?;
        let password_hash = hash_password(&password)?;
        let user = self.store.create_user(&username, &password_hash).await?;

        tracing::warn!(%username, "Created bootstrap admin user");
        Ok(Some(user))
    }

    /// Create an admin user.
    ///
    /// # Errors
    ///
    /// Returns an error if the username or password fails validation, or the
    /// username is taken.
    pub async fn create_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AdminUser, AuthError> {
        let username = Username::parse(username)?;
        validate_new_password(password)?;
        let password_hash = hash_password(password)?;
        Ok(self.store.create_user(&username, &password_hash).await?)
    }

    /// Replace an admin's password and sign out all of their sessions.
    ///
    /// With `create_if_missing`, an unknown username is created instead.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` for an unknown username unless
    /// `create_if_missing` is set, or a validation/store error.
    pub async fn reset_password(
        &self,
        username: &str,
        password: &str,
        create_if_missing: bool,
    ) -> Result<AdminUser, AuthError> {
        let username = Username::parse(username)?;
        validate_new_password(password)?;
        let password_hash = hash_password(password)?;

        match self.store.update_password(&username, &password_hash).await? {
            Some(user) => {
                let revoked = self.store.delete_sessions_for_user(user.id).await?;
                tracing::info!(%username, revoked, "Admin password reset");
                Ok(user)
            }
            None if create_if_missing => {
                tracing::info!(%username, "Admin not found, creating");
                Ok(self.store.create_user(&username, &password_hash).await?)
            }
            None => Err(AuthError::UserNotFound),
        }
    }
}

/// Random alphanumeric session token.
fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Random password drawn from letters, digits and symbols.
#[must_use]
pub fn generate_password(length: usize) -> String {
    const CHARSET: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*";
    let mut rng = rand::rng();
    (0..length)
        .filter_map(|_| CHARSET.choose(&mut rng).copied().map(char::from))
        .collect()
}

fn validate_new_password(password: &str) -> Result<(), AuthError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::memory::MemoryAuthStore;
    use super::*;

    async fn service_with_admin() -> AuthService<MemoryAuthStore> {
        let service = AuthService::new(MemoryAuthStore::default());
        service.create_admin("farmer", "harvest-2026").await.unwrap();
        service
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("harvest-2026").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("harvest-2026", &hash).is_ok());
        assert!(verify_password("wrong", &hash).is_err());
    }

    #[test]
    fn test_verify_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("x", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_tokens_are_long_and_distinct() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), SESSION_TOKEN_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_password_length() {
        assert_eq!(generate_password(16).chars().count(), 16);
    }

    #[tokio::test]
    async fn test_login_then_validate() {
        let service = service_with_admin().await;
        let session = service.login("farmer", "harvest-2026").await.unwrap();

        assert!(service.validate_session(Some(&session.token)).await.unwrap());
        let ttl = session.expires_at - session.created_at;
        assert!(ttl <= Duration::hours(24) && ttl > Duration::hours(23));
    }

    #[tokio::test]
    async fn test_login_trims_username() {
        let service = service_with_admin().await;
        assert!(service.login("  farmer ", "harvest-2026").await.is_ok());
    }

    #[tokio::test]
    async fn test_login_wrong_password_then_right_password() {
        let service = service_with_admin().await;
        let earlier = service.login("farmer", "harvest-2026").await.unwrap();

        assert!(matches!(
            service.login("farmer", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        ));

        let session = service.login("farmer", "harvest-2026").await.unwrap();
        assert_ne!(session.token, earlier.token);
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let service = service_with_admin().await;
        assert!(matches!(
            service.login("nobody", "harvest-2026").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login("", "harvest-2026").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_expired_session_is_deleted() {
        let service = service_with_admin().await;
        let session = service.login("farmer", "harvest-2026").await.unwrap();

        service
            .store
            .set_session_expiry(&session.token, Utc::now() - Duration::seconds(1));

        assert!(!service.validate_session(Some(&session.token)).await.unwrap());
        assert!(service.store.session(&session.token).is_none());
    }

    #[tokio::test]
    async fn test_validate_fails_closed() {
        let service = service_with_admin().await;
        assert!(!service.validate_session(None).await.unwrap());
        assert!(!service.validate_session(Some("")).await.unwrap());
        assert!(!service.validate_session(Some("unknown")).await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_session() {
        let service = service_with_admin().await;
        let session = service.login("farmer", "harvest-2026").await.unwrap();

        service.revoke_session(Some(&session.token)).await.unwrap();
        assert!(!service.validate_session(Some(&session.token)).await.unwrap());

        // Revoking again, or revoking nothing, is fine
        service.revoke_session(Some(&session.token)).await.unwrap();
        service.revoke_session(None).await.unwrap();
    }

    #[tokio::test]
    async fn test_bootstrap_uses_fallback_outside_production() {
        let service = AuthService::new(MemoryAuthStore::default());
        let created = service
            .ensure_default_admin(&AdminBootstrapConfig::default(), false)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.username.as_str(), FALLBACK_ADMIN_USERNAME);
        assert!(
            service
                .login(FALLBACK_ADMIN_USERNAME, FALLBACK_ADMIN_PASSWORD)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let service = service_with_admin().await;
        let created = service
            .ensure_default_admin(&AdminBootstrapConfig::default(), true)
            .await
            .unwrap();
        assert!(created.is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_requires_credentials_in_production() {
        let service = AuthService::new(MemoryAuthStore::default());
        let partial = AdminBootstrapConfig {
            username: Some("owner".to_owned()),
            password: None,
        };
        assert!(matches!(
            service.ensure_default_admin(&partial, true).await,
            Err(AuthError::MissingBootstrapCredentials)
        ));
    }

    #[tokio::test]
    async fn test_bootstrap_uses_configured_credentials() {
        let service = AuthService::new(MemoryAuthStore::default());
        let config = AdminBootstrapConfig {
            username: Some("owner".to_owned()),
            password: Some(SecretString::from("tractor-blue-77")),
        };
        service.ensure_default_admin(&config, true).await.unwrap();
        assert!(service.login("owner", "tractor-blue-77").await.is_ok());
    }

    #[tokio::test]
    async fn test_reset_password_revokes_sessions() {
        let service = service_with_admin().await;
        let session = service.login("farmer", "harvest-2026").await.unwrap();

        service
            .reset_password("farmer", "new-season-88", false)
            .await
            .unwrap();

        assert!(!service.validate_session(Some(&session.token)).await.unwrap());
        assert!(service.login("farmer", "harvest-2026").await.is_err());
        assert!(service.login("farmer", "new-season-88").await.is_ok());
    }

    #[tokio::test]
    async fn test_reset_password_unknown_user() {
        let service = service_with_admin().await;
        assert!(matches!(
            service.reset_password("ghost", "new-season-88", false).await,
            Err(AuthError::UserNotFound)
        ));
        assert!(
            service
                .reset_password("ghost", "new-season-88", true)
                .await
                .is_ok()
        );
        assert!(service.login("ghost", "new-season-88").await.is_ok());
    }

    #[tokio::test]
    async fn test_create_admin_rejects_short_password() {
        let service = AuthService::new(MemoryAuthStore::default());
        assert!(matches!(
            service.create_admin("farmer", "short").await,
            Err(AuthError::WeakPassword(_))
        ));
    }
}
