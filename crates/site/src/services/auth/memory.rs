//! In-memory auth store for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicI32, Ordering};

use chrono::{DateTime, Utc};

use lakeside_core::{AdminSessionId, AdminUserId, Username};

use super::AuthStore;
use crate::db::RepositoryError;
use crate::models::admin::{AdminSession, AdminUser};

#[derive(Default)]
pub struct MemoryAuthStore {
    users: Mutex<Vec<AdminUser>>,
    sessions: Mutex<Vec<AdminSession>>,
    next_id: AtomicI32,
}

impl MemoryAuthStore {
    fn next_id(&self) -> i32 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn users(&self) -> std::sync::MutexGuard<'_, Vec<AdminUser>> {
        self.users
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn sessions(&self) -> std::sync::MutexGuard<'_, Vec<AdminSession>> {
        self.sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Current state of the session with `token`.
    #[must_use]
    pub fn session(&self, token: &str) -> Option<AdminSession> {
        self.sessions().iter().find(|s| s.token == token).cloned()
    }

    /// Force a session's expiry, e.g. into the past.
    pub fn set_session_expiry(&self, token: &str, expires_at: DateTime<Utc>) {
        if let Some(session) = self.sessions().iter_mut().find(|s| s.token == token) {
            session.expires_at = expires_at;
        }
    }
}

impl AuthStore for MemoryAuthStore {
    async fn find_user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<AdminUser>, RepositoryError> {
        Ok(self.users().iter().find(|u| &u.username == username).cloned())
    }

    async fn count_users(&self) -> Result<usize, RepositoryError> {
        Ok(self.users().len())
    }

    async fn create_user(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<AdminUser, RepositoryError> {
        let mut users = self.users();
        if users.iter().any(|u| &u.username == username) {
            return Err(RepositoryError::Conflict(format!(
                "username {username} already exists"
            )));
        }
        let user = AdminUser {
            id: AdminUserId::new(self.next_id()),
            username: username.clone(),
            password_hash: password_hash.to_owned(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update_password(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<Option<AdminUser>, RepositoryError> {
        Ok(self
            .users()
            .iter_mut()
            .find(|u| &u.username == username)
            .map(|u| {
                password_hash.clone_into(&mut u.password_hash);
                u.clone()
            }))
    }

    async fn insert_session(
        &self,
        admin_user_id: AdminUserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<AdminSession, RepositoryError> {
        let session = AdminSession {
            id: AdminSessionId::new(self.next_id()),
            token: token.to_owned(),
            admin_user_id,
            expires_at,
            created_at: Utc::now(),
        };
        self.sessions().push(session.clone());
        Ok(session)
    }

    async fn find_session(&self, token: &str) -> Result<Option<AdminSession>, RepositoryError> {
        Ok(self.session(token))
    }

    async fn delete_session(&self, token: &str) -> Result<bool, RepositoryError> {
        let mut sessions = self.sessions();
        let before = sessions.len();
        sessions.retain(|s| s.token != token);
        Ok(sessions.len() != before)
    }

    async fn delete_sessions_for_user(
        &self,
        admin_user_id: AdminUserId,
    ) -> Result<u64, RepositoryError> {
        let mut sessions = self.sessions();
        let before = sessions.len();
        sessions.retain(|s| s.admin_user_id != admin_user_id);
        Ok(u64::try_from(before - sessions.len()).unwrap_or(u64::MAX))
    }
}
