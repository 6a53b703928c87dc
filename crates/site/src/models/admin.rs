//! Admin user and session models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use lakeside_core::{AdminSessionId, AdminUserId, Username};

/// An administrator who can sign in to `/admin`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: AdminUserId,
    pub username: Username,
    /// Argon2 PHC string.
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A signed-in admin session, identified by its opaque token.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub id: AdminSessionId,
    pub token: String,
    pub admin_user_id: AdminUserId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AdminSession {
    /// Whether the session's expiry lies strictly before `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
