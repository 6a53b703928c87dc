//! Admin session cookie and the extractor guarding admin routes.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::is_https;
use crate::models::admin::AdminSession;
use crate::services::auth::{AuthError, SESSION_TTL_HOURS};
use crate::state::AppState;

/// Cookie carrying the opaque session token.
pub const SESSION_COOKIE: &str = "admin_session";

/// Path every admin cookie is scoped to.
pub const ADMIN_PATH: &str = "/admin";

/// Whether the client asked for an HTML page rather than JSON.
#[must_use]
pub fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Session cookie for a fresh login.
#[must_use]
pub fn session_cookie(token: String, headers: &HeaderMap) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path(ADMIN_PATH)
        .http_only(true)
        .secure(is_https(headers))
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(SESSION_TTL_HOURS))
        .build()
}

/// Cookie that removes the session cookie.
#[must_use]
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path(ADMIN_PATH).build()
}

/// Extractor that requires a live admin session.
///
/// HTML requests without one are redirected to the login page, API
/// requests get 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(session): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Admin {}", session.admin_user_id)
/// }
/// ```
pub struct RequireAdminAuth(pub AdminSession);

/// Error returned when admin authentication is required but missing.
pub enum AdminAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// The session store could not be reached.
    Unavailable,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/admin/login").into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "success": false, "message": "Unauthorized" })),
            )
                .into_response(),
            Self::Unavailable => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned());

        match state.auth().current_session(token.as_deref()).await {
            Ok(session) => {
                sentry::configure_scope(|scope| {
                    scope.set_tag("admin_user_id", session.admin_user_id);
                });
                Ok(Self(session))
            }
            Err(AuthError::SessionInvalidOrExpired) => {
                if wants_html(&parts.headers) {
                    Err(AdminAuthRejection::RedirectToLogin)
                } else {
                    Err(AdminAuthRejection::Unauthorized)
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Session lookup failed");
                Err(AdminAuthRejection::Unavailable)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wants_html() {
        let mut headers = HeaderMap::new();
        assert!(!wants_html(&headers));
        headers.insert(header::ACCEPT, "text/html,application/xhtml+xml".parse().unwrap());
        assert!(wants_html(&headers));
        headers.insert(header::ACCEPT, "application/json".parse().unwrap());
        assert!(!wants_html(&headers));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let mut headers = HeaderMap::new();
        let cookie = session_cookie("tok".to_owned(), &headers);
        assert_eq!(cookie.path(), Some("/admin"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(24)));

        headers.insert("x-forwarded-proto", "https".parse().unwrap());
        assert_eq!(session_cookie("tok".to_owned(), &headers).secure(), Some(true));
    }
}
