//! Admin login, logout and dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::success;
use crate::error::{AppError, Result};
use crate::middleware::auth::{removal_cookie, session_cookie};
use crate::middleware::{CsrfToken, RequireAdminAuth, SESSION_COOKIE, wants_html};
use crate::routes::forms::FormOrJson;
use crate::services::auth::AuthError;
use crate::state::AppState;

const MAX_USERNAME_CHARS: usize = 64;
const MAX_PASSWORD_CHARS: usize = 128;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub csrf_token: String,
    pub error_message: Option<String>,
}

/// Dashboard shell; sections load their data from the JSON endpoints.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub csrf_token: String,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    /// Trimmed username and raw password, or the message to show.
    fn credentials(&self) -> std::result::Result<(&str, &str), &'static str> {
        let username = self.username.trim();
        if username.is_empty() || self.password.is_empty() {
            return Err("Username and password are required.");
        }
        if username.chars().count() > MAX_USERNAME_CHARS
            || self.password.chars().count() > MAX_PASSWORD_CHARS
        {
            return Err("Username or password is too long.");
        }
        Ok((username, &self.password))
    }
}

/// Render the login page.
///
/// GET /admin/login
#[instrument(skip_all)]
pub async fn login_page(csrf: CsrfToken) -> impl IntoResponse {
    LoginTemplate {
        csrf_token: csrf.0,
        error_message: None,
    }
}

fn login_failure(
    status: StatusCode,
    message: &str,
    headers: &HeaderMap,
    csrf: CsrfToken,
    error: AppError,
) -> Response {
    if wants_html(headers) {
        let page = LoginTemplate {
            csrf_token: csrf.0,
            error_message: Some(message.to_owned()),
        };
        return (status, page).into_response();
    }
    error.into_response()
}

/// Check credentials and start a session.
///
/// POST /admin/login
///
/// HTML clients are redirected to the dashboard (or shown the form again
/// with an error); API clients get JSON.
///
/// # Errors
///
/// Returns 500 if the session store fails.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    csrf: CsrfToken,
    FormOrJson(form): FormOrJson<LoginForm>,
) -> Result<Response> {
    let (username, password) = match form.credentials() {
        Ok(credentials) => credentials,
        Err(message) => {
            return Ok(login_failure(
                StatusCode::BAD_REQUEST,
                message,
                &headers,
                csrf,
                AppError::BadRequest(message.to_owned()),
            ));
        }
    };

    match state.auth().login(username, password).await {
        Ok(session) => {
            let jar = jar.add(session_cookie(session.token, &headers));
            if wants_html(&headers) {
                Ok((jar, Redirect::to("/admin")).into_response())
            } else {
                Ok((jar, success()).into_response())
            }
        }
        Err(AuthError::InvalidCredentials) => Ok(login_failure(
            StatusCode::UNAUTHORIZED,
            "Invalid credentials.",
            &headers,
            csrf,
            AuthError::InvalidCredentials.into(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// End the current session and clear its cookie.
///
/// POST /admin/logout
///
/// # Errors
///
/// Returns 500 if the session store fails.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<impl IntoResponse> {
    let token = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned());
    state.auth().revoke_session(token.as_deref()).await?;
    Ok((jar.remove(removal_cookie()), success()))
}

/// Token matching the caller's CSRF cookie, for API clients.
///
/// GET /admin/csrf-token
pub async fn csrf_token(csrf: CsrfToken) -> impl IntoResponse {
    Json(json!({ "csrfToken": csrf.0 }))
}

/// Dashboard.
///
/// GET /admin
pub async fn dashboard(_admin: RequireAdminAuth, csrf: CsrfToken) -> impl IntoResponse {
    DashboardTemplate { csrf_token: csrf.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, password: &str) -> LoginForm {
        LoginForm {
            username: username.to_owned(),
            password: password.to_owned(),
        }
    }

    #[test]
    fn test_credentials_are_trimmed() {
        let login = form("  owner ", "pw");
        assert_eq!(login.credentials(), Ok(("owner", "pw")));
    }

    #[test]
    fn test_missing_fields() {
        assert!(form("", "pw").credentials().is_err());
        assert!(form("   ", "pw").credentials().is_err());
        assert!(form("owner", "").credentials().is_err());
    }

    #[test]
    fn test_length_limits() {
        assert!(form(&"u".repeat(64), "pw").credentials().is_ok());
        assert!(form(&"u".repeat(65), "pw").credentials().is_err());
        assert!(form("owner", &"p".repeat(129)).credentials().is_err());
    }
}
