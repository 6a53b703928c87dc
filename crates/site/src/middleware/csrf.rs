//! Double-submit CSRF protection for the admin panel.
//!
//! Every `/admin` response carries an HTTP-only `_csrf` cookie holding a
//! random secret. The matching token is `<salt>.<mac>` where `mac` is
//! HMAC-SHA256 over `salt` and the cookie secret, keyed with
//! `SESSION_SECRET`. State-changing requests must echo a valid token in a
//! header, the `_csrf` query parameter, or an urlencoded `_csrf` body field;
//! anything else is rejected with 403 before the handler runs.

use axum::{
    Form, Json,
    body::{Body, to_bytes},
    extract::{FromRequest, FromRequestParts, Query, Request, State},
    http::{HeaderMap, Method, StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::{Rng, distr::Alphanumeric};
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

use super::is_https;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Cookie holding the per-browser CSRF secret.
pub const CSRF_COOKIE: &str = "_csrf";

/// Form field and query parameter carrying the token.
pub const CSRF_FIELD: &str = "_csrf";

/// Headers checked for the token, in order.
pub const CSRF_HEADERS: [&str; 4] = ["csrf-token", "xsrf-token", "x-csrf-token", "x-xsrf-token"];

const SECRET_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

/// Largest urlencoded body buffered while looking for the token.
const MAX_FORM_BYTES: usize = 64 * 1024;

/// Reasons a state-changing request was refused.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CsrfError {
    #[error("CSRF token missing")]
    Missing,

    #[error("invalid CSRF token")]
    Mismatch,
}

impl IntoResponse for CsrfError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "CSRF check failed");
        (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({ "success": false, "message": self.to_string() })),
        )
            .into_response()
    }
}

/// Token matching the current request's CSRF cookie.
///
/// Inserted by [`csrf_middleware`]; empty outside the admin router.
#[derive(Clone, Debug, Default)]
pub struct CsrfToken(pub String);

impl CsrfToken {
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CsrfToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct CsrfField {
    #[serde(rename = "_csrf")]
    csrf: Option<String>,
}

fn random_string(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

fn mac(key: &[u8], salt: &str, secret: &str) -> Result<HmacSha256, CsrfError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| CsrfError::Mismatch)?;
    mac.update(salt.as_bytes());
    mac.update(b".");
    mac.update(secret.as_bytes());
    Ok(mac)
}

/// Issue a fresh token bound to `secret`.
///
/// # Errors
///
/// Fails only if the key is rejected by HMAC, which SHA-256 never does.
pub fn issue_token(key: &[u8], secret: &str) -> Result<String, CsrfError> {
    let salt = random_string(SALT_LENGTH);
    let tag = mac(key, &salt, secret)?.finalize().into_bytes();
    Ok(format!("{salt}.{}", URL_SAFE_NO_PAD.encode(tag)))
}

/// Check a submitted token against the cookie secret in constant time.
///
/// # Errors
///
/// Returns `Mismatch` for a malformed token or a wrong MAC.
pub fn verify_token(key: &[u8], secret: &str, token: &str) -> Result<(), CsrfError> {
    let (salt, tag) = token.split_once('.').ok_or(CsrfError::Mismatch)?;
    let tag = URL_SAFE_NO_PAD
        .decode(tag)
        .map_err(|_| CsrfError::Mismatch)?;
    mac(key, salt, secret)?
        .verify_slice(&tag)
        .map_err(|_| CsrfError::Mismatch)
}

const fn is_state_changing(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    CSRF_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    })
}

fn is_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

/// Find the submitted token. Returns the request with its body intact.
async fn submitted_token(request: Request) -> Result<(Request, Option<String>), Response> {
    if let Some(token) = token_from_headers(request.headers()) {
        return Ok((request, Some(token)));
    }

    if let Ok(Query(field)) = Query::<CsrfField>::try_from_uri(request.uri())
        && let Some(token) = field.csrf.filter(|t| !t.is_empty())
    {
        return Ok((request, Some(token)));
    }

    if !is_urlencoded(request.headers()) {
        return Ok((request, None));
    }

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_FORM_BYTES)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE.into_response())?;

    let probe = Request::builder()
        .method(Method::POST)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(bytes.clone()))
        .map_err(|_| StatusCode::BAD_REQUEST.into_response())?;
    let token = Form::<CsrfField>::from_request(probe, &())
        .await
        .ok()
        .and_then(|Form(field)| field.csrf)
        .filter(|t| !t.is_empty());

    Ok((Request::from_parts(parts, Body::from(bytes)), token))
}

/// Issue the CSRF cookie when missing and verify state-changing requests.
pub async fn csrf_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let key = state.config().session_secret.expose_secret().as_bytes().to_vec();

    let existing = jar
        .get(CSRF_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty());
    let (secret, new_cookie) = match existing {
        Some(secret) => (secret, None),
        None => {
            let secret = random_string(SECRET_LENGTH);
            let cookie = Cookie::build((CSRF_COOKIE, secret.clone()))
                .path("/admin")
                .http_only(true)
                .secure(is_https(request.headers()))
                .same_site(SameSite::Strict)
                .build();
            (secret, Some(cookie))
        }
    };

    let mut request = request;
    if is_state_changing(request.method()) {
        // A request without the cookie cannot pass the double-submit check
        if new_cookie.is_some() {
            return CsrfError::Missing.into_response();
        }
        let (checked, submitted) = match submitted_token(request).await {
            Ok(found) => found,
            Err(response) => return response,
        };
        let Some(submitted) = submitted else {
            return CsrfError::Missing.into_response();
        };
        if let Err(e) = verify_token(&key, &secret, &submitted) {
            return e.into_response();
        }
        request = checked;
    }

    match issue_token(&key, &secret) {
        Ok(token) => {
            request.extensions_mut().insert(CsrfToken(token));
        }
        Err(e) => tracing::error!(error = %e, "Failed to issue CSRF token"),
    }

    let response = next.run(request).await;
    match new_cookie {
        Some(cookie) => (jar.add(cookie), response).into_response(),
        None => response,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"k7Qz!m2Rv9#pL4xW8nB1cT6yH3jF0sDe";

    #[test]
    fn test_issued_token_verifies() {
        let token = issue_token(KEY, "cookie-secret").unwrap();
        assert!(verify_token(KEY, "cookie-secret", &token).is_ok());
    }

    #[test]
    fn test_tokens_are_salted() {
        let a = issue_token(KEY, "cookie-secret").unwrap();
        let b = issue_token(KEY, "cookie-secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_token_for_other_cookie_is_rejected() {
        let token = issue_token(KEY, "cookie-secret").unwrap();
        assert_eq!(
            verify_token(KEY, "other-secret", &token),
            Err(CsrfError::Mismatch)
        );
        assert_eq!(
            verify_token(b"another key entirely 0123456789", "cookie-secret", &token),
            Err(CsrfError::Mismatch)
        );
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        for token in ["", "no-dot", "salt.%%%", "salt."] {
            assert_eq!(
                verify_token(KEY, "cookie-secret", token),
                Err(CsrfError::Mismatch),
                "{token}"
            );
        }
    }

    #[test]
    fn test_header_sources() {
        let mut headers = HeaderMap::new();
        assert_eq!(token_from_headers(&headers), None);
        headers.insert("x-xsrf-token", "abc".parse().unwrap());
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc"));
        headers.insert("csrf-token", "first".parse().unwrap());
        assert_eq!(token_from_headers(&headers).as_deref(), Some("first"));
    }

    #[test]
    fn test_safe_methods_are_not_checked() {
        assert!(!is_state_changing(&Method::GET));
        assert!(!is_state_changing(&Method::HEAD));
        assert!(is_state_changing(&Method::POST));
        assert!(is_state_changing(&Method::PUT));
        assert!(is_state_changing(&Method::DELETE));
    }

    #[tokio::test]
    async fn test_token_read_from_urlencoded_body_keeps_body() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/admin/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=admin&_csrf=tok.en&password=x"))
            .unwrap();

        let (request, token) = submitted_token(request).await.unwrap();
        assert_eq!(token.as_deref(), Some("tok.en"));

        let body = to_bytes(request.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"username=admin&_csrf=tok.en&password=x");
    }

    #[tokio::test]
    async fn test_token_read_from_query() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/admin/team/1/image?_csrf=q.tok")
            .body(Body::empty())
            .unwrap();

        let (_, token) = submitted_token(request).await.unwrap();
        assert_eq!(token.as_deref(), Some("q.tok"));
    }
}
