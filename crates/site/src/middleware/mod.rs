//! HTTP middleware stack for the site.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame and referrer policy)
//! 5. CSRF (admin router only)

pub mod auth;
pub mod csrf;
pub mod request_id;
pub mod security_headers;

use axum::http::HeaderMap;

pub use auth::{RequireAdminAuth, SESSION_COOKIE, wants_html};
pub use csrf::{CsrfError, CsrfToken, csrf_middleware};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;

/// Whether the request reached the proxy over HTTPS.
///
/// The app itself only speaks plain HTTP, so this trusts
/// `X-Forwarded-Proto` and `Forwarded: proto=https`.
#[must_use]
pub fn is_https(headers: &HeaderMap) -> bool {
    let forwarded_proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.split(',').any(|p| p.trim().eq_ignore_ascii_case("https")));
    let forwarded = headers
        .get("forwarded")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains("proto=https"));
    forwarded_proto || forwarded
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_https() {
        let mut headers = HeaderMap::new();
        assert!(!is_https(&headers));
        headers.insert("x-forwarded-proto", "http".parse().unwrap());
        assert!(!is_https(&headers));
        headers.insert("x-forwarded-proto", "https, http".parse().unwrap());
        assert!(is_https(&headers));

        let mut headers = HeaderMap::new();
        headers.insert("forwarded", "for=1.2.3.4;Proto=HTTPS".parse().unwrap());
        assert!(is_https(&headers));
    }
}
