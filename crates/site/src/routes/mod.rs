//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /about                  - About page
//! GET  /services               - Services catalogue
//! GET  /contact                - Contact page with branches
//! POST /contact                - Contact form (JSON reply)
//! GET  /news                   - Published news
//! GET  /news/{id}              - Article with gallery and related articles
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (database)
//!
//! # Admin (see `admin`)
//! GET  /admin/login            - Login page
//! POST /admin/login            - Login action
//! POST /admin/logout           - Logout action
//! GET  /admin/csrf-token       - CSRF token for API clients
//! GET  /admin                  - Dashboard
//! *    /admin/content, /admin/hero-images, /admin/about-images,
//!      /admin/about-intro-images, /admin/about-accent-images,
//!      /admin/feature-images, /admin/greenhouse-video, /admin/offers,
//!      /admin/testimonials, /admin/team, /admin/services, /admin/news,
//!      /admin/branches
//! ```

pub mod admin;
pub mod forms;
pub mod health;
pub mod pages;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Public page routes.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/services", get(pages::services))
        .route("/contact", get(pages::contact).post(pages::submit_contact))
        .route("/news", get(pages::news))
        .route("/news/{id}", get(pages::news_detail))
}

/// Create all routes for the site.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(page_routes())
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .nest("/admin", admin::routes(state))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::config::SiteConfig;
    use crate::uploads::tests::temp_root;

    use super::*;

    fn app() -> Router {
        let config = SiteConfig::for_tests(temp_root());
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/lakeside_test")
            .unwrap();
        crate::app(AppState::new(config, pool))
    }

    #[tokio::test]
    async fn test_health_reports_environment() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["environment"], "development");
    }

    #[tokio::test]
    async fn test_admin_mutation_without_csrf_is_forbidden() {
        let request = Request::put("/admin/content")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_api_without_session_is_unauthorized() {
        let request = Request::get("/admin/content")
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_page_without_session_redirects_to_login() {
        let request = Request::get("/admin")
            .header(header::ACCEPT, "text/html")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/admin/login"
        );
    }

    #[tokio::test]
    async fn test_csrf_token_endpoint_sets_cookie() {
        let response = app()
            .oneshot(Request::get("/admin/csrf-token").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers().get(header::SET_COOKIE).unwrap();
        assert!(cookie.to_str().unwrap().starts_with("_csrf="));
    }

    /// Fetch a CSRF cookie secret and the matching token.
    async fn csrf_pair(app: &Router) -> (String, String) {
        let response = app
            .clone()
            .oneshot(Request::get("/admin/csrf-token").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let cookie = response.headers().get(header::SET_COOKIE).unwrap();
        let secret = cookie
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .trim_start_matches("_csrf=")
            .to_owned();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        (secret, json["csrfToken"].as_str().unwrap().to_owned())
    }

    fn multipart_image(field: &str) -> (String, Body) {
        let boundary = "lakeside-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"barn.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             PNGDATA\r\n\
             --{boundary}--\r\n"
        );
        (
            format!("multipart/form-data; boundary={boundary}"),
            Body::from(body),
        )
    }

    #[tokio::test]
    async fn test_upload_routes_pass_csrf_and_require_session() {
        let app = app();
        let (secret, token) = csrf_pair(&app).await;

        for (path, field) in [
            ("/admin/hero-images", "images"),
            ("/admin/about-images", "images"),
            ("/admin/greenhouse-video", "video"),
            ("/admin/offers/1/images", "images"),
            ("/admin/services/categories/1/image", "image"),
            ("/admin/services/categories/1/images", "images"),
            ("/admin/news/1/cover", "cover"),
            ("/admin/news/1/images", "images"),
            ("/admin/team/1/image", "image"),
            ("/admin/testimonials/1/avatar", "avatar"),
        ] {
            let (content_type, body) = multipart_image(field);
            let request = Request::post(path)
                .header(header::CONTENT_TYPE, content_type)
                .header(header::ACCEPT, "application/json")
                .header(header::COOKIE, format!("_csrf={secret}"))
                .header("x-csrf-token", &token)
                .body(body)
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");
        }
    }

    #[tokio::test]
    async fn test_upload_with_forged_token_is_forbidden() {
        let app = app();
        let (secret, _) = csrf_pair(&app).await;
        let (content_type, body) = multipart_image("images");
        let request = Request::post("/admin/hero-images")
            .header(header::CONTENT_TYPE, content_type)
            .header(header::COOKIE, format!("_csrf={secret}"))
            .header("x-csrf-token", "not-a-token")
            .body(body)
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_responses_carry_request_id_and_security_headers() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
        assert!(response.headers().contains_key("content-security-policy"));
    }
}
