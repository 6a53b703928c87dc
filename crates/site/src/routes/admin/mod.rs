//! Admin panel routes, mounted at `/admin`.
//!
//! Every route runs behind [`csrf_middleware`]; everything except the login
//! page, login, logout and the CSRF token endpoint also requires a session
//! through [`RequireAdminAuth`](crate::middleware::RequireAdminAuth).
//! List and update endpoints speak JSON; deletes answer
//! `{ "success": true }` whether or not the id existed.

pub mod auth;
pub mod branches;
pub mod content;
pub mod media;
pub mod news;
pub mod offers;
pub mod services;
pub mod team;
pub mod testimonials;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};

use crate::collections::OrderedCollection;
use crate::db::MediaRepository;
use crate::middleware::csrf_middleware;
use crate::models::media::MediaKind;
use crate::state::AppState;

use media::Gallery;

/// Largest admin request body: one greenhouse video plus multipart framing.
pub const MAX_ADMIN_BODY_BYTES: usize = 110 * 1024 * 1024;

/// `{ "success": true }`
pub(crate) fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

/// Manager for one media collection.
pub(crate) fn media_collection(
    state: &AppState,
    kind: MediaKind,
) -> OrderedCollection<'_, MediaRepository<'_>> {
    OrderedCollection::new(
        MediaRepository::new(state.pool(), kind),
        kind.policy(),
        state.uploads(),
    )
}

fn service_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(services::list_categories).post(services::create_category),
        )
        .route(
            "/categories/{id}",
            put(services::update_category).delete(services::delete_category),
        )
        .route("/categories/{id}/image", post(services::set_category_image))
        .route("/categories/{id}/images", post(services::add_category_images))
        .route(
            "/categories/images/{image_id}",
            delete(services::delete_category_image),
        )
        .route("/categories/{id}/products", post(services::create_product))
        .route(
            "/products/{id}",
            put(services::update_product).delete(services::delete_product),
        )
}

fn news_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(news::list).post(news::create))
        .route("/{id}", get(news::show).put(news::update).delete(news::remove))
        .route("/{id}/cover", post(news::set_cover))
        .route("/{id}/images", get(news::list_images).post(news::add_images))
        .route("/images/{image_id}/caption", put(news::update_caption))
        .route("/images/{image_id}", delete(news::delete_image))
}

/// Build the admin router.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Auth
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/csrf-token", get(auth::csrf_token))
        .route("/", get(auth::dashboard))
        // Site content
        .route("/content", get(content::show).put(content::update))
        // Hero images and the greenhouse video
        .route("/hero-images", get(media::list_hero).post(media::upload_hero))
        .route("/hero-images/{id}", delete(media::delete_hero))
        .route(
            "/greenhouse-video",
            get(media::show_greenhouse).post(media::upload_greenhouse),
        )
        .route("/greenhouse-video/{id}", delete(media::delete_greenhouse))
        // Plain galleries
        .nest("/about-images", Gallery::many(MediaKind::About).router())
        .nest("/about-intro-images", Gallery::many(MediaKind::AboutIntro).router())
        .nest("/feature-images", Gallery::many(MediaKind::Feature).router())
        .nest(
            "/about-accent-images",
            Gallery::single(MediaKind::AboutAccent)
                .router()
                .route("/{id}/order", put(media::update_accent_order)),
        )
        // Offers
        .route("/offers", get(offers::list))
        .route("/offers/{id}", put(offers::update))
        .route(
            "/offers/{id}/images",
            get(offers::list_images).post(offers::add_images),
        )
        .route("/offers/images/{image_id}", delete(offers::delete_image))
        // Testimonials
        .route(
            "/testimonials",
            get(testimonials::list).post(testimonials::create),
        )
        .route(
            "/testimonials/{id}",
            put(testimonials::update).delete(testimonials::remove),
        )
        .route("/testimonials/{id}/avatar", post(testimonials::set_avatar))
        // Team
        .route("/team", get(team::list).post(team::create))
        .route("/team/{id}", put(team::update).delete(team::remove))
        .route("/team/{id}/image", post(team::set_image))
        // Services catalogue
        .nest("/services", service_routes())
        // News
        .nest("/news", news_routes())
        // Branches
        .route("/branches", get(branches::list).post(branches::create))
        .route(
            "/branches/{id}",
            put(branches::update).delete(branches::remove),
        )
        .layer(DefaultBodyLimit::max(MAX_ADMIN_BODY_BYTES))
        .layer(middleware::from_fn_with_state(state.clone(), csrf_middleware))
}
