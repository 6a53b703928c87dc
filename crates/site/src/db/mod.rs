//! Database operations for the site `PostgreSQL`.
//!
//! ## Tables
//!
//! - `admin_user` / `admin_session` - Admin authentication
//! - `site_content` - Home/about text singleton (id = 1)
//! - `media_item` - Every uploaded image or video, keyed by collection and scope
//! - `offer_card`, `team_member`, `testimonial` - Simple ordered lists
//! - `service_category` / `service_product` - Services catalogue
//! - `news` - News articles (images live in `media_item`)
//! - `branch` - Branch locations for the contact page
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p lakeside-cli -- migrate
//! ```

pub mod admin;
pub mod branches;
pub mod content;
pub mod media;
pub mod news;
pub mod offers;
pub mod services;
pub mod team;
pub mod testimonials;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admin::AdminRepository;
pub use branches::BranchRepository;
pub use content::ContentRepository;
pub use media::MediaRepository;
pub use news::NewsRepository;
pub use offers::OfferRepository;
pub use services::{CategoryRepository, ProductRepository};
pub use team::TeamRepository;
pub use testimonials::TestimonialRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Convert a `COUNT(*)` result into a collection size.
pub(crate) fn count_to_usize(count: i64) -> Result<usize, RepositoryError> {
    usize::try_from(count)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative row count: {count}")))
}
