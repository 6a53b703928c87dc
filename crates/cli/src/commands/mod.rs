//! CLI command implementations.

pub mod admin;
pub mod migrate;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Failure to reach the site database.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Missing environment variable: SITE_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the site database named by `SITE_DATABASE_URL`, falling back
/// to `DATABASE_URL`. Loads `.env` first.
pub async fn connect() -> Result<PgPool, ConnectError> {
    dotenvy::dotenv().ok();

    let url = std::env::var("SITE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| ConnectError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to site database...");
    Ok(lakeside_site::db::create_pool(&SecretString::from(url)).await?)
}
