//! Database migration command.
//!
//! Migrations live in `crates/site/migrations` and are embedded at compile
//! time.

use sqlx::migrate::MigrateError;
use thiserror::Error;

use super::{ConnectError, connect};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Migration failed: {0}")]
    Migrate(#[from] MigrateError),
}

/// Apply all pending migrations.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running site migrations...");
    sqlx::migrate!("../site/migrations").run(&pool).await?;
    tracing::info!("Site migrations complete");

    Ok(())
}
