//! Site content singleton repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use super::RepositoryError;
use crate::models::content::{AboutContent, HomeContent, SiteContent};

/// The only row id `site_content` accepts.
const SINGLETON_ID: i32 = 1;

#[derive(Debug, sqlx::FromRow)]
struct SiteContentRow {
    home: Json<HomeContent>,
    about: Json<AboutContent>,
    updated_at: DateTime<Utc>,
}

impl From<SiteContentRow> for SiteContent {
    fn from(row: SiteContentRow) -> Self {
        Self {
            home: row.home.0,
            about: row.about.0,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for the home/about text blocks.
pub struct ContentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Current content, creating the default row on first read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self) -> Result<SiteContent, RepositoryError> {
        let existing = sqlx::query_as::<_, SiteContentRow>(
            "SELECT home, about, updated_at FROM site_content WHERE id = $1",
        )
        .bind(SINGLETON_ID)
        .fetch_optional(self.pool)
        .await?;

        if let Some(row) = existing {
            return Ok(row.into());
        }

        // Concurrent first reads both insert; the loser keeps the winner's row
        let row = sqlx::query_as::<_, SiteContentRow>(
            r"
            INSERT INTO site_content (id, home, about)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET id = EXCLUDED.id
            RETURNING home, about, updated_at
            ",
        )
        .bind(SINGLETON_ID)
        .bind(Json(HomeContent::default()))
        .bind(Json(AboutContent::default()))
        .fetch_one(self.pool)
        .await?;

        tracing::info!("Created default site content");
        Ok(row.into())
    }

    /// Overwrite both blocks and refresh `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn save(
        &self,
        home: &HomeContent,
        about: &AboutContent,
    ) -> Result<SiteContent, RepositoryError> {
        let row = sqlx::query_as::<_, SiteContentRow>(
            r"
            INSERT INTO site_content (id, home, about, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (id) DO UPDATE
            SET home = EXCLUDED.home, about = EXCLUDED.about, updated_at = NOW()
            RETURNING home, about, updated_at
            ",
        )
        .bind(SINGLETON_ID)
        .bind(Json(home))
        .bind(Json(about))
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }
}
