//! Uploaded media repository.
//!
//! One table backs every image and video collection; a repository instance
//! is bound to a single [`MediaKind`].

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use lakeside_core::MediaItemId;

use super::{RepositoryError, count_to_usize};
use crate::collections::{ExpiringStore, OrderedStore, Positioned};
use crate::models::media::{MediaDraft, MediaItem, MediaKind};
use crate::services::news::CaptionStore;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct MediaRow {
    id: i32,
    collection: String,
    scope_id: Option<i32>,
    filename: String,
    url: String,
    caption: String,
    sort_order: i32,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MediaRow> for MediaItem {
    type Error = RepositoryError;

    fn try_from(row: MediaRow) -> Result<Self, Self::Error> {
        let kind = MediaKind::parse(&row.collection).ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "unknown media collection in database: {}",
                row.collection
            ))
        })?;

        Ok(Self {
            id: MediaItemId::new(row.id),
            kind,
            scope_id: row.scope_id,
            filename: row.filename,
            url: row.url,
            caption: row.caption,
            sort_order: row.sort_order,
            expires_at: row.expires_at,
            created_at: row.created_at,
        })
    }
}

const COLUMNS: &str =
    "id, collection, scope_id, filename, url, caption, sort_order, expires_at, created_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for one media collection.
pub struct MediaRepository<'a> {
    pool: &'a PgPool,
    kind: MediaKind,
}

impl<'a> MediaRepository<'a> {
    /// Create a repository for rows of `kind`.
    #[must_use]
    pub const fn new(pool: &'a PgPool, kind: MediaKind) -> Self {
        Self { pool, kind }
    }

    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Every row of this kind across all scopes, by scope then order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all_scopes(&self) -> Result<Vec<MediaItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, MediaRow>(&format!(
            "SELECT {COLUMNS} FROM media_item WHERE collection = $1 \
             ORDER BY scope_id, sort_order, id"
        ))
        .bind(self.kind.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

impl OrderedStore for MediaRepository<'_> {
    type Item = MediaItem;
    type Draft = MediaDraft;

    async fn list(&self, scope: Option<i32>) -> Result<Vec<MediaItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, MediaRow>(&format!(
            "SELECT {COLUMNS} FROM media_item \
             WHERE collection = $1 AND scope_id IS NOT DISTINCT FROM $2 \
             ORDER BY sort_order, id"
        ))
        .bind(self.kind.as_str())
        .bind(scope)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count(&self, scope: Option<i32>) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM media_item \
             WHERE collection = $1 AND scope_id IS NOT DISTINCT FROM $2",
        )
        .bind(self.kind.as_str())
        .bind(scope)
        .fetch_one(self.pool)
        .await?;
        count_to_usize(count)
    }

    async fn max_sort_order(&self, scope: Option<i32>) -> Result<Option<i32>, RepositoryError> {
        let max: Option<i32> = sqlx::query_scalar(
            "SELECT MAX(sort_order) FROM media_item \
             WHERE collection = $1 AND scope_id IS NOT DISTINCT FROM $2",
        )
        .bind(self.kind.as_str())
        .bind(scope)
        .fetch_one(self.pool)
        .await?;
        Ok(max)
    }

    async fn insert_batch(
        &self,
        scope: Option<i32>,
        rows: Vec<Positioned<MediaDraft>>,
    ) -> Result<Vec<MediaItem>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(rows.len());

        for Positioned { sort_order, draft } in rows {
            let row = sqlx::query_as::<_, MediaRow>(&format!(
                "INSERT INTO media_item \
                 (collection, scope_id, filename, url, caption, sort_order, expires_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 RETURNING {COLUMNS}"
            ))
            .bind(self.kind.as_str())
            .bind(scope)
            .bind(&draft.filename)
            .bind(&draft.url)
            .bind(&draft.caption)
            .bind(sort_order)
            .bind(draft.expires_at)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(row.try_into()?);
        }

        tx.commit().await?;
        Ok(saved)
    }

    async fn find(&self, id: MediaItemId) -> Result<Option<MediaItem>, RepositoryError> {
        let row = sqlx::query_as::<_, MediaRow>(&format!(
            "SELECT {COLUMNS} FROM media_item WHERE id = $1 AND collection = $2"
        ))
        .bind(id)
        .bind(self.kind.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, id: MediaItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM media_item WHERE id = $1 AND collection = $2")
            .bind(id)
            .bind(self.kind.as_str())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_sort_order(
        &self,
        id: MediaItemId,
        sort_order: i32,
    ) -> Result<Option<MediaItem>, RepositoryError> {
        let row = sqlx::query_as::<_, MediaRow>(&format!(
            "UPDATE media_item SET sort_order = $3 \
             WHERE id = $1 AND collection = $2 \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(self.kind.as_str())
        .bind(sort_order)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}

impl ExpiringStore for MediaRepository<'_> {
    async fn expired(&self, now: DateTime<Utc>) -> Result<Vec<MediaItemId>, RepositoryError> {
        let ids: Vec<i32> = sqlx::query_scalar(
            "SELECT id FROM media_item \
             WHERE collection = $1 AND expires_at IS NOT NULL AND expires_at < $2 \
             ORDER BY id",
        )
        .bind(self.kind.as_str())
        .bind(now)
        .fetch_all(self.pool)
        .await?;
        Ok(ids.into_iter().map(MediaItemId::new).collect())
    }
}

impl CaptionStore for MediaRepository<'_> {
    async fn update_caption(
        &self,
        id: MediaItemId,
        caption: &str,
    ) -> Result<Option<MediaItem>, RepositoryError> {
        let row = sqlx::query_as::<_, MediaRow>(&format!(
            "UPDATE media_item SET caption = $3 \
             WHERE id = $1 AND collection = $2 \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(self.kind.as_str())
        .bind(caption)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}
