//! News article repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use lakeside_core::NewsId;

use super::{RepositoryError, count_to_usize};
use crate::collections::{EditableStore, OrderedStore, Positioned, PrimaryImageStore};
use crate::models::news::{NewsArticle, NewsDraft};

#[derive(Debug, sqlx::FromRow)]
struct NewsRow {
    id: i32,
    title: String,
    content: String,
    excerpt: String,
    author: String,
    featured: bool,
    published: bool,
    publish_date: DateTime<Utc>,
    cover_image_url: String,
    sort_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NewsRow> for NewsArticle {
    fn from(row: NewsRow) -> Self {
        Self {
            id: NewsId::new(row.id),
            title: row.title,
            content: row.content,
            excerpt: row.excerpt,
            author: row.author,
            featured: row.featured,
            published: row.published,
            publish_date: row.publish_date,
            cover_image_url: row.cover_image_url,
            sort_order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "id, title, content, excerpt, author, featured, published, publish_date, \
                       cover_image_url, sort_order, created_at, updated_at";

/// Repository for news articles.
pub struct NewsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NewsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl OrderedStore for NewsRepository<'_> {
    type Item = NewsArticle;
    type Draft = NewsDraft;

    async fn list(&self, (): ()) -> Result<Vec<NewsArticle>, RepositoryError> {
        let rows = sqlx::query_as::<_, NewsRow>(&format!(
            "SELECT {COLUMNS} FROM news ORDER BY sort_order, id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self, (): ()) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM news")
            .fetch_one(self.pool)
            .await?;
        count_to_usize(count)
    }

    async fn max_sort_order(&self, (): ()) -> Result<Option<i32>, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT MAX(sort_order) FROM news")
            .fetch_one(self.pool)
            .await?)
    }

    async fn insert_batch(
        &self,
        (): (),
        rows: Vec<Positioned<NewsDraft>>,
    ) -> Result<Vec<NewsArticle>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(rows.len());
        for Positioned { sort_order, draft } in rows {
            let row = sqlx::query_as::<_, NewsRow>(&format!(
                "INSERT INTO news \
                 (title, content, excerpt, author, featured, published, publish_date, sort_order) \
                 VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()), $8) \
                 RETURNING {COLUMNS}"
            ))
            .bind(&draft.title)
            .bind(&draft.content)
            .bind(&draft.excerpt)
            .bind(&draft.author)
            .bind(draft.featured)
            .bind(draft.published)
            .bind(draft.publish_date)
            .bind(sort_order)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(row.into());
        }
        tx.commit().await?;
        Ok(saved)
    }

    async fn find(&self, id: NewsId) -> Result<Option<NewsArticle>, RepositoryError> {
        let row = sqlx::query_as::<_, NewsRow>(&format!("SELECT {COLUMNS} FROM news WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: NewsId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_sort_order(
        &self,
        id: NewsId,
        sort_order: i32,
    ) -> Result<Option<NewsArticle>, RepositoryError> {
        let row = sqlx::query_as::<_, NewsRow>(&format!(
            "UPDATE news SET sort_order = $2, updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(sort_order)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}

impl EditableStore for NewsRepository<'_> {
    async fn update(
        &self,
        id: NewsId,
        draft: NewsDraft,
    ) -> Result<Option<NewsArticle>, RepositoryError> {
        let row = sqlx::query_as::<_, NewsRow>(&format!(
            "UPDATE news SET title = $2, content = $3, excerpt = $4, author = $5, \
             featured = $6, published = $7, publish_date = COALESCE($8, publish_date), \
             updated_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(&draft.excerpt)
        .bind(&draft.author)
        .bind(draft.featured)
        .bind(draft.published)
        .bind(draft.publish_date)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}

impl PrimaryImageStore for NewsRepository<'_> {
    async fn primary_image(&self, id: NewsId) -> Result<Option<String>, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT cover_image_url FROM news WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    async fn set_primary_image(&self, id: NewsId, url: &str) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE news SET cover_image_url = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(url)
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
