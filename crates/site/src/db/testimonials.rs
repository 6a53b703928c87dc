//! Testimonial repository.

use sqlx::PgPool;

use lakeside_core::{Rating, TestimonialId};

use super::{RepositoryError, count_to_usize};
use crate::collections::{EditableStore, OrderedStore, Positioned, PrimaryImageStore};
use crate::models::testimonial::{Testimonial, TestimonialDraft};

#[derive(Debug, sqlx::FromRow)]
struct TestimonialRow {
    id: i32,
    name: String,
    role: String,
    quote: String,
    rating: i32,
    avatar_url: String,
    sort_order: i32,
}

impl From<TestimonialRow> for Testimonial {
    fn from(row: TestimonialRow) -> Self {
        Self {
            id: TestimonialId::new(row.id),
            name: row.name,
            role: row.role,
            quote: row.quote,
            rating: Rating::clamped(i64::from(row.rating)),
            avatar_url: row.avatar_url,
            sort_order: row.sort_order,
        }
    }
}

const COLUMNS: &str = "id, name, role, quote, rating, avatar_url, sort_order";

/// Repository for home page testimonials.
pub struct TestimonialRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TestimonialRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl OrderedStore for TestimonialRepository<'_> {
    type Item = Testimonial;
    type Draft = TestimonialDraft;

    async fn list(&self, (): ()) -> Result<Vec<Testimonial>, RepositoryError> {
        let rows = sqlx::query_as::<_, TestimonialRow>(&format!(
            "SELECT {COLUMNS} FROM testimonial ORDER BY sort_order, id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self, (): ()) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM testimonial")
            .fetch_one(self.pool)
            .await?;
        count_to_usize(count)
    }

    async fn max_sort_order(&self, (): ()) -> Result<Option<i32>, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT MAX(sort_order) FROM testimonial")
            .fetch_one(self.pool)
            .await?)
    }

    async fn insert_batch(
        &self,
        (): (),
        rows: Vec<Positioned<TestimonialDraft>>,
    ) -> Result<Vec<Testimonial>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(rows.len());
        for Positioned { sort_order, draft } in rows {
            let row = sqlx::query_as::<_, TestimonialRow>(&format!(
                "INSERT INTO testimonial (name, role, quote, rating, sort_order) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
            ))
            .bind(&draft.name)
            .bind(&draft.role)
            .bind(&draft.quote)
            .bind(i32::from(draft.rating.value()))
            .bind(sort_order)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(row.into());
        }
        tx.commit().await?;
        Ok(saved)
    }

    async fn find(&self, id: TestimonialId) -> Result<Option<Testimonial>, RepositoryError> {
        let row = sqlx::query_as::<_, TestimonialRow>(&format!(
            "SELECT {COLUMNS} FROM testimonial WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: TestimonialId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM testimonial WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_sort_order(
        &self,
        id: TestimonialId,
        sort_order: i32,
    ) -> Result<Option<Testimonial>, RepositoryError> {
        let row = sqlx::query_as::<_, TestimonialRow>(&format!(
            "UPDATE testimonial SET sort_order = $2 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(sort_order)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}

impl EditableStore for TestimonialRepository<'_> {
    async fn update(
        &self,
        id: TestimonialId,
        draft: TestimonialDraft,
    ) -> Result<Option<Testimonial>, RepositoryError> {
        let row = sqlx::query_as::<_, TestimonialRow>(&format!(
            "UPDATE testimonial SET name = $2, role = $3, quote = $4, rating = $5 \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.role)
        .bind(&draft.quote)
        .bind(i32::from(draft.rating.value()))
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}

impl PrimaryImageStore for TestimonialRepository<'_> {
    async fn primary_image(&self, id: TestimonialId) -> Result<Option<String>, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT avatar_url FROM testimonial WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    async fn set_primary_image(
        &self,
        id: TestimonialId,
        url: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE testimonial SET avatar_url = $2 WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
