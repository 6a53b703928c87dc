//! Offer card repository.

use sqlx::PgPool;

use lakeside_core::OfferCardId;

use super::{RepositoryError, count_to_usize};
use crate::collections::{EditableStore, OrderedStore, Positioned};
use crate::models::offer::{OfferCard, OfferDraft};

#[derive(Debug, sqlx::FromRow)]
struct OfferCardRow {
    id: i32,
    title: String,
    sort_order: i32,
}

impl From<OfferCardRow> for OfferCard {
    fn from(row: OfferCardRow) -> Self {
        Self {
            id: OfferCardId::new(row.id),
            title: row.title,
            sort_order: row.sort_order,
        }
    }
}

/// Repository for the "what we offer" cards.
pub struct OfferRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OfferRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl OrderedStore for OfferRepository<'_> {
    type Item = OfferCard;
    type Draft = OfferDraft;

    async fn list(&self, (): ()) -> Result<Vec<OfferCard>, RepositoryError> {
        let rows = sqlx::query_as::<_, OfferCardRow>(
            "SELECT id, title, sort_order FROM offer_card ORDER BY sort_order, id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self, (): ()) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM offer_card")
            .fetch_one(self.pool)
            .await?;
        count_to_usize(count)
    }

    async fn max_sort_order(&self, (): ()) -> Result<Option<i32>, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT MAX(sort_order) FROM offer_card")
            .fetch_one(self.pool)
            .await?)
    }

    async fn insert_batch(
        &self,
        (): (),
        rows: Vec<Positioned<OfferDraft>>,
    ) -> Result<Vec<OfferCard>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(rows.len());
        for Positioned { sort_order, draft } in rows {
            let row = sqlx::query_as::<_, OfferCardRow>(
                "INSERT INTO offer_card (title, sort_order) VALUES ($1, $2) \
                 RETURNING id, title, sort_order",
            )
            .bind(&draft.title)
            .bind(sort_order)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(row.into());
        }
        tx.commit().await?;
        Ok(saved)
    }

    async fn find(&self, id: OfferCardId) -> Result<Option<OfferCard>, RepositoryError> {
        let row = sqlx::query_as::<_, OfferCardRow>(
            "SELECT id, title, sort_order FROM offer_card WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: OfferCardId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM offer_card WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_sort_order(
        &self,
        id: OfferCardId,
        sort_order: i32,
    ) -> Result<Option<OfferCard>, RepositoryError> {
        let row = sqlx::query_as::<_, OfferCardRow>(
            "UPDATE offer_card SET sort_order = $2 WHERE id = $1 \
             RETURNING id, title, sort_order",
        )
        .bind(id)
        .bind(sort_order)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}

impl EditableStore for OfferRepository<'_> {
    async fn update(
        &self,
        id: OfferCardId,
        draft: OfferDraft,
    ) -> Result<Option<OfferCard>, RepositoryError> {
        let row = sqlx::query_as::<_, OfferCardRow>(
            "UPDATE offer_card SET title = $2 WHERE id = $1 RETURNING id, title, sort_order",
        )
        .bind(id)
        .bind(&draft.title)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}
