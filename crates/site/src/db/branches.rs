//! Branch location repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use lakeside_core::{BranchId, Coordinates};

use super::{RepositoryError, count_to_usize};
use crate::collections::{EditableStore, OrderedStore, Positioned};
use crate::models::branch::{Branch, BranchDraft};

#[derive(Debug, sqlx::FromRow)]
struct BranchRow {
    id: i32,
    name: String,
    address: String,
    latitude: Decimal,
    longitude: Decimal,
    is_active: bool,
    display_order: i32,
    phone: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BranchRow> for Branch {
    type Error = RepositoryError;

    fn try_from(row: BranchRow) -> Result<Self, Self::Error> {
        let coordinates = Coordinates::new(row.latitude, row.longitude).map_err(|e| {
            let reason = format!("invalid coordinates for branch {}: {e}", row.id);
            RepositoryError::DataCorruption(reason)
        })?;

        Ok(Self {
            id: BranchId::new(row.id),
            name: row.name,
            address: row.address,
            coordinates,
            is_active: row.is_active,
            display_order: row.display_order,
            phone: row.phone,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str = "id, name, address, latitude, longitude, is_active, display_order, \
                       phone, description, created_at, updated_at";

/// Repository for branch locations.
pub struct BranchRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BranchRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active branches for the contact page, by display order then name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Branch>, RepositoryError> {
        let rows = sqlx::query_as::<_, BranchRow>(&format!(
            "SELECT {COLUMNS} FROM branch WHERE is_active ORDER BY display_order, name"
        ))
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}

impl OrderedStore for BranchRepository<'_> {
    type Item = Branch;
    type Draft = BranchDraft;

    async fn list(&self, (): ()) -> Result<Vec<Branch>, RepositoryError> {
        let rows = sqlx::query_as::<_, BranchRow>(&format!(
            "SELECT {COLUMNS} FROM branch ORDER BY display_order, id"
        ))
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count(&self, (): ()) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM branch")
            .fetch_one(self.pool)
            .await?;
        count_to_usize(count)
    }

    async fn max_sort_order(&self, (): ()) -> Result<Option<i32>, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT MAX(display_order) FROM branch")
            .fetch_one(self.pool)
            .await?)
    }

    async fn insert_batch(
        &self,
        (): (),
        rows: Vec<Positioned<BranchDraft>>,
    ) -> Result<Vec<Branch>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(rows.len());
        for Positioned { sort_order, draft } in rows {
            let row = sqlx::query_as::<_, BranchRow>(&format!(
                "INSERT INTO branch \
                 (name, address, latitude, longitude, is_active, display_order, phone, description) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                 RETURNING {COLUMNS}"
            ))
            .bind(&draft.name)
            .bind(&draft.address)
            .bind(draft.coordinates.latitude())
            .bind(draft.coordinates.longitude())
            .bind(draft.is_active)
            .bind(sort_order)
            .bind(&draft.phone)
            .bind(&draft.description)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(row.try_into()?);
        }
        tx.commit().await?;
        Ok(saved)
    }

    async fn find(&self, id: BranchId) -> Result<Option<Branch>, RepositoryError> {
        let row =
            sqlx::query_as::<_, BranchRow>(&format!("SELECT {COLUMNS} FROM branch WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, id: BranchId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM branch WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_sort_order(
        &self,
        id: BranchId,
        display_order: i32,
    ) -> Result<Option<Branch>, RepositoryError> {
        let row = sqlx::query_as::<_, BranchRow>(&format!(
            "UPDATE branch SET display_order = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(display_order)
        .fetch_optional(self.pool)
        .await?;
        row.map(TryInto::try_into).transpose()
    }
}

impl EditableStore for BranchRepository<'_> {
    async fn update(
        &self,
        id: BranchId,
        draft: BranchDraft,
    ) -> Result<Option<Branch>, RepositoryError> {
        let row = sqlx::query_as::<_, BranchRow>(&format!(
            "UPDATE branch SET name = $2, address = $3, latitude = $4, longitude = $5, \
             is_active = $6, phone = $7, description = $8, updated_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.address)
        .bind(draft.coordinates.latitude())
        .bind(draft.coordinates.longitude())
        .bind(draft.is_active)
        .bind(&draft.phone)
        .bind(&draft.description)
        .fetch_optional(self.pool)
        .await?;
        row.map(TryInto::try_into).transpose()
    }
}
