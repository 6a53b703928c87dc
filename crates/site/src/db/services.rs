//! Service category and product repositories.

use sqlx::PgPool;

use lakeside_core::{ServiceCategoryId, ServiceProductId};

use super::{RepositoryError, count_to_usize};
use crate::collections::{EditableStore, OrderedStore, Positioned, PrimaryImageStore};
use crate::models::service::{CategoryDraft, ProductDraft, ServiceCategory, ServiceProduct};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    description: String,
    image_url: String,
    sort_order: i32,
}

impl From<CategoryRow> for ServiceCategory {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: ServiceCategoryId::new(row.id),
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            sort_order: row.sort_order,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    category_id: i32,
    name: String,
    description: String,
    sort_order: i32,
}

impl From<ProductRow> for ServiceProduct {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ServiceProductId::new(row.id),
            category_id: ServiceCategoryId::new(row.category_id),
            name: row.name,
            description: row.description,
            sort_order: row.sort_order,
        }
    }
}

const CATEGORY_COLUMNS: &str = "id, name, description, image_url, sort_order";
const PRODUCT_COLUMNS: &str = "id, category_id, name, description, sort_order";

// =============================================================================
// Categories
// =============================================================================

/// Repository for service categories.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl OrderedStore for CategoryRepository<'_> {
    type Item = ServiceCategory;
    type Draft = CategoryDraft;

    async fn list(&self, (): ()) -> Result<Vec<ServiceCategory>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM service_category ORDER BY sort_order, id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self, (): ()) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM service_category")
            .fetch_one(self.pool)
            .await?;
        count_to_usize(count)
    }

    async fn max_sort_order(&self, (): ()) -> Result<Option<i32>, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT MAX(sort_order) FROM service_category")
            .fetch_one(self.pool)
            .await?)
    }

    async fn insert_batch(
        &self,
        (): (),
        rows: Vec<Positioned<CategoryDraft>>,
    ) -> Result<Vec<ServiceCategory>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(rows.len());
        for Positioned { sort_order, draft } in rows {
            let row = sqlx::query_as::<_, CategoryRow>(&format!(
                "INSERT INTO service_category (name, description, sort_order) \
                 VALUES ($1, $2, $3) RETURNING {CATEGORY_COLUMNS}"
            ))
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(sort_order)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(row.into());
        }
        tx.commit().await?;
        Ok(saved)
    }

    async fn find(
        &self,
        id: ServiceCategoryId,
    ) -> Result<Option<ServiceCategory>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM service_category WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: ServiceCategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM service_category WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_sort_order(
        &self,
        id: ServiceCategoryId,
        sort_order: i32,
    ) -> Result<Option<ServiceCategory>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "UPDATE service_category SET sort_order = $2 WHERE id = $1 \
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .bind(sort_order)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}

impl EditableStore for CategoryRepository<'_> {
    async fn update(
        &self,
        id: ServiceCategoryId,
        draft: CategoryDraft,
    ) -> Result<Option<ServiceCategory>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "UPDATE service_category SET name = $2, description = $3 WHERE id = $1 \
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.description)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}

impl PrimaryImageStore for CategoryRepository<'_> {
    async fn primary_image(
        &self,
        id: ServiceCategoryId,
    ) -> Result<Option<String>, RepositoryError> {
        Ok(
            sqlx::query_scalar("SELECT image_url FROM service_category WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?,
        )
    }

    async fn set_primary_image(
        &self,
        id: ServiceCategoryId,
        url: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE service_category SET image_url = $2 WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Products
// =============================================================================

/// Repository for products, scoped by category.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl OrderedStore for ProductRepository<'_> {
    type Item = ServiceProduct;
    type Draft = ProductDraft;

    async fn list(
        &self,
        category_id: ServiceCategoryId,
    ) -> Result<Vec<ServiceProduct>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM service_product WHERE category_id = $1 \
             ORDER BY sort_order, id"
        ))
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self, category_id: ServiceCategoryId) -> Result<usize, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM service_product WHERE category_id = $1")
                .bind(category_id)
                .fetch_one(self.pool)
                .await?;
        count_to_usize(count)
    }

    async fn max_sort_order(
        &self,
        category_id: ServiceCategoryId,
    ) -> Result<Option<i32>, RepositoryError> {
        Ok(
            sqlx::query_scalar("SELECT MAX(sort_order) FROM service_product WHERE category_id = $1")
                .bind(category_id)
                .fetch_one(self.pool)
                .await?,
        )
    }

    async fn insert_batch(
        &self,
        category_id: ServiceCategoryId,
        rows: Vec<Positioned<ProductDraft>>,
    ) -> Result<Vec<ServiceProduct>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(rows.len());
        for Positioned { sort_order, draft } in rows {
            let row = sqlx::query_as::<_, ProductRow>(&format!(
                "INSERT INTO service_product (category_id, name, description, sort_order) \
                 VALUES ($1, $2, $3, $4) RETURNING {PRODUCT_COLUMNS}"
            ))
            .bind(category_id)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(sort_order)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(row.into());
        }
        tx.commit().await?;
        Ok(saved)
    }

    async fn find(&self, id: ServiceProductId) -> Result<Option<ServiceProduct>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM service_product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: ServiceProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM service_product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_sort_order(
        &self,
        id: ServiceProductId,
        sort_order: i32,
    ) -> Result<Option<ServiceProduct>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE service_product SET sort_order = $2 WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(sort_order)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}

impl EditableStore for ProductRepository<'_> {
    async fn update(
        &self,
        id: ServiceProductId,
        draft: ProductDraft,
    ) -> Result<Option<ServiceProduct>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE service_product SET name = $2, description = $3 WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.description)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}
