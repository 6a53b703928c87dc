//! Services catalogue: categories, products and category images.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use lakeside_core::{MediaItemId, ServiceCategoryId, ServiceProductId};

use super::success;
use crate::db::{CategoryRepository, MediaRepository, ProductRepository};
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::media::{MediaItem, MediaKind};
use crate::models::service::{CategoryDraft, ProductDraft, ServiceCategory, ServiceProduct};
use crate::routes::forms::{FormOrJson, UploadForm};
use crate::services::catalog::{Catalog, CategoryListing};
use crate::state::AppState;

type SiteCatalog<'a> =
    Catalog<'a, CategoryRepository<'a>, ProductRepository<'a>, MediaRepository<'a>>;

pub(crate) fn catalog(state: &AppState) -> SiteCatalog<'_> {
    Catalog::new(
        CategoryRepository::new(state.pool()),
        ProductRepository::new(state.pool()),
        MediaRepository::new(state.pool(), MediaKind::ServiceCategory),
        state.uploads(),
    )
}

/// Name and description, shared by categories and products.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NamedForm {
    pub name: String,
    pub description: String,
}

impl From<NamedForm> for CategoryDraft {
    fn from(form: NamedForm) -> Self {
        Self {
            name: form.name,
            description: form.description,
        }
    }
}

impl From<NamedForm> for ProductDraft {
    fn from(form: NamedForm) -> Self {
        Self {
            name: form.name,
            description: form.description,
        }
    }
}

/// Categories with their images and products.
///
/// GET /admin/services/categories
///
/// # Errors
///
/// Returns 500 if a query fails.
pub async fn list_categories(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryListing>>> {
    Ok(Json(catalog(&state).list().await?))
}

/// POST /admin/services/categories
///
/// # Errors
///
/// Returns 400 if the name is blank.
#[instrument(skip_all)]
pub async fn create_category(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    FormOrJson(form): FormOrJson<NamedForm>,
) -> Result<Json<ServiceCategory>> {
    Ok(Json(catalog(&state).create_category(form.into()).await?))
}

/// PUT /admin/services/categories/{id}
///
/// # Errors
///
/// Returns 400 if the name is blank, 404 for an unknown id.
pub async fn update_category(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ServiceCategoryId>,
    FormOrJson(form): FormOrJson<NamedForm>,
) -> Result<Json<ServiceCategory>> {
    Ok(Json(catalog(&state).update_category(id, form.into()).await?))
}

/// Delete a category with its products and images.
///
/// DELETE /admin/services/categories/{id}
///
/// # Errors
///
/// Returns 500 if a query fails.
pub async fn delete_category(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ServiceCategoryId>,
) -> Result<Json<Value>> {
    catalog(&state).delete_category(id).await?;
    Ok(success())
}

/// Upload an image and make it the category's primary image.
///
/// POST /admin/services/categories/{id}/image
///
/// # Errors
///
/// Returns 400 for a missing or non-image file or a full gallery, 404 for
/// an unknown category.
#[instrument(skip(_admin, state, body))]
pub async fn set_category_image(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ServiceCategoryId>,
    body: Multipart,
) -> Result<Json<ServiceCategory>> {
    let file = UploadForm::read(body).await?.take_one("image", "Image file")?;
    Ok(Json(catalog(&state).set_image(id, file).await?))
}

/// POST /admin/services/categories/{id}/images
///
/// # Errors
///
/// Returns 400 past 12 images, 404 for an unknown category.
#[instrument(skip(_admin, state, body))]
pub async fn add_category_images(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ServiceCategoryId>,
    body: Multipart,
) -> Result<Json<Vec<MediaItem>>> {
    let files = UploadForm::read(body).await?.take_all("images");
    Ok(Json(catalog(&state).add_images(id, files).await?))
}

/// DELETE /admin/services/categories/images/{image_id}
///
/// # Errors
///
/// Returns 500 if a query fails.
pub async fn delete_category_image(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(image_id): Path<MediaItemId>,
) -> Result<Json<Value>> {
    catalog(&state).delete_image(image_id).await?;
    Ok(success())
}

/// POST /admin/services/categories/{id}/products
///
/// # Errors
///
/// Returns 400 if the name is blank, 404 for an unknown category.
#[instrument(skip(_admin, state, form))]
pub async fn create_product(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ServiceCategoryId>,
    FormOrJson(form): FormOrJson<NamedForm>,
) -> Result<Json<ServiceProduct>> {
    Ok(Json(catalog(&state).create_product(id, form.into()).await?))
}

/// PUT /admin/services/products/{id}
///
/// # Errors
///
/// Returns 400 if the name is blank, 404 for an unknown id.
pub async fn update_product(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ServiceProductId>,
    FormOrJson(form): FormOrJson<NamedForm>,
) -> Result<Json<ServiceProduct>> {
    Ok(Json(catalog(&state).update_product(id, form.into()).await?))
}

/// DELETE /admin/services/products/{id}
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn delete_product(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ServiceProductId>,
) -> Result<Json<Value>> {
    catalog(&state).delete_product(id).await?;
    Ok(success())
}
