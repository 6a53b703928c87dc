//! Testimonial CRUD and avatars.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use lakeside_core::{Rating, TestimonialId};

use super::success;
use crate::collections::{CollectionError, OrderedCollection, catalogue};
use crate::db::TestimonialRepository;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::testimonial::{Testimonial, TestimonialDraft};
use crate::routes::forms::{FormOrJson, UploadForm};
use crate::services::required;
use crate::state::AppState;

fn testimonials(state: &AppState) -> OrderedCollection<'_, TestimonialRepository<'_>> {
    OrderedCollection::new(
        TestimonialRepository::new(state.pool()),
        &catalogue::TESTIMONIALS,
        state.uploads(),
    )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TestimonialForm {
    pub name: String,
    pub role: String,
    pub quote: String,
    /// Clamped to 1..=5; missing means 5.
    pub rating: Option<i64>,
}

impl TestimonialForm {
    fn into_draft(self) -> std::result::Result<TestimonialDraft, CollectionError> {
        Ok(TestimonialDraft {
            name: required(&self.name, "Name")?,
            quote: required(&self.quote, "Quote")?,
            role: self.role.trim().to_owned(),
            rating: Rating::from_input(self.rating),
        })
    }
}

/// GET /admin/testimonials
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn list(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Testimonial>>> {
    Ok(Json(testimonials(&state).list(()).await?))
}

/// POST /admin/testimonials
///
/// # Errors
///
/// Returns 400 if name or quote is blank or 10 testimonials already exist.
#[instrument(skip_all)]
pub async fn create(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    FormOrJson(form): FormOrJson<TestimonialForm>,
) -> Result<Json<Testimonial>> {
    let draft = form.into_draft()?;
    let saved = testimonials(&state).add((), vec![draft]).await?;
    let created = saved
        .into_iter()
        .next()
        .ok_or_else(|| CollectionError::Validation("nothing was saved".to_owned()))?;
    Ok(Json(created))
}

/// PUT /admin/testimonials/{id}
///
/// # Errors
///
/// Returns 400 if name or quote is blank, 404 for an unknown id.
#[instrument(skip(_admin, state, form))]
pub async fn update(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<TestimonialId>,
    FormOrJson(form): FormOrJson<TestimonialForm>,
) -> Result<Json<Testimonial>> {
    let draft = form.into_draft()?;
    Ok(Json(testimonials(&state).update(id, draft).await?))
}

/// DELETE /admin/testimonials/{id}
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn remove(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<TestimonialId>,
) -> Result<Json<Value>> {
    testimonials(&state).delete(id).await?;
    Ok(success())
}

/// Replace the avatar; the previous file is removed.
///
/// POST /admin/testimonials/{id}/avatar
///
/// # Errors
///
/// Returns 400 for a missing or non-image file, 404 for an unknown id.
#[instrument(skip(_admin, state, body))]
pub async fn set_avatar(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<TestimonialId>,
    body: Multipart,
) -> Result<Json<Testimonial>> {
    let file = UploadForm::read(body).await?.take_one("avatar", "Avatar image")?;
    Ok(Json(testimonials(&state).replace_image(id, file).await?))
}
