//! Offer cards and their image carousels.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use lakeside_core::{MediaItemId, OfferCardId};

use super::{media_collection, success};
use crate::collections::{CollectionError, OrderedCollection, catalogue};
use crate::db::{MediaRepository, OfferRepository};
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::media::{MediaDraft, MediaItem, MediaKind};
use crate::models::offer::{OfferCard, OfferDraft};
use crate::routes::forms::{FormOrJson, UploadForm};
use crate::services::pages::{OfferWithImages, offers_with_images};
use crate::services::required;
use crate::state::AppState;

fn cards(state: &AppState) -> OrderedCollection<'_, OfferRepository<'_>> {
    OrderedCollection::new(
        OfferRepository::new(state.pool()),
        &catalogue::OFFER_CARDS,
        state.uploads(),
    )
}

const fn image_scope(id: OfferCardId) -> Option<i32> {
    Some(id.as_i32())
}

/// Cards in order, each with its images.
///
/// GET /admin/offers
///
/// # Errors
///
/// Returns 500 if a query fails.
pub async fn list(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<OfferWithImages>>> {
    let cards = cards(&state);
    let images = MediaRepository::new(state.pool(), MediaKind::Offer);
    let (cards, images) = tokio::try_join!(cards.list(()), async {
        Ok::<_, CollectionError>(images.list_all_scopes().await?)
    })?;
    Ok(Json(offers_with_images(cards, images)))
}

/// New card label. `title` is accepted as an alias.
#[derive(Debug, Deserialize)]
pub struct OfferUpdate {
    #[serde(default, alias = "title")]
    pub label: String,
}

/// Rename a card.
///
/// PUT /admin/offers/{id}
///
/// # Errors
///
/// Returns 400 for a blank label, 404 for an unknown card.
#[instrument(skip(_admin, state, body))]
pub async fn update(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OfferCardId>,
    FormOrJson(body): FormOrJson<OfferUpdate>,
) -> Result<Json<OfferCard>> {
    let title = required(&body.label, "Label")?;
    Ok(Json(cards(&state).update(id, OfferDraft { title }).await?))
}

/// GET /admin/offers/{id}/images
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn list_images(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OfferCardId>,
) -> Result<Json<Vec<MediaItem>>> {
    let images = media_collection(&state, MediaKind::Offer)
        .list(image_scope(id))
        .await?;
    Ok(Json(images))
}

/// POST /admin/offers/{id}/images
///
/// # Errors
///
/// Returns 404 for an unknown card, 400 past 10 images per card.
#[instrument(skip(_admin, state, body))]
pub async fn add_images(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OfferCardId>,
    body: Multipart,
) -> Result<Json<Vec<MediaItem>>> {
    let files = UploadForm::read(body).await?.take_all("images");
    cards(&state).get(id).await?;
    let saved = media_collection(&state, MediaKind::Offer)
        .add_uploads(image_scope(id), files, MediaDraft::from_upload)
        .await?;
    Ok(Json(saved))
}

/// DELETE /admin/offers/images/{image_id}
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn delete_image(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(image_id): Path<MediaItemId>,
) -> Result<Json<Value>> {
    media_collection(&state, MediaKind::Offer).delete(image_id).await?;
    Ok(success())
}
