//! Image galleries, hero images and the greenhouse video.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    routing::{delete, get},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use lakeside_core::MediaItemId;

use super::{media_collection, success};
use crate::db::MediaRepository;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::media::{MediaDraft, MediaItem, MediaKind};
use crate::routes::forms::{FormOrJson, UploadForm};
use crate::services::gallery::{GreenhouseVideo, HeroImages};
use crate::state::AppState;

/// A global image collection with list, upload and delete endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Gallery {
    kind: MediaKind,
    /// Multipart field carrying the files.
    field: &'static str,
    single: bool,
}

impl Gallery {
    /// Several files per upload, posted as `images`.
    #[must_use]
    pub const fn many(kind: MediaKind) -> Self {
        Self {
            kind,
            field: "images",
            single: false,
        }
    }

    /// One file per upload, posted as `image`.
    #[must_use]
    pub const fn single(kind: MediaKind) -> Self {
        Self {
            kind,
            field: "image",
            single: true,
        }
    }

    /// `GET|POST /` and `DELETE /{id}`.
    pub fn router(self) -> Router<AppState> {
        Router::new()
            .route(
                "/",
                get(move |admin: RequireAdminAuth, state: State<AppState>| self.list(admin, state))
                    .post(
                        move |admin: RequireAdminAuth, state: State<AppState>, body: Multipart| {
                            self.upload(admin, state, body)
                        },
                    ),
            )
            .route(
                "/{id}",
                delete(
                    move |admin: RequireAdminAuth, state: State<AppState>, id: Path<MediaItemId>| {
                        self.remove(admin, state, id)
                    },
                ),
            )
    }

    async fn list(
        self,
        _admin: RequireAdminAuth,
        State(state): State<AppState>,
    ) -> Result<Json<Vec<MediaItem>>> {
        Ok(Json(media_collection(&state, self.kind).list(None).await?))
    }

    async fn upload(
        self,
        _admin: RequireAdminAuth,
        State(state): State<AppState>,
        body: Multipart,
    ) -> Result<Json<Vec<MediaItem>>> {
        let mut form = UploadForm::read(body).await?;
        let files = if self.single {
            vec![form.take_one(self.field, "Image file")?]
        } else {
            form.take_all(self.field)
        };
        let saved = media_collection(&state, self.kind)
            .add_uploads(None, files, MediaDraft::from_upload)
            .await?;
        Ok(Json(saved))
    }

    async fn remove(
        self,
        _admin: RequireAdminAuth,
        State(state): State<AppState>,
        Path(id): Path<MediaItemId>,
    ) -> Result<Json<Value>> {
        media_collection(&state, self.kind).delete(id).await?;
        Ok(success())
    }
}

fn hero(state: &AppState) -> HeroImages<'_, MediaRepository<'_>> {
    HeroImages::new(MediaRepository::new(state.pool(), MediaKind::Hero), state.uploads())
}

fn greenhouse(state: &AppState) -> GreenhouseVideo<'_, MediaRepository<'_>> {
    GreenhouseVideo::new(
        MediaRepository::new(state.pool(), MediaKind::GreenhouseVideo),
        state.uploads(),
    )
}

/// Live hero images. Expired ones are swept first.
///
/// GET /admin/hero-images
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn list_hero(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<MediaItem>>> {
    Ok(Json(hero(&state).list(Utc::now()).await?))
}

/// POST /admin/hero-images
///
/// # Errors
///
/// Returns 400 past 50 live images or for a non-image upload.
#[instrument(skip_all)]
pub async fn upload_hero(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    body: Multipart,
) -> Result<Json<Vec<MediaItem>>> {
    let files = UploadForm::read(body).await?.take_all("images");
    Ok(Json(hero(&state).add(files, Utc::now()).await?))
}

/// DELETE /admin/hero-images/{id}
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn delete_hero(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<MediaItemId>,
) -> Result<Json<Value>> {
    hero(&state).delete(id).await?;
    Ok(success())
}

/// The current video, or `null`.
///
/// GET /admin/greenhouse-video
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn show_greenhouse(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Option<MediaItem>>> {
    Ok(Json(greenhouse(&state).current().await?))
}

/// Replace the greenhouse video.
///
/// POST /admin/greenhouse-video
///
/// # Errors
///
/// Returns 400 for a missing, non-video or oversized file; the current
/// video is kept in that case.
#[instrument(skip_all)]
pub async fn upload_greenhouse(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    body: Multipart,
) -> Result<Json<MediaItem>> {
    let file = UploadForm::read(body).await?.take_one("video", "Video file")?;
    Ok(Json(greenhouse(&state).replace(file).await?))
}

/// DELETE /admin/greenhouse-video/{id}
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn delete_greenhouse(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<MediaItemId>,
) -> Result<Json<Value>> {
    greenhouse(&state).delete(id).await?;
    Ok(success())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub sort_order: i32,
}

/// Move an accent image without touching its siblings.
///
/// PUT /admin/about-accent-images/{id}/order
///
/// # Errors
///
/// Returns 404 if the image does not exist.
pub async fn update_accent_order(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<MediaItemId>,
    FormOrJson(order): FormOrJson<OrderUpdate>,
) -> Result<Json<MediaItem>> {
    let item = media_collection(&state, MediaKind::AboutAccent)
        .update_order(id, order.sort_order)
        .await?;
    Ok(Json(item))
}
