//! News articles, covers and article images.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use lakeside_core::{MediaItemId, NewsId};

use super::success;
use crate::db::{MediaRepository, NewsRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::models::media::{MediaItem, MediaKind};
use crate::models::news::{NewsArticle, NewsDraft};
use crate::routes::forms::{Flag, FormOrJson, UploadForm};
use crate::services::news::Newsroom;
use crate::services::pages::ArticleWithImages;
use crate::state::AppState;

pub(crate) fn newsroom(
    state: &AppState,
) -> Newsroom<'_, NewsRepository<'_>, MediaRepository<'_>> {
    Newsroom::new(
        NewsRepository::new(state.pool()),
        MediaRepository::new(state.pool(), MediaKind::News),
        state.uploads(),
    )
}

/// Article fields. Missing fields keep their current value on update.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewsForm {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub featured: Option<Flag>,
    pub published: Option<Flag>,
    /// RFC 3339 timestamp or a plain `YYYY-MM-DD` date.
    pub publish_date: Option<String>,
}

fn parse_publish_date(value: &str) -> Result<Option<DateTime<Utc>>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(at.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| Some(at.and_utc()))
        .ok_or_else(|| AppError::BadRequest("Invalid publish date".to_owned()))
}

fn keep(field: Option<String>, current: Option<&String>) -> String {
    field.or_else(|| current.cloned()).unwrap_or_default()
}

fn flag(field: Option<Flag>, current: bool) -> bool {
    field.map_or(current, |flag| flag.is_set())
}

impl NewsForm {
    /// Draft from the submitted fields, falling back to `current`.
    fn into_draft(self, current: Option<&NewsArticle>) -> Result<NewsDraft> {
        let publish_date = match self.publish_date.as_deref() {
            Some(value) => parse_publish_date(value)?,
            None => None,
        };
        Ok(NewsDraft {
            title: keep(self.title, current.map(|a| &a.title)),
            content: keep(self.content, current.map(|a| &a.content)),
            excerpt: keep(self.excerpt, current.map(|a| &a.excerpt)),
            author: keep(self.author, current.map(|a| &a.author)),
            featured: flag(self.featured, current.is_some_and(|a| a.featured)),
            published: flag(self.published, current.is_some_and(|a| a.published)),
            publish_date,
        })
    }
}

/// Every article, published or not.
///
/// GET /admin/news
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn list(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<NewsArticle>>> {
    Ok(Json(newsroom(&state).list_all().await?))
}

/// POST /admin/news
///
/// # Errors
///
/// Returns 400 if title or content is blank or the date is malformed.
#[instrument(skip_all)]
pub async fn create(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    FormOrJson(form): FormOrJson<NewsForm>,
) -> Result<Json<NewsArticle>> {
    let draft = form.into_draft(None)?;
    Ok(Json(newsroom(&state).create(draft).await?))
}

/// GET /admin/news/{id}
///
/// # Errors
///
/// Returns 404 for an unknown id.
pub async fn show(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<NewsId>,
) -> Result<Json<ArticleWithImages>> {
    let (article, images) = newsroom(&state).get_with_images(id).await?;
    Ok(Json(ArticleWithImages { article, images }))
}

/// PUT /admin/news/{id}
///
/// # Errors
///
/// Returns 400 if title or content ends up blank, 404 for an unknown id.
#[instrument(skip(_admin, state, form))]
pub async fn update(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<NewsId>,
    FormOrJson(form): FormOrJson<NewsForm>,
) -> Result<Json<NewsArticle>> {
    let news = newsroom(&state);
    let current = news.get(id).await?;
    let draft = form.into_draft(Some(&current))?;
    Ok(Json(news.update(id, draft).await?))
}

/// Delete an article with its cover and images.
///
/// DELETE /admin/news/{id}
///
/// # Errors
///
/// Returns 500 if a query fails.
pub async fn remove(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<NewsId>,
) -> Result<Json<Value>> {
    newsroom(&state).delete(id).await?;
    Ok(success())
}

/// POST /admin/news/{id}/cover
///
/// # Errors
///
/// Returns 400 for a missing or non-image file, 404 for an unknown id.
#[instrument(skip(_admin, state, body))]
pub async fn set_cover(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<NewsId>,
    body: Multipart,
) -> Result<Json<NewsArticle>> {
    let file = UploadForm::read(body).await?.take_one("cover", "Cover image")?;
    Ok(Json(newsroom(&state).set_cover(id, file).await?))
}

/// GET /admin/news/{id}/images
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn list_images(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<NewsId>,
) -> Result<Json<Vec<MediaItem>>> {
    Ok(Json(newsroom(&state).list_images(id).await?))
}

/// POST /admin/news/{id}/images
///
/// # Errors
///
/// Returns 400 for more than 20 files, 404 for an unknown article.
#[instrument(skip(_admin, state, body))]
pub async fn add_images(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<NewsId>,
    body: Multipart,
) -> Result<Json<Vec<MediaItem>>> {
    let files = UploadForm::read(body).await?.take_all("images");
    Ok(Json(newsroom(&state).add_images(id, files).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CaptionForm {
    pub caption: String,
}

/// PUT /admin/news/images/{image_id}/caption
///
/// # Errors
///
/// Returns 404 for an unknown image.
pub async fn update_caption(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(image_id): Path<MediaItemId>,
    FormOrJson(form): FormOrJson<CaptionForm>,
) -> Result<Json<MediaItem>> {
    let image = newsroom(&state)
        .update_caption(image_id, &form.caption)
        .await?;
    Ok(Json(image))
}

/// DELETE /admin/news/images/{image_id}
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn delete_image(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(image_id): Path<MediaItemId>,
) -> Result<Json<Value>> {
    newsroom(&state).delete_image(image_id).await?;
    Ok(success())
}
