//! Home and about page text.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::db::ContentRepository;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::content::{SiteContent, SiteContentPatch};
use crate::routes::forms::FormOrJson;
use crate::state::AppState;

/// GET /admin/content
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn show(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<SiteContent>> {
    Ok(Json(ContentRepository::new(state.pool()).get().await?))
}

/// Merge the submitted fields into the current content and save it.
///
/// PUT /admin/content
///
/// # Errors
///
/// Returns 400 for a malformed body, 500 if the query fails.
#[instrument(skip_all)]
pub async fn update(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    FormOrJson(patch): FormOrJson<SiteContentPatch>,
) -> Result<Json<SiteContent>> {
    let repo = ContentRepository::new(state.pool());
    let current = repo.get().await?;
    let home = current.home.merged(patch.home);
    let about = current.about.merged(patch.about);
    let saved = repo.save(&home, &about).await?;
    tracing::info!("Site content updated");
    Ok(Json(saved))
}
