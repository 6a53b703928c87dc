//! Team member CRUD and portraits.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use lakeside_core::TeamMemberId;

use super::success;
use crate::collections::{CollectionError, OrderedCollection, catalogue};
use crate::db::TeamRepository;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::team::{TeamDraft, TeamMember};
use crate::routes::forms::{FormOrJson, UploadForm};
use crate::services::required;
use crate::state::AppState;

fn team(state: &AppState) -> OrderedCollection<'_, TeamRepository<'_>> {
    OrderedCollection::new(
        TeamRepository::new(state.pool()),
        &catalogue::TEAM_MEMBERS,
        state.uploads(),
    )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TeamForm {
    pub name: String,
    pub role: String,
    pub description: String,
}

impl TryFrom<TeamForm> for TeamDraft {
    type Error = CollectionError;

    fn try_from(form: TeamForm) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            name: required(&form.name, "Name")?,
            role: required(&form.role, "Role")?,
            description: form.description.trim().to_owned(),
        })
    }
}

/// GET /admin/team
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn list(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<TeamMember>>> {
    Ok(Json(team(&state).list(()).await?))
}

/// POST /admin/team
///
/// # Errors
///
/// Returns 400 if name or role is blank.
#[instrument(skip_all)]
pub async fn create(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    FormOrJson(form): FormOrJson<TeamForm>,
) -> Result<Json<TeamMember>> {
    let draft = TeamDraft::try_from(form)?;
    let member = team(&state)
        .add((), vec![draft])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| CollectionError::Validation("nothing was saved".to_owned()))?;
    Ok(Json(member))
}

/// PUT /admin/team/{id}
///
/// # Errors
///
/// Returns 400 if name or role is blank, 404 for an unknown id.
#[instrument(skip(_admin, state, form))]
pub async fn update(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<TeamMemberId>,
    FormOrJson(form): FormOrJson<TeamForm>,
) -> Result<Json<TeamMember>> {
    let draft = TeamDraft::try_from(form)?;
    Ok(Json(team(&state).update(id, draft).await?))
}

/// DELETE /admin/team/{id}
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn remove(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<TeamMemberId>,
) -> Result<Json<Value>> {
    team(&state).delete(id).await?;
    Ok(success())
}

/// POST /admin/team/{id}/image
///
/// # Errors
///
/// Returns 400 for a missing or non-image file, 404 for an unknown id.
#[instrument(skip(_admin, state, body))]
pub async fn set_image(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<TeamMemberId>,
    body: Multipart,
) -> Result<Json<TeamMember>> {
    let file = UploadForm::read(body).await?.take_one("image", "Image file")?;
    Ok(Json(team(&state).replace_image(id, file).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_role_required() {
        let form = TeamForm {
            name: "Efua".to_owned(),
            ..TeamForm::default()
        };
        assert!(TeamDraft::try_from(form).is_err());

        let form = TeamForm {
            name: " Efua ".to_owned(),
            role: "Farm manager".to_owned(),
            description: String::new(),
        };
        let draft = TeamDraft::try_from(form).ok();
        assert_eq!(draft.map(|d| d.name), Some("Efua".to_owned()));
    }
}
