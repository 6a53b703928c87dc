//! Branch locations.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use lakeside_core::{BranchId, Coordinates};

use super::success;
use crate::collections::{CollectionError, OrderedCollection, catalogue};
use crate::db::BranchRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::models::branch::{Branch, BranchDraft};
use crate::routes::forms::{Flag, FormOrJson};
use crate::services::required;
use crate::state::AppState;

fn branches(state: &AppState) -> OrderedCollection<'_, BranchRepository<'_>> {
    OrderedCollection::new(
        BranchRepository::new(state.pool()),
        &catalogue::BRANCHES,
        state.uploads(),
    )
}

/// Branch fields. All optional so the same form serves partial updates;
/// creation requires name, address and both coordinates.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BranchForm {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<Flag>,
}

fn coordinates(latitude: Decimal, longitude: Decimal) -> Result<Coordinates> {
    Coordinates::new(latitude, longitude).map_err(|e| AppError::BadRequest(e.to_string()))
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned())
}

impl BranchForm {
    fn into_new_draft(self) -> Result<BranchDraft> {
        let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) else {
            return Err(AppError::BadRequest(
                "Latitude and longitude are required".to_owned(),
            ));
        };
        Ok(BranchDraft {
            name: required(self.name.as_deref().unwrap_or_default(), "Name")?,
            address: required(self.address.as_deref().unwrap_or_default(), "Address")?,
            coordinates: coordinates(latitude, longitude)?,
            is_active: self.is_active.as_ref().is_none_or(Flag::is_set),
            phone: trimmed(self.phone).unwrap_or_default(),
            description: trimmed(self.description).unwrap_or_default(),
        })
    }

    fn merged_into(self, current: Branch) -> Result<BranchDraft> {
        let coordinates = coordinates(
            self.latitude.unwrap_or_else(|| current.coordinates.latitude()),
            self.longitude.unwrap_or_else(|| current.coordinates.longitude()),
        )?;
        let name = match self.name {
            Some(name) => required(&name, "Name")?,
            None => current.name,
        };
        let address = match self.address {
            Some(address) => required(&address, "Address")?,
            None => current.address,
        };
        Ok(BranchDraft {
            name,
            address,
            coordinates,
            is_active: self.is_active.as_ref().map_or(current.is_active, Flag::is_set),
            phone: trimmed(self.phone).unwrap_or(current.phone),
            description: trimmed(self.description).unwrap_or(current.description),
        })
    }
}

/// Every branch, active or not, by display order.
///
/// GET /admin/branches
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn list(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Branch>>> {
    Ok(Json(branches(&state).list(()).await?))
}

/// New branches go last unless a display order is given.
///
/// POST /admin/branches
///
/// # Errors
///
/// Returns 400 for missing fields or out-of-range coordinates.
#[instrument(skip_all)]
pub async fn create(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    FormOrJson(form): FormOrJson<BranchForm>,
) -> Result<Json<Branch>> {
    let display_order = form.display_order;
    let draft = form.into_new_draft()?;
    let collection = branches(&state);
    let branch = collection
        .add((), vec![draft])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| CollectionError::Validation("nothing was saved".to_owned()))?;
    let branch = match display_order {
        Some(order) => collection.update_order(branch.id, order).await?,
        None => branch,
    };
    tracing::info!(branch_id = %branch.id, name = %branch.name, "Branch created");
    Ok(Json(branch))
}

/// Update the submitted fields only.
///
/// PUT /admin/branches/{id}
///
/// # Errors
///
/// Returns 400 for blank names or out-of-range coordinates, 404 for an
/// unknown id.
#[instrument(skip(_admin, state, form))]
pub async fn update(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<BranchId>,
    FormOrJson(form): FormOrJson<BranchForm>,
) -> Result<Json<Branch>> {
    let collection = branches(&state);
    let current = collection.get(id).await?;
    let display_order = form.display_order;
    let draft = form.merged_into(current)?;
    let branch = collection.update(id, draft).await?;
    let branch = match display_order {
        Some(order) if order != branch.display_order => {
            collection.update_order(id, order).await?
        }
        _ => branch,
    };
    Ok(Json(branch))
}

/// DELETE /admin/branches/{id}
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn remove(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<BranchId>,
) -> Result<Json<Value>> {
    branches(&state).delete(id).await?;
    Ok(success())
}
