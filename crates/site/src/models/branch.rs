//! Branch location model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use rust_decimal::Decimal;

use lakeside_core::{BranchId, Coordinates, CoordinatesError};

use crate::collections::OrderedItem;

/// A physical branch listed on the contact page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    pub address: String,
    #[serde(flatten)]
    pub coordinates: Coordinates,
    pub is_active: bool,
    pub display_order: i32,
    pub phone: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a branch. Name and address are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchDraft {
    pub name: String,
    pub address: String,
    pub coordinates: Coordinates,
    pub is_active: bool,
    pub phone: String,
    pub description: String,
}

impl OrderedItem for Branch {
    type Id = BranchId;
    type Scope = ();

    fn id(&self) -> BranchId {
        self.id
    }

    fn scope(&self) {}

    fn sort_order(&self) -> i32 {
        self.display_order
    }
}

/// `(name, address, latitude, longitude, phone, description)` for the
/// branches created on an empty table. Coordinates are in ten-thousandths
/// of a degree.
const DEFAULT_BRANCHES: [(&str, &str, i64, i64, &str, &str); 5] = [
    (
        "Ofankor - Headquarters",
        "P.O.BOX 236 Ofankor-Accra, Greater Accra Region",
        56_809,
        -2_420,
        "+233 543 024 779",
        "Lakeside Farms - Main Office and Headquarters",
    ),
    (
        "Tamale - Kumbugu",
        "Kumbugu, Tamale, Northern Region",
        94_034,
        -8_424,
        "",
        "Lakeside Farms - Tamale Kumbugu Branch",
    ),
    (
        "Nsawam Adoagyire",
        "Adoagyire, Nsawam, Eastern Region",
        58_081,
        -3_522,
        "",
        "Lakeside Farms - Nsawam Adoagyire Branch",
    ),
    (
        "Kwahu Tafo",
        "Tafo, Kwahu, Eastern Region",
        63_167,
        -6_333,
        "",
        "Lakeside Farms - Kwahu Tafo Branch",
    ),
    (
        "Tamale - Kamina",
        "Kamina, Tamale, Northern Region",
        94_100,
        -8_000,
        "",
        "Lakeside Farms - Tamale Kamina Branch",
    ),
];

/// Drafts for the default branches, in display order.
///
/// # Errors
///
/// Returns an error if a default coordinate is out of range.
pub fn default_branches() -> Result<Vec<BranchDraft>, CoordinatesError> {
    DEFAULT_BRANCHES
        .iter()
        .map(|&(name, address, lat, lon, phone, description)| {
            Ok(BranchDraft {
                name: name.to_owned(),
                address: address.to_owned(),
                coordinates: Coordinates::new(Decimal::new(lat, 4), Decimal::new(lon, 4))?,
                is_active: true,
                phone: phone.to_owned(),
                description: description.to_owned(),
            })
        })
        .collect()
}

#[cfg(any(test, feature = "test-support"))]
impl crate::collections::memory::MemoryRecord for Branch {
    type Draft = BranchDraft;

    fn materialize(id: i32, (): (), display_order: i32, draft: BranchDraft) -> Self {
        let now = Utc::now();
        Self {
            id: BranchId::new(id),
            name: draft.name,
            address: draft.address,
            coordinates: draft.coordinates,
            is_active: draft.is_active,
            display_order,
            phone: draft.phone,
            description: draft.description,
            created_at: now,
            updated_at: now,
        }
    }

    fn set_sort_order(&mut self, display_order: i32) {
        self.display_order = display_order;
    }

    fn apply(&mut self, draft: BranchDraft) {
        self.name = draft.name;
        self.address = draft.address;
        self.coordinates = draft.coordinates;
        self.is_active = draft.is_active;
        self.phone = draft.phone;
        self.description = draft.description;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_branches_are_valid() {
        let branches = default_branches().unwrap();
        assert_eq!(branches.len(), 5);
        assert_eq!(branches[0].name, "Ofankor - Headquarters");
        assert_eq!(branches[0].coordinates.latitude().to_string(), "5.6809");
        assert!(branches.iter().all(|b| b.is_active));
    }
}
