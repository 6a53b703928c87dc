//! Service categories and their products.

use serde::Serialize;

use lakeside_core::{ServiceCategoryId, ServiceProductId};

use crate::collections::OrderedItem;

/// A line of business shown on the services page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCategory {
    pub id: ServiceCategoryId,
    pub name: String,
    pub description: String,
    /// Primary image pointer; mirrors one of the category's images or is empty.
    pub image_url: String,
    pub sort_order: i32,
}

/// Editable fields of a category. Name is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
}

/// A product offered under a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProduct {
    pub id: ServiceProductId,
    pub category_id: ServiceCategoryId,
    pub name: String,
    pub description: String,
    pub sort_order: i32,
}

/// Editable fields of a product. Name is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
}

/// Categories (with their first product) created on an empty catalogue.
pub const DEFAULT_CATALOGUE: [(&str, &str, &str, &str); 4] = [
    (
        "Crop Production",
        "Seasonal and staple crop cultivation with quality grading and steady supply.",
        "Maize, cassava, and vegetables",
        "Quality produce for households and local markets.",
    ),
    (
        "Livestock & Poultry",
        "Healthy livestock and poultry rearing supported by consistent farm care.",
        "Broilers, layers, and small ruminants",
        "Well-managed livestock and poultry production.",
    ),
    (
        "Animal Feed",
        "Balanced feed production to support livestock growth and farm productivity.",
        "Feed formulation & supply",
        "Balanced feed mixes for healthy growth.",
    ),
    (
        "Agri-Trade & Distribution",
        "Supply support across Greater Accra through trade, logistics, and distribution.",
        "Bulk supply & distribution",
        "Reliable delivery across Accra and beyond.",
    ),
];

impl OrderedItem for ServiceCategory {
    type Id = ServiceCategoryId;
    type Scope = ();

    fn id(&self) -> ServiceCategoryId {
        self.id
    }

    fn scope(&self) {}

    fn sort_order(&self) -> i32 {
        self.sort_order
    }
}

impl OrderedItem for ServiceProduct {
    type Id = ServiceProductId;
    type Scope = ServiceCategoryId;

    fn id(&self) -> ServiceProductId {
        self.id
    }

    fn scope(&self) -> ServiceCategoryId {
        self.category_id
    }

    fn sort_order(&self) -> i32 {
        self.sort_order
    }
}

#[cfg(any(test, feature = "test-support"))]
impl crate::collections::memory::MemoryRecord for ServiceCategory {
    type Draft = CategoryDraft;

    fn materialize(id: i32, (): (), sort_order: i32, draft: CategoryDraft) -> Self {
        Self {
            id: ServiceCategoryId::new(id),
            name: draft.name,
            description: draft.description,
            image_url: String::new(),
            sort_order,
        }
    }

    fn set_sort_order(&mut self, sort_order: i32) {
        self.sort_order = sort_order;
    }

    fn apply(&mut self, draft: CategoryDraft) {
        self.name = draft.name;
        self.description = draft.description;
    }

    fn image_slot(&mut self) -> Option<&mut String> {
        Some(&mut self.image_url)
    }
}

#[cfg(any(test, feature = "test-support"))]
impl crate::collections::memory::MemoryRecord for ServiceProduct {
    type Draft = ProductDraft;

    fn materialize(
        id: i32,
        category_id: ServiceCategoryId,
        sort_order: i32,
        draft: ProductDraft,
    ) -> Self {
        Self {
            id: ServiceProductId::new(id),
            category_id,
            name: draft.name,
            description: draft.description,
            sort_order,
        }
    }

    fn set_sort_order(&mut self, sort_order: i32) {
        self.sort_order = sort_order;
    }

    fn apply(&mut self, draft: ProductDraft) {
        self.name = draft.name;
        self.description = draft.description;
    }
}
