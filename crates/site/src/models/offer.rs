//! Offer card model.

use serde::Serialize;

use lakeside_core::OfferCardId;

use crate::collections::OrderedItem;

/// Titles of the cards created on first start.
pub const DEFAULT_OFFER_TITLES: [&str; 4] = [
    "Agriculture Products",
    "Organic Products",
    "Fresh Vegetables",
    "Dairy Products",
];

/// One of the "what we offer" cards on the home page.
///
/// Each card owns a scope of offer images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferCard {
    pub id: OfferCardId,
    pub title: String,
    pub sort_order: i32,
}

/// Editable fields of an offer card. Title is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferDraft {
    pub title: String,
}

impl OrderedItem for OfferCard {
    type Id = OfferCardId;
    type Scope = ();

    fn id(&self) -> OfferCardId {
        self.id
    }

    fn scope(&self) {}

    fn sort_order(&self) -> i32 {
        self.sort_order
    }
}

#[cfg(any(test, feature = "test-support"))]
impl crate::collections::memory::MemoryRecord for OfferCard {
    type Draft = OfferDraft;

    fn materialize(id: i32, (): (), sort_order: i32, draft: OfferDraft) -> Self {
        Self {
            id: OfferCardId::new(id),
            title: draft.title,
            sort_order,
        }
    }

    fn set_sort_order(&mut self, sort_order: i32) {
        self.sort_order = sort_order;
    }

    fn apply(&mut self, draft: OfferDraft) {
        self.title = draft.title;
    }
}
