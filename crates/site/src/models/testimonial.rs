//! Testimonial model.

use serde::Serialize;

use lakeside_core::{Rating, TestimonialId};

use crate::collections::OrderedItem;

/// A customer quote shown on the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: TestimonialId,
    pub name: String,
    pub role: String,
    pub quote: String,
    pub rating: Rating,
    pub avatar_url: String,
    pub sort_order: i32,
}

/// Editable fields of a testimonial. Name and quote are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestimonialDraft {
    pub name: String,
    pub role: String,
    pub quote: String,
    pub rating: Rating,
}

impl OrderedItem for Testimonial {
    type Id = TestimonialId;
    type Scope = ();

    fn id(&self) -> TestimonialId {
        self.id
    }

    fn scope(&self) {}

    fn sort_order(&self) -> i32 {
        self.sort_order
    }

    fn owned_files(&self) -> Vec<&str> {
        vec![self.avatar_url.as_str()]
    }
}

#[cfg(any(test, feature = "test-support"))]
impl crate::collections::memory::MemoryRecord for Testimonial {
    type Draft = TestimonialDraft;

    fn materialize(id: i32, (): (), sort_order: i32, draft: TestimonialDraft) -> Self {
        Self {
            id: TestimonialId::new(id),
            name: draft.name,
            role: draft.role,
            quote: draft.quote,
            rating: draft.rating,
            avatar_url: String::new(),
            sort_order,
        }
    }

    fn set_sort_order(&mut self, sort_order: i32) {
        self.sort_order = sort_order;
    }

    fn apply(&mut self, draft: TestimonialDraft) {
        self.name = draft.name;
        self.role = draft.role;
        self.quote = draft.quote;
        self.rating = draft.rating;
    }

    fn image_slot(&mut self) -> Option<&mut String> {
        Some(&mut self.avatar_url)
    }
}
