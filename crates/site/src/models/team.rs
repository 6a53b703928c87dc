//! Team member model.

use serde::Serialize;

use lakeside_core::TeamMemberId;

use crate::collections::OrderedItem;

/// A person shown on the about page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: TeamMemberId,
    pub name: String,
    pub role: String,
    pub description: String,
    pub image_url: String,
    pub sort_order: i32,
}

/// Editable fields of a team member. Name and role are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamDraft {
    pub name: String,
    pub role: String,
    pub description: String,
}

impl OrderedItem for TeamMember {
    type Id = TeamMemberId;
    type Scope = ();

    fn id(&self) -> TeamMemberId {
        self.id
    }

    fn scope(&self) {}

    fn sort_order(&self) -> i32 {
        self.sort_order
    }

    fn owned_files(&self) -> Vec<&str> {
        vec![self.image_url.as_str()]
    }
}

#[cfg(any(test, feature = "test-support"))]
impl crate::collections::memory::MemoryRecord for TeamMember {
    type Draft = TeamDraft;

    fn materialize(id: i32, (): (), sort_order: i32, draft: TeamDraft) -> Self {
        Self {
            id: TeamMemberId::new(id),
            name: draft.name,
            role: draft.role,
            description: draft.description,
            image_url: String::new(),
            sort_order,
        }
    }

    fn set_sort_order(&mut self, sort_order: i32) {
        self.sort_order = sort_order;
    }

    fn apply(&mut self, draft: TeamDraft) {
        self.name = draft.name;
        self.role = draft.role;
        self.description = draft.description;
    }

    fn image_slot(&mut self) -> Option<&mut String> {
        Some(&mut self.image_url)
    }
}
