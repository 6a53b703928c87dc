//! News article model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use lakeside_core::NewsId;

use crate::collections::OrderedItem;

/// A news article. Its gallery images are `MediaKind::News` rows scoped by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub id: NewsId,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub author: String,
    pub featured: bool,
    pub published: bool,
    pub publish_date: DateTime<Utc>,
    pub cover_image_url: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of an article. Title and content are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsDraft {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub author: String,
    pub featured: bool,
    pub published: bool,
    /// `None` keeps the current date (or uses now for new articles).
    pub publish_date: Option<DateTime<Utc>>,
}

impl NewsArticle {
    /// Excerpt, or the first 160 characters of the body.
    #[must_use]
    pub fn summary(&self) -> String {
        if !self.excerpt.is_empty() {
            return self.excerpt.clone();
        }
        let mut summary: String = self.content.chars().take(160).collect();
        if self.content.chars().count() > 160 {
            summary.push('…');
        }
        summary
    }
}

impl OrderedItem for NewsArticle {
    type Id = NewsId;
    type Scope = ();

    fn id(&self) -> NewsId {
        self.id
    }

    fn scope(&self) {}

    fn sort_order(&self) -> i32 {
        self.sort_order
    }

    fn owned_files(&self) -> Vec<&str> {
        vec![self.cover_image_url.as_str()]
    }
}

#[cfg(any(test, feature = "test-support"))]
impl crate::collections::memory::MemoryRecord for NewsArticle {
    type Draft = NewsDraft;

    fn materialize(id: i32, (): (), sort_order: i32, draft: NewsDraft) -> Self {
        let now = Utc::now();
        Self {
            id: NewsId::new(id),
            title: draft.title,
            content: draft.content,
            excerpt: draft.excerpt,
            author: draft.author,
            featured: draft.featured,
            published: draft.published,
            publish_date: draft.publish_date.unwrap_or(now),
            cover_image_url: String::new(),
            sort_order,
            created_at: now,
            updated_at: now,
        }
    }

    fn set_sort_order(&mut self, sort_order: i32) {
        self.sort_order = sort_order;
    }

    fn apply(&mut self, draft: NewsDraft) {
        self.title = draft.title;
        self.content = draft.content;
        self.excerpt = draft.excerpt;
        self.author = draft.author;
        self.featured = draft.featured;
        self.published = draft.published;
        if let Some(date) = draft.publish_date {
            self.publish_date = date;
        }
        self.updated_at = Utc::now();
    }

    fn image_slot(&mut self) -> Option<&mut String> {
        Some(&mut self.cover_image_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(content: &str, excerpt: &str) -> NewsArticle {
        let now = Utc::now();
        NewsArticle {
            id: NewsId::new(1),
            title: "Harvest".to_owned(),
            content: content.to_owned(),
            excerpt: excerpt.to_owned(),
            author: String::new(),
            featured: false,
            published: true,
            publish_date: now,
            cover_image_url: String::new(),
            sort_order: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_summary_prefers_excerpt() {
        assert_eq!(article("Long body", "Short").summary(), "Short");
    }

    #[test]
    fn test_summary_truncates_body() {
        let body = "a".repeat(200);
        let summary = article(&body, "").summary();
        assert_eq!(summary.chars().count(), 161);
        assert!(summary.ends_with('…'));
        assert_eq!(article("brief", "").summary(), "brief");
    }
}
