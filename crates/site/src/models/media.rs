//! Uploaded images and videos.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use lakeside_core::MediaItemId;

use crate::collections::{CollectionPolicy, OrderedItem, catalogue};
use crate::uploads::StoredFile;

/// Which collection a media row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKind {
    Hero,
    About,
    AboutIntro,
    AboutAccent,
    Feature,
    /// Scoped by offer card.
    Offer,
    /// Scoped by service category.
    ServiceCategory,
    /// Scoped by news article.
    News,
    GreenhouseVideo,
}

impl MediaKind {
    pub const ALL: [Self; 9] = [
        Self::Hero,
        Self::About,
        Self::AboutIntro,
        Self::AboutAccent,
        Self::Feature,
        Self::Offer,
        Self::ServiceCategory,
        Self::News,
        Self::GreenhouseVideo,
    ];

    /// Value stored in `media_item.collection`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::About => "about",
            Self::AboutIntro => "about-intro",
            Self::AboutAccent => "about-accent",
            Self::Feature => "feature",
            Self::Offer => "offer",
            Self::ServiceCategory => "service-category",
            Self::News => "news",
            Self::GreenhouseVideo => "greenhouse-video",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    #[must_use]
    pub fn policy(self) -> &'static CollectionPolicy {
        match self {
            Self::Hero => &catalogue::HERO_IMAGES,
            Self::About => &catalogue::ABOUT_IMAGES,
            Self::AboutIntro => &catalogue::ABOUT_INTRO_IMAGES,
            Self::AboutAccent => &catalogue::ABOUT_ACCENT_IMAGES,
            Self::Feature => &catalogue::FEATURE_IMAGES,
            Self::Offer => &catalogue::OFFER_IMAGES,
            Self::ServiceCategory => &catalogue::SERVICE_CATEGORY_IMAGES,
            Self::News => &catalogue::NEWS_IMAGES,
            Self::GreenhouseVideo => &catalogue::GREENHOUSE_VIDEO,
        }
    }

    /// Whether rows of this kind belong to a parent row.
    #[must_use]
    pub const fn is_scoped(self) -> bool {
        matches!(self, Self::Offer | Self::ServiceCategory | Self::News)
    }
}

/// A stored upload belonging to one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: MediaItemId,
    pub kind: MediaKind,
    /// Parent id for scoped kinds.
    pub scope_id: Option<i32>,
    pub filename: String,
    pub url: String,
    pub caption: String,
    pub sort_order: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Unsaved media row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDraft {
    pub filename: String,
    pub url: String,
    pub caption: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl MediaDraft {
    /// Draft for a freshly stored file with no caption or expiry.
    #[must_use]
    pub fn from_upload(file: StoredFile) -> Self {
        Self {
            filename: file.filename,
            url: file.url,
            caption: String::new(),
            expires_at: None,
        }
    }

    /// Same as [`from_upload`](Self::from_upload) but expiring after `ttl`.
    #[must_use]
    pub fn expiring(file: StoredFile, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            expires_at: Some(now + ttl),
            ..Self::from_upload(file)
        }
    }
}

impl OrderedItem for MediaItem {
    type Id = MediaItemId;
    type Scope = Option<i32>;

    fn id(&self) -> MediaItemId {
        self.id
    }

    fn scope(&self) -> Option<i32> {
        self.scope_id
    }

    fn sort_order(&self) -> i32 {
        self.sort_order
    }

    fn owned_files(&self) -> Vec<&str> {
        vec![self.url.as_str()]
    }
}

#[cfg(any(test, feature = "test-support"))]
impl crate::collections::memory::MemoryRecord for MediaItem {
    type Draft = MediaDraft;

    fn materialize(id: i32, scope: Option<i32>, sort_order: i32, draft: MediaDraft) -> Self {
        Self {
            id: MediaItemId::new(id),
            // Memory stores are per-collection; the kind is not tracked
            kind: MediaKind::Feature,
            scope_id: scope,
            filename: draft.filename,
            url: draft.url,
            caption: draft.caption,
            sort_order,
            expires_at: draft.expires_at,
            created_at: Utc::now(),
        }
    }

    fn set_sort_order(&mut self, sort_order: i32) {
        self.sort_order = sort_order;
    }

    fn apply(&mut self, draft: MediaDraft) {
        self.filename = draft.filename;
        self.url = draft.url;
        self.caption = draft.caption;
        self.expires_at = draft.expires_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_column_value() {
        for kind in MediaKind::ALL {
            assert_eq!(MediaKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(MediaKind::parse("banner"), None);
    }

    #[test]
    fn test_scoped_kinds() {
        assert!(MediaKind::Offer.is_scoped());
        assert!(MediaKind::News.is_scoped());
        assert!(!MediaKind::Hero.is_scoped());
    }

    #[test]
    fn test_expiring_draft() {
        let now = Utc::now();
        let draft = MediaDraft::expiring(
            StoredFile {
                filename: "a.jpg".to_owned(),
                url: "/uploads/hero/a.jpg".to_owned(),
            },
            now,
            Duration::days(30),
        );
        assert_eq!(draft.expires_at, Some(now + Duration::days(30)));
    }
}
