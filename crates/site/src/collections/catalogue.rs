//! Per-collection limits, numbering baselines and upload rules.

use crate::uploads::UploadRule;

/// Rules for one ordered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionPolicy {
    /// Human name used in messages and logs.
    pub name: &'static str,
    /// Maximum rows per scope.
    pub limit: Option<usize>,
    /// Maximum rows per add request.
    pub max_batch: Option<usize>,
    /// Sort order assumed for an empty scope; the first row gets `baseline + 1`.
    pub baseline: i32,
    /// When set, new rows all take this sort order instead of being appended.
    pub fixed_order: Option<i32>,
    pub upload: Option<UploadRule>,
}

impl CollectionPolicy {
    const fn new(name: &'static str) -> Self {
        Self {
            name,
            limit: None,
            max_batch: None,
            baseline: 0,
            fixed_order: None,
            upload: None,
        }
    }

    const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    const fn max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = Some(max_batch);
        self
    }

    const fn baseline(mut self, baseline: i32) -> Self {
        self.baseline = baseline;
        self
    }

    const fn fixed_order(mut self, sort_order: i32) -> Self {
        self.fixed_order = Some(sort_order);
        self
    }

    const fn upload(mut self, rule: UploadRule) -> Self {
        self.upload = Some(rule);
        self
    }
}

/// Days a hero image stays on the home page.
pub const HERO_IMAGE_TTL_DAYS: i64 = 30;

pub static HERO_IMAGES: CollectionPolicy = CollectionPolicy::new("Hero images")
    .limit(50)
    .upload(UploadRule::image("hero", 8));

pub static ABOUT_IMAGES: CollectionPolicy = CollectionPolicy::new("About images")
    .limit(10)
    .upload(UploadRule::image("about", 6));

pub static ABOUT_INTRO_IMAGES: CollectionPolicy = CollectionPolicy::new("About intro images")
    .limit(10)
    .baseline(-1)
    .upload(UploadRule::image("about-intro", 6));

pub static ABOUT_ACCENT_IMAGES: CollectionPolicy = CollectionPolicy::new("About accent images")
    .baseline(-1)
    .upload(UploadRule::image("about-accent", 5));

pub static FEATURE_IMAGES: CollectionPolicy = CollectionPolicy::new("Feature images")
    .limit(10)
    .upload(UploadRule::image("feature", 6));

pub static OFFER_CARDS: CollectionPolicy = CollectionPolicy::new("Offer cards").limit(4);

pub static OFFER_IMAGES: CollectionPolicy = CollectionPolicy::new("Offer images")
    .limit(10)
    .upload(UploadRule::image("offers", 8));

pub static SERVICE_CATEGORY_IMAGES: CollectionPolicy =
    CollectionPolicy::new("Service category images")
        .limit(12)
        .upload(UploadRule::image("services", 6));

pub static NEWS_IMAGES: CollectionPolicy = CollectionPolicy::new("News images")
    .max_batch(20)
    .upload(UploadRule::image("news", 8));

pub static GREENHOUSE_VIDEO: CollectionPolicy = CollectionPolicy::new("Greenhouse video")
    .limit(1)
    .max_batch(1)
    .upload(UploadRule::video("greenhouse", 100));

pub static TEAM_MEMBERS: CollectionPolicy =
    CollectionPolicy::new("Team members").upload(UploadRule::image("team", 4));

pub static TESTIMONIALS: CollectionPolicy = CollectionPolicy::new("Testimonials")
    .limit(10)
    .upload(UploadRule::image("testimonials", 4));

pub static SERVICE_CATEGORIES: CollectionPolicy = CollectionPolicy::new("Service categories");

pub static SERVICE_PRODUCTS: CollectionPolicy = CollectionPolicy::new("Service products");

/// Articles all sit at order 0, so listings fall through to publish date.
pub static NEWS_ARTICLES: CollectionPolicy = CollectionPolicy::new("News articles")
    .fixed_order(0)
    .upload(UploadRule::image("news", 8));

pub static BRANCHES: CollectionPolicy = CollectionPolicy::new("Branches");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uploads::MediaClass;

    #[test]
    fn test_limits() {
        assert_eq!(HERO_IMAGES.limit, Some(50));
        assert_eq!(OFFER_CARDS.limit, Some(4));
        assert_eq!(SERVICE_CATEGORY_IMAGES.limit, Some(12));
        assert_eq!(TESTIMONIALS.limit, Some(10));
        assert_eq!(TEAM_MEMBERS.limit, None);
        assert_eq!(NEWS_IMAGES.max_batch, Some(20));
    }

    #[test]
    fn test_only_news_articles_use_a_fixed_order() {
        assert_eq!(NEWS_ARTICLES.fixed_order, Some(0));
        assert_eq!(NEWS_IMAGES.fixed_order, None);
        assert_eq!(BRANCHES.fixed_order, None);
    }

    #[test]
    fn test_greenhouse_takes_large_videos() {
        let rule = GREENHOUSE_VIDEO.upload.unwrap_or(UploadRule::image("x", 0));
        assert_eq!(rule.class, MediaClass::Video);
        assert_eq!(rule.max_bytes, 100 * 1024 * 1024);
    }
}
