//! View models for the public pages.
//!
//! Each loader fetches everything its page shows concurrently and then
//! derives the small presentation fields (testimonial stars and initials,
//! per-parent image groups, footer links). Loaders never write, apart from
//! the hero expiry sweep that every hero listing performs.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use sqlx::PgPool;

use lakeside_core::{NewsId, initials};

use super::catalog::{Catalog, CategoryListing};
use super::gallery::{GreenhouseVideo, HeroImages};
use super::news::{NewsDetail, Newsroom};
use crate::collections::{CollectionError, OrderedCollection, catalogue};
use crate::config::SocialLinks;
use crate::db::{
    BranchRepository, CategoryRepository, ContentRepository, MediaRepository, NewsRepository,
    OfferRepository, ProductRepository, TeamRepository, TestimonialRepository,
};
use crate::models::branch::Branch;
use crate::models::content::SiteContent;
use crate::models::media::{MediaItem, MediaKind};
use crate::models::news::NewsArticle;
use crate::models::offer::OfferCard;
use crate::models::team::TeamMember;
use crate::models::testimonial::Testimonial;
use crate::uploads::UploadStore;

/// CSS class for a filled star slot.
pub const STAR_FILLED: &str = "star filled";
/// CSS class for an empty star slot.
pub const STAR_EMPTY: &str = "star";

// =============================================================================
// View Models
// =============================================================================

/// Fields every public page renders in its header and footer.
#[derive(Debug, Clone)]
pub struct SiteChrome {
    pub social: SocialLinks,
    pub year: i32,
}

impl SiteChrome {
    #[must_use]
    pub fn new(social: &SocialLinks, now: DateTime<Utc>) -> Self {
        Self {
            social: social.clone(),
            year: now.year(),
        }
    }
}

/// A testimonial with its star row and avatar fallback.
#[derive(Debug, Clone)]
pub struct TestimonialCard {
    pub testimonial: Testimonial,
    /// One CSS class per star slot.
    pub stars: Vec<&'static str>,
    pub initials: String,
}

impl From<Testimonial> for TestimonialCard {
    fn from(testimonial: Testimonial) -> Self {
        let stars = testimonial
            .rating
            .stars()
            .into_iter()
            .map(|filled| if filled { STAR_FILLED } else { STAR_EMPTY })
            .collect();
        let initials = initials(&testimonial.name);
        Self {
            testimonial,
            stars,
            initials,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OfferWithImages {
    #[serde(flatten)]
    pub card: OfferCard,
    pub images: Vec<MediaItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleWithImages {
    #[serde(flatten)]
    pub article: NewsArticle,
    pub images: Vec<MediaItem>,
}

#[derive(Debug, Clone)]
pub struct HomePage {
    pub chrome: SiteChrome,
    pub content: SiteContent,
    pub hero_images: Vec<MediaItem>,
    pub offers: Vec<OfferWithImages>,
    pub testimonials: Vec<TestimonialCard>,
    pub about_intro_images: Vec<MediaItem>,
    pub greenhouse_video: Option<MediaItem>,
}

#[derive(Debug, Clone)]
pub struct AboutPage {
    pub chrome: SiteChrome,
    pub content: SiteContent,
    pub team: Vec<TeamMember>,
    pub about_images: Vec<MediaItem>,
    pub feature_images: Vec<MediaItem>,
    pub accent_images: Vec<MediaItem>,
}

#[derive(Debug, Clone)]
pub struct ServicesPage {
    pub chrome: SiteChrome,
    pub categories: Vec<CategoryListing>,
}

#[derive(Debug, Clone)]
pub struct ContactPage {
    pub chrome: SiteChrome,
    pub content: SiteContent,
    pub branches: Vec<Branch>,
}

#[derive(Debug, Clone)]
pub struct NewsPage {
    pub chrome: SiteChrome,
    pub articles: Vec<ArticleWithImages>,
}

#[derive(Debug, Clone)]
pub struct NewsDetailPage {
    pub chrome: SiteChrome,
    pub detail: NewsDetail,
}

// =============================================================================
// Assembly
// =============================================================================

/// Split rows of a scoped media kind by parent id, keeping each group's order.
fn group_by_scope(images: Vec<MediaItem>) -> HashMap<i32, Vec<MediaItem>> {
    let mut groups: HashMap<i32, Vec<MediaItem>> = HashMap::new();
    for image in images {
        if let Some(scope) = image.scope_id {
            groups.entry(scope).or_default().push(image);
        }
    }
    groups
}

/// Attach each offer card's images to it.
#[must_use]
pub fn offers_with_images(cards: Vec<OfferCard>, images: Vec<MediaItem>) -> Vec<OfferWithImages> {
    let mut groups = group_by_scope(images);
    cards
        .into_iter()
        .map(|card| OfferWithImages {
            images: groups.remove(&card.id.as_i32()).unwrap_or_default(),
            card,
        })
        .collect()
}

/// Attach each article's images to it.
#[must_use]
pub fn articles_with_images(
    articles: Vec<NewsArticle>,
    images: Vec<MediaItem>,
) -> Vec<ArticleWithImages> {
    let mut groups = group_by_scope(images);
    articles
        .into_iter()
        .map(|article| ArticleWithImages {
            images: groups.remove(&article.id.as_i32()).unwrap_or_default(),
            article,
        })
        .collect()
}

// =============================================================================
// Loaders
// =============================================================================

/// Builds public page view models from the database.
pub struct PublicPages<'a> {
    pool: &'a PgPool,
    uploads: &'a UploadStore,
    chrome: SiteChrome,
}

impl<'a> PublicPages<'a> {
    #[must_use]
    pub fn new(
        pool: &'a PgPool,
        uploads: &'a UploadStore,
        social: &SocialLinks,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            pool,
            uploads,
            chrome: SiteChrome::new(social, now),
        }
    }

    fn media(&self, kind: MediaKind) -> OrderedCollection<'a, MediaRepository<'a>> {
        OrderedCollection::new(MediaRepository::new(self.pool, kind), kind.policy(), self.uploads)
    }

    fn newsroom(&self) -> Newsroom<'a, NewsRepository<'a>, MediaRepository<'a>> {
        Newsroom::new(
            NewsRepository::new(self.pool),
            MediaRepository::new(self.pool, MediaKind::News),
            self.uploads,
        )
    }

    async fn content(&self) -> Result<SiteContent, CollectionError> {
        Ok(ContentRepository::new(self.pool).get().await?)
    }

    /// # Errors
    ///
    /// Returns an error if any query fails.
    pub async fn home(&self, now: DateTime<Utc>) -> Result<HomePage, CollectionError> {
        let hero = HeroImages::new(MediaRepository::new(self.pool, MediaKind::Hero), self.uploads);
        let greenhouse = GreenhouseVideo::new(
            MediaRepository::new(self.pool, MediaKind::GreenhouseVideo),
            self.uploads,
        );
        let offers = OrderedCollection::new(
            OfferRepository::new(self.pool),
            &catalogue::OFFER_CARDS,
            self.uploads,
        );
        let testimonials = OrderedCollection::new(
            TestimonialRepository::new(self.pool),
            &catalogue::TESTIMONIALS,
            self.uploads,
        );
        let offer_images = MediaRepository::new(self.pool, MediaKind::Offer);
        let intro = self.media(MediaKind::AboutIntro);

        let (
            content,
            hero_images,
            cards,
            images,
            testimonials,
            about_intro_images,
            greenhouse_video,
        ) = tokio::try_join!(
            self.content(),
            hero.list(now),
            offers.list(()),
            async { Ok::<_, CollectionError>(offer_images.list_all_scopes().await?) },
            testimonials.list(()),
            intro.list(None),
            greenhouse.current(),
        )?;

        Ok(HomePage {
            chrome: self.chrome.clone(),
            content,
            hero_images,
            offers: offers_with_images(cards, images),
            testimonials: testimonials.into_iter().map(TestimonialCard::from).collect(),
            about_intro_images,
            greenhouse_video,
        })
    }

    /// # Errors
    ///
    /// Returns an error if any query fails.
    pub async fn about(&self) -> Result<AboutPage, CollectionError> {
        let team = OrderedCollection::new(
            TeamRepository::new(self.pool),
            &catalogue::TEAM_MEMBERS,
            self.uploads,
        );
        let about = self.media(MediaKind::About);
        let feature = self.media(MediaKind::Feature);
        let accent = self.media(MediaKind::AboutAccent);

        let (content, team, about_images, feature_images, accent_images) = tokio::try_join!(
            self.content(),
            team.list(()),
            about.list(None),
            feature.list(None),
            accent.list(None),
        )?;

        Ok(AboutPage {
            chrome: self.chrome.clone(),
            content,
            team,
            about_images,
            feature_images,
            accent_images,
        })
    }

    /// # Errors
    ///
    /// Returns an error if any query fails.
    pub async fn services(&self) -> Result<ServicesPage, CollectionError> {
        let catalog = Catalog::new(
            CategoryRepository::new(self.pool),
            ProductRepository::new(self.pool),
            MediaRepository::new(self.pool, MediaKind::ServiceCategory),
            self.uploads,
        );
        Ok(ServicesPage {
            chrome: self.chrome.clone(),
            categories: catalog.list().await?,
        })
    }

    /// # Errors
    ///
    /// Returns an error if any query fails.
    pub async fn contact(&self) -> Result<ContactPage, CollectionError> {
        let branches = BranchRepository::new(self.pool);
        let (content, branches) = tokio::try_join!(self.content(), async {
            Ok::<_, CollectionError>(branches.list_active().await?)
        })?;

        Ok(ContactPage {
            chrome: self.chrome.clone(),
            content,
            branches,
        })
    }

    /// # Errors
    ///
    /// Returns an error if any query fails.
    pub async fn news(&self) -> Result<NewsPage, CollectionError> {
        let newsroom = self.newsroom();
        let images = MediaRepository::new(self.pool, MediaKind::News);
        let (articles, images) = tokio::try_join!(newsroom.list_published(), async {
            Ok::<_, CollectionError>(images.list_all_scopes().await?)
        })?;

        Ok(NewsPage {
            chrome: self.chrome.clone(),
            articles: articles_with_images(articles, images),
        })
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the article is unknown or unpublished.
    pub async fn news_detail(&self, id: NewsId) -> Result<NewsDetailPage, CollectionError> {
        Ok(NewsDetailPage {
            chrome: self.chrome.clone(),
            detail: self.newsroom().published_detail(id).await?,
        })
    }
}
