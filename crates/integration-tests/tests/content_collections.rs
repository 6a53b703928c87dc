//! Content workflows over in-memory stores with real files on disk.
//!
//! Run with: cargo test -p lakeside-integration-tests

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};

use lakeside_core::{NewsId, ServiceCategoryId};
use lakeside_integration_tests::{mp4, png, stored, temp_uploads};
use lakeside_site::collections::memory::MemoryStore;
use lakeside_site::collections::{CollectionError, OrderedCollection, catalogue};
use lakeside_site::models::media::{MediaDraft, MediaItem};
use lakeside_site::models::news::{NewsArticle, NewsDraft};
use lakeside_site::models::service::{CategoryDraft, ProductDraft, ServiceCategory, ServiceProduct};
use lakeside_site::services::catalog::Catalog;
use lakeside_site::services::gallery::{GreenhouseVideo, HeroImages};
use lakeside_site::services::news::Newsroom;

type TestCatalog<'a> = Catalog<
    'a,
    MemoryStore<ServiceCategory>,
    MemoryStore<ServiceProduct>,
    MemoryStore<MediaItem>,
>;

fn category(name: &str) -> CategoryDraft {
    CategoryDraft {
        name: name.to_owned(),
        description: String::new(),
    }
}

// ============================================================================
// Hero images
// ============================================================================

#[tokio::test]
async fn test_hero_images_expire_and_files_are_removed() {
    let uploads = temp_uploads();
    let hero = HeroImages::new(MemoryStore::<MediaItem>::new(), &uploads);
    let uploaded_at = Utc::now();

    let saved = hero
        .add(vec![png("barn.png"), png("field.png")], uploaded_at)
        .await
        .unwrap();
    assert_eq!(saved.len(), 2);
    assert!(saved.iter().all(|img| stored(&uploads, &img.url)));
    assert!(
        saved
            .iter()
            .all(|img| img.expires_at == Some(uploaded_at + Duration::days(30)))
    );

    // Still live the day before expiry
    let listed = hero.list(uploaded_at + Duration::days(29)).await.unwrap();
    assert_eq!(listed.len(), 2);

    let listed = hero.list(uploaded_at + Duration::days(31)).await.unwrap();
    assert!(listed.is_empty());
    assert!(saved.iter().all(|img| !stored(&uploads, &img.url)));
}

#[tokio::test]
async fn test_hero_sweep_runs_before_capacity_check() {
    let uploads = temp_uploads();
    let hero = HeroImages::new(MemoryStore::<MediaItem>::new(), &uploads);
    let long_ago = Utc::now() - Duration::days(45);

    let files: Vec<_> = (0..50).map(|i| png(&format!("old-{i}.png"))).collect();
    hero.add(files, long_ago).await.unwrap();

    // Collection is full of expired rows; the sweep makes room
    let fresh = hero.add(vec![png("new.png")], Utc::now()).await.unwrap();
    assert_eq!(fresh.len(), 1);
    assert_eq!(hero.list(Utc::now()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_hero_limit_rejects_whole_batch() {
    let uploads = temp_uploads();
    let hero = HeroImages::new(MemoryStore::<MediaItem>::new(), &uploads);
    let now = Utc::now();

    let files: Vec<_> = (0..49).map(|i| png(&format!("hero-{i}.png"))).collect();
    hero.add(files, now).await.unwrap();

    let result = hero.add(vec![png("a.png"), png("b.png")], now).await;
    assert!(matches!(
        result,
        Err(CollectionError::LimitExceeded { limit: 50, .. })
    ));
    assert_eq!(hero.list(now).await.unwrap().len(), 49);
}

// ============================================================================
// Ordering
// ============================================================================

#[tokio::test]
async fn test_numbering_continues_after_max_and_gaps_stay() {
    let uploads = temp_uploads();
    let images = OrderedCollection::new(
        MemoryStore::<MediaItem>::new(),
        &catalogue::FEATURE_IMAGES,
        &uploads,
    );

    let first = images
        .add_uploads(None, vec![png("a.png"), png("b.png"), png("c.png")], MediaDraft::from_upload)
        .await
        .unwrap();
    let orders: Vec<_> = first.iter().map(|i| i.sort_order).collect();
    assert_eq!(orders, [1, 2, 3]);

    images.delete(first[1].id).await.unwrap();
    images.update_order(first[0].id, 7).await.unwrap();

    let more = images
        .add_uploads(None, vec![png("d.png")], MediaDraft::from_upload)
        .await
        .unwrap();
    assert_eq!(more[0].sort_order, 8);

    let listed: Vec<_> = images
        .list(None)
        .await
        .unwrap()
        .iter()
        .map(|i| i.sort_order)
        .collect();
    assert_eq!(listed, [3, 7, 8]);
}

#[tokio::test]
async fn test_intro_images_start_at_zero() {
    let uploads = temp_uploads();
    let images = OrderedCollection::new(
        MemoryStore::<MediaItem>::new(),
        &catalogue::ABOUT_INTRO_IMAGES,
        &uploads,
    );
    let saved = images
        .add_uploads(None, vec![png("a.png"), png("b.png")], MediaDraft::from_upload)
        .await
        .unwrap();
    let orders: Vec<_> = saved.iter().map(|i| i.sort_order).collect();
    assert_eq!(orders, [0, 1]);
}

#[tokio::test]
async fn test_scopes_number_independently() {
    let uploads = temp_uploads();
    let images = OrderedCollection::new(
        MemoryStore::<MediaItem>::new(),
        &catalogue::OFFER_IMAGES,
        &uploads,
    );

    images
        .add_uploads(Some(1), vec![png("a.png"), png("b.png")], MediaDraft::from_upload)
        .await
        .unwrap();
    let other = images
        .add_uploads(Some(2), vec![png("c.png")], MediaDraft::from_upload)
        .await
        .unwrap();

    assert_eq!(other[0].sort_order, 1);
    assert_eq!(images.list(Some(1)).await.unwrap().len(), 2);
    assert_eq!(images.list(Some(2)).await.unwrap().len(), 1);
    assert!(images.list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_insert_removes_written_files() {
    let uploads = temp_uploads();
    let store = MemoryStore::<MediaItem>::new();
    store.fail_next_insert();
    let images = OrderedCollection::new(store, &catalogue::ABOUT_IMAGES, &uploads);

    let result = images
        .add_uploads(None, vec![png("a.png")], MediaDraft::from_upload)
        .await;
    assert!(result.is_err());

    let dir = uploads.uploads_dir().join("about");
    let leftover = std::fs::read_dir(&dir).map_or(0, Iterator::count);
    assert_eq!(leftover, 0);
}

// ============================================================================
// Greenhouse video
// ============================================================================

#[tokio::test]
async fn test_greenhouse_video_replace_keeps_one() {
    let uploads = temp_uploads();
    let video = GreenhouseVideo::new(MemoryStore::<MediaItem>::new(), &uploads);

    assert!(video.current().await.unwrap().is_none());
    let first = video.replace(mp4("tour.mp4")).await.unwrap();
    let second = video.replace(mp4("tour-2.mp4")).await.unwrap();

    assert_eq!(video.current().await.unwrap().unwrap().id, second.id);
    assert!(!stored(&uploads, &first.url));
    assert!(stored(&uploads, &second.url));

    // An image is rejected and the current video survives
    assert!(video.replace(png("still.png")).await.is_err());
    assert_eq!(video.current().await.unwrap().unwrap().id, second.id);
}

// ============================================================================
// Service categories
// ============================================================================

#[tokio::test]
async fn test_category_primary_image_follows_gallery() {
    let uploads = temp_uploads();
    let catalog: TestCatalog<'_> =
        Catalog::new(MemoryStore::new(), MemoryStore::new(), MemoryStore::new(), &uploads);

    let veg = catalog.create_category(category("Vegetables")).await.unwrap();
    assert!(veg.image_url.is_empty());

    let images = catalog
        .add_images(veg.id, vec![png("a.png"), png("b.png")])
        .await
        .unwrap();
    let listing = catalog.list().await.unwrap();
    assert_eq!(listing[0].category.image_url, images[0].url);

    // Deleting a non-primary image leaves the pointer alone
    catalog.delete_image(images[1].id).await.unwrap();
    let listing = catalog.list().await.unwrap();
    assert_eq!(listing[0].category.image_url, images[0].url);

    // Deleting the primary with nothing left clears it
    catalog.delete_image(images[0].id).await.unwrap();
    let listing = catalog.list().await.unwrap();
    assert!(listing[0].category.image_url.is_empty());
    assert!(listing[0].images.is_empty());
}

#[tokio::test]
async fn test_category_set_image_repoints_and_delete_cascades() {
    let uploads = temp_uploads();
    let catalog: TestCatalog<'_> =
        Catalog::new(MemoryStore::new(), MemoryStore::new(), MemoryStore::new(), &uploads);

    let fruit = catalog.create_category(category("Fruit")).await.unwrap();
    catalog.add_images(fruit.id, vec![png("a.png")]).await.unwrap();
    let updated = catalog.set_image(fruit.id, png("b.png")).await.unwrap();
    let images = catalog.list_images(fruit.id).await.unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(updated.image_url, images[1].url);

    catalog
        .create_product(
            fruit.id,
            ProductDraft {
                name: "Strawberries".to_owned(),
                description: String::new(),
            },
        )
        .await
        .unwrap();

    catalog.delete_category(fruit.id).await.unwrap();
    assert!(catalog.list().await.unwrap().is_empty());
    assert!(images.iter().all(|img| !stored(&uploads, &img.url)));

    // Already gone
    catalog.delete_category(fruit.id).await.unwrap();
}

#[tokio::test]
async fn test_category_images_need_existing_category() {
    let uploads = temp_uploads();
    let catalog: TestCatalog<'_> =
        Catalog::new(MemoryStore::new(), MemoryStore::new(), MemoryStore::new(), &uploads);

    let result = catalog
        .add_images(ServiceCategoryId::new(99), vec![png("a.png")])
        .await;
    assert!(matches!(result, Err(CollectionError::NotFound { .. })));
}

// ============================================================================
// News
// ============================================================================

fn article(title: &str, published: bool) -> NewsDraft {
    NewsDraft {
        title: title.to_owned(),
        content: "From the fields this week.".to_owned(),
        excerpt: String::new(),
        author: "Farm desk".to_owned(),
        featured: false,
        published,
        publish_date: None,
    }
}

#[tokio::test]
async fn test_news_detail_hides_drafts_and_lists_related() {
    let uploads = temp_uploads();
    let newsroom = Newsroom::new(
        MemoryStore::<NewsArticle>::new(),
        MemoryStore::<MediaItem>::new(),
        &uploads,
    );

    let draft = newsroom.create(article("Draft", false)).await.unwrap();
    let harvest = newsroom.create(article("Harvest", true)).await.unwrap();
    newsroom.create(article("Market day", true)).await.unwrap();

    assert!(matches!(
        newsroom.published_detail(draft.id).await,
        Err(CollectionError::NotFound { .. })
    ));

    let detail = newsroom.published_detail(harvest.id).await.unwrap();
    assert_eq!(detail.article.title, "Harvest");
    let related: Vec<_> = detail.related.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(related, ["Market day"]);

    assert!(matches!(
        newsroom.published_detail(NewsId::new(404)).await,
        Err(CollectionError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_news_delete_removes_gallery_files() {
    let uploads = temp_uploads();
    let newsroom = Newsroom::new(
        MemoryStore::<NewsArticle>::new(),
        MemoryStore::<MediaItem>::new(),
        &uploads,
    );

    let post = newsroom.create(article("Open day", true)).await.unwrap();
    let images = newsroom
        .add_images(post.id, vec![png("a.png"), png("b.png")])
        .await
        .unwrap();
    let captioned = newsroom
        .update_caption(images[0].id, "  Visitors at the gate ")
        .await
        .unwrap();
    assert_eq!(captioned.caption, "Visitors at the gate");

    newsroom.delete(post.id).await.unwrap();
    assert!(images.iter().all(|img| !stored(&uploads, &img.url)));
    assert!(newsroom.list_images(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_news_batch_cap() {
    let uploads = temp_uploads();
    let newsroom = Newsroom::new(
        MemoryStore::<NewsArticle>::new(),
        MemoryStore::<MediaItem>::new(),
        &uploads,
    );
    let post = newsroom.create(article("Gallery", true)).await.unwrap();

    let files: Vec<_> = (0..21).map(|i| png(&format!("{i}.png"))).collect();
    assert!(matches!(
        newsroom.add_images(post.id, files.clone()).await,
        Err(CollectionError::LimitExceeded { limit: 20, .. })
    ));
    assert!(newsroom.add_images(post.id, files[..20].to_vec()).await.is_ok());
}
