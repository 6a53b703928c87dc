//! News articles and their images.

use std::cmp::Reverse;
use std::future::Future;

use tracing::instrument;

use lakeside_core::{MediaItemId, NewsId};

use super::required;
use crate::collections::{
    CollectionError, EditableStore, OrderedCollection, OrderedStore, PrimaryImageStore, catalogue,
};
use crate::db::RepositoryError;
use crate::models::media::{MediaDraft, MediaItem};
use crate::models::news::{NewsArticle, NewsDraft};
use crate::uploads::{UploadStore, UploadedFile};

/// Other published articles shown under an article.
pub const RELATED_ARTICLES: usize = 5;

/// A media store whose rows carry an editable caption.
pub trait CaptionStore: OrderedStore<Item = MediaItem> {
    /// Returns `None` when no row matched.
    fn update_caption(
        &self,
        id: MediaItemId,
        caption: &str,
    ) -> impl Future<Output = Result<Option<MediaItem>, RepositoryError>> + Send;
}

/// A published article with its gallery and a few others to read next.
#[derive(Debug, Clone)]
pub struct NewsDetail {
    pub article: NewsArticle,
    pub images: Vec<MediaItem>,
    pub related: Vec<NewsArticle>,
}

const fn image_scope(id: NewsId) -> Option<i32> {
    Some(id.as_i32())
}

/// Article and article-image operations.
pub struct Newsroom<'a, N, I> {
    articles: OrderedCollection<'a, N>,
    images: OrderedCollection<'a, I>,
}

impl<'a, N, I> Newsroom<'a, N, I>
where
    N: EditableStore<Item = NewsArticle, Draft = NewsDraft> + PrimaryImageStore,
    I: CaptionStore<Draft = MediaDraft>,
{
    #[must_use]
    pub const fn new(articles: N, images: I, uploads: &'a UploadStore) -> Self {
        Self {
            articles: OrderedCollection::new(articles, &catalogue::NEWS_ARTICLES, uploads),
            images: OrderedCollection::new(images, &catalogue::NEWS_IMAGES, uploads),
        }
    }

    /// Every article, by sort order then newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn list_all(&self) -> Result<Vec<NewsArticle>, CollectionError> {
        let mut articles = self.articles.list(()).await?;
        articles.sort_by_key(|a| (a.sort_order, Reverse(a.created_at)));
        Ok(articles)
    }

    /// Published articles, by sort order then latest publish date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn list_published(&self) -> Result<Vec<NewsArticle>, CollectionError> {
        let mut articles: Vec<_> = self
            .articles
            .list(())
            .await?
            .into_iter()
            .filter(|a| a.published)
            .collect();
        articles.sort_by_key(|a| (a.sort_order, Reverse(a.publish_date)));
        Ok(articles)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the id is unknown.
    pub async fn get(&self, id: NewsId) -> Result<NewsArticle, CollectionError> {
        self.articles.get(id).await
    }

    /// An article and its images, published or not.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is unknown.
    pub async fn get_with_images(
        &self,
        id: NewsId,
    ) -> Result<(NewsArticle, Vec<MediaItem>), CollectionError> {
        let article = self.articles.get(id).await?;
        let images = self.images.list(image_scope(id)).await?;
        Ok((article, images))
    }

    /// A published article for the public detail page.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the article is unknown or unpublished.
    pub async fn published_detail(&self, id: NewsId) -> Result<NewsDetail, CollectionError> {
        let article = self.articles.get(id).await?;
        if !article.published {
            return Err(CollectionError::not_found(catalogue::NEWS_ARTICLES.name, id));
        }
        let images = self.images.list(image_scope(id)).await?;
        let related = self
            .list_published()
            .await?
            .into_iter()
            .filter(|a| a.id != id)
            .take(RELATED_ARTICLES)
            .collect();
        Ok(NewsDetail {
            article,
            images,
            related,
        })
    }

    /// # Errors
    ///
    /// Returns `Validation` if title or content is blank.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create(&self, draft: NewsDraft) -> Result<NewsArticle, CollectionError> {
        let draft = validate(draft)?;
        self.articles
            .add((), vec![draft])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CollectionError::Validation("nothing was saved".to_owned()))
    }

    /// # Errors
    ///
    /// Returns `Validation` if title or content is blank, `NotFound` if the
    /// id is unknown.
    #[instrument(skip(self, draft))]
    pub async fn update(
        &self,
        id: NewsId,
        draft: NewsDraft,
    ) -> Result<NewsArticle, CollectionError> {
        let draft = validate(draft)?;
        self.articles.update(id, draft).await
    }

    /// Replace the cover image; the old cover file is removed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is unknown, or an upload error.
    pub async fn set_cover(
        &self,
        id: NewsId,
        file: UploadedFile,
    ) -> Result<NewsArticle, CollectionError> {
        self.articles.replace_image(id, file).await
    }

    /// Delete an article's images (and files), then the article and its
    /// cover. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if a store fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: NewsId) -> Result<(), CollectionError> {
        for image in self.images.list(image_scope(id)).await? {
            self.images.delete(image.id).await?;
        }
        self.articles.delete(id).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn list_images(&self, id: NewsId) -> Result<Vec<MediaItem>, CollectionError> {
        self.images.list(image_scope(id)).await
    }

    /// Upload up to 20 images at a time to an article.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the article is unknown, `LimitExceeded` for
    /// batches over 20, or an upload error.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn add_images(
        &self,
        id: NewsId,
        files: Vec<UploadedFile>,
    ) -> Result<Vec<MediaItem>, CollectionError> {
        self.articles.get(id).await?;
        self.images
            .add_uploads(image_scope(id), files, MediaDraft::from_upload)
            .await
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the image is unknown.
    pub async fn update_caption(
        &self,
        image_id: MediaItemId,
        caption: &str,
    ) -> Result<MediaItem, CollectionError> {
        self.images
            .store()
            .update_caption(image_id, caption.trim())
            .await?
            .ok_or_else(|| CollectionError::not_found(catalogue::NEWS_IMAGES.name, image_id))
    }

    /// # Errors
    ///
    /// Returns an error if the store fails. Unknown ids are ignored.
    pub async fn delete_image(&self, image_id: MediaItemId) -> Result<(), CollectionError> {
        self.images.delete(image_id).await?;
        Ok(())
    }
}

fn validate(draft: NewsDraft) -> Result<NewsDraft, CollectionError> {
    Ok(NewsDraft {
        title: required(&draft.title, "Title")?,
        content: required(&draft.content, "Content")?,
        excerpt: draft.excerpt.trim().to_owned(),
        author: draft.author.trim().to_owned(),
        ..draft
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::collections::memory::MemoryStore;
    use crate::uploads::tests::{image, temp_root};

    type TestNewsroom<'a> = Newsroom<'a, MemoryStore<NewsArticle>, MemoryStore<MediaItem>>;

    fn newsroom(uploads: &UploadStore) -> TestNewsroom<'_> {
        Newsroom::new(MemoryStore::new(), MemoryStore::new(), uploads)
    }

    fn draft(title: &str, published: bool) -> NewsDraft {
        NewsDraft {
            title: title.to_owned(),
            content: "Body".to_owned(),
            excerpt: String::new(),
            author: "Farm desk".to_owned(),
            featured: false,
            published,
            publish_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_requires_title_and_content() {
        let uploads = UploadStore::new(temp_root());
        let news = newsroom(&uploads);
        let mut missing = draft("Harvest", true);
        missing.content = "  ".to_owned();
        assert!(matches!(
            news.create(missing).await,
            Err(CollectionError::Validation(_))
        ));
        assert!(news.create(draft("", true)).await.is_err());
    }

    #[tokio::test]
    async fn test_published_listing_and_detail() {
        let uploads = UploadStore::new(temp_root());
        let news = newsroom(&uploads);
        let now = Utc::now();

        let mut older = draft("Older", true);
        older.publish_date = Some(now - Duration::days(3));
        let older = news.create(older).await.unwrap();
        let hidden = news.create(draft("Draft", false)).await.unwrap();
        let newer = news.create(draft("Newer", true)).await.unwrap();

        let titles: Vec<_> = news
            .list_published()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, vec!["Newer", "Older"]);

        assert!(matches!(
            news.published_detail(hidden.id).await,
            Err(CollectionError::NotFound { .. })
        ));
        let detail = news.published_detail(older.id).await.unwrap();
        assert_eq!(detail.related.len(), 1);
        assert_eq!(detail.related[0].id, newer.id);
    }

    #[tokio::test]
    async fn test_new_articles_list_newest_publish_date_first() {
        let uploads = UploadStore::new(temp_root());
        let news = newsroom(&uploads);
        let now = Utc::now();

        let mut older = draft("older", true);
        older.publish_date = Some(now - Duration::days(30));
        let older = news.create(older).await.unwrap();
        let mut newer = draft("newer", true);
        newer.publish_date = Some(now - Duration::days(1));
        let newer = news.create(newer).await.unwrap();
        assert_eq!((older.sort_order, newer.sort_order), (0, 0));

        let listed: Vec<_> = news
            .list_published()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(listed, vec!["newer", "older"]);

        // Related articles come from the newest end too
        for day in 2..8 {
            let mut filler = draft(&format!("day {day}"), true);
            filler.publish_date = Some(now - Duration::days(day));
            news.create(filler).await.unwrap();
        }
        let detail = news.published_detail(older.id).await.unwrap();
        let related: Vec<_> = detail.related.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(related, vec!["newer", "day 2", "day 3", "day 4", "day 5"]);
    }

    #[tokio::test]
    async fn test_update_keeps_publish_date_when_absent() {
        let uploads = UploadStore::new(temp_root());
        let news = newsroom(&uploads);
        let saved = news.create(draft("Harvest", true)).await.unwrap();

        let updated = news.update(saved.id, draft("Harvest 2026", false)).await.unwrap();
        assert_eq!(updated.publish_date, saved.publish_date);
        assert!(!updated.published);
    }

    #[tokio::test]
    async fn test_delete_removes_images_and_cover() {
        let uploads = UploadStore::new(temp_root());
        let news = newsroom(&uploads);
        let article = news.create(draft("Field day", true)).await.unwrap();
        let images = news
            .add_images(article.id, vec![image("a.png", 4), image("b.png", 4)])
            .await
            .unwrap();
        let article = news.set_cover(article.id, image("cover.png", 4)).await.unwrap();
        let cover = uploads.resolve(&article.cover_image_url).unwrap();
        assert!(cover.exists());

        news.delete(article.id).await.unwrap();

        assert!(news.list_all().await.unwrap().is_empty());
        assert!(news.images.store().all().is_empty());
        assert!(!cover.exists());
        assert!(!uploads.resolve(&images[0].url).unwrap().exists());

        // Deleting again is a no-op
        news.delete(article.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_batch_cap_of_twenty() {
        let uploads = UploadStore::new(temp_root());
        let news = newsroom(&uploads);
        let article = news.create(draft("Gallery", true)).await.unwrap();
        let files: Vec<_> = (0..21).map(|i| image(&format!("{i}.png"), 1)).collect();

        let result = news.add_images(article.id, files.clone()).await;
        assert!(matches!(
            result,
            Err(CollectionError::LimitExceeded { limit: 20, .. })
        ));
        news.add_images(article.id, files[..20].to_vec()).await.unwrap();
        news.add_images(article.id, files[..20].to_vec()).await.unwrap();
        assert_eq!(news.list_images(article.id).await.unwrap().len(), 40);
    }

    #[tokio::test]
    async fn test_update_caption() {
        let uploads = UploadStore::new(temp_root());
        let news = newsroom(&uploads);
        let article = news.create(draft("Captions", true)).await.unwrap();
        let saved = news.add_images(article.id, vec![image("a.png", 4)]).await.unwrap();

        let image = news.update_caption(saved[0].id, " Planting day ").await.unwrap();
        assert_eq!(image.caption, "Planting day");

        let missing = news.update_caption(MediaItemId::new(999), "x").await;
        assert!(matches!(missing, Err(CollectionError::NotFound { .. })));
    }
}
