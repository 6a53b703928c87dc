//! Hero images and the greenhouse video.

use chrono::{DateTime, Duration, Utc};
use tracing::instrument;

use lakeside_core::MediaItemId;

use crate::collections::{
    CollectionError, ExpiringStore, OrderedCollection, OrderedStore, catalogue,
};
use crate::models::media::{MediaDraft, MediaItem};
use crate::uploads::{UploadStore, UploadedFile};

/// Home page hero images. Each expires [`catalogue::HERO_IMAGE_TTL_DAYS`]
/// after upload.
pub struct HeroImages<'a, S> {
    images: OrderedCollection<'a, S>,
}

impl<'a, S> HeroImages<'a, S>
where
    S: ExpiringStore<Item = MediaItem, Draft = MediaDraft>,
{
    #[must_use]
    pub const fn new(store: S, uploads: &'a UploadStore) -> Self {
        Self {
            images: OrderedCollection::new(store, &catalogue::HERO_IMAGES, uploads),
        }
    }

    /// Live images in order. Expired ones are swept first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn list(&self, now: DateTime<Utc>) -> Result<Vec<MediaItem>, CollectionError> {
        self.images.sweep_expired(now).await?;
        self.images.list(None).await
    }

    /// Store uploads as hero images expiring 30 days from `now`.
    ///
    /// # Errors
    ///
    /// Returns `LimitExceeded` past 50 live images, or an upload error.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn add(
        &self,
        files: Vec<UploadedFile>,
        now: DateTime<Utc>,
    ) -> Result<Vec<MediaItem>, CollectionError> {
        self.images.sweep_expired(now).await?;
        let ttl = Duration::days(catalogue::HERO_IMAGE_TTL_DAYS);
        self.images
            .add_uploads(None, files, move |file| MediaDraft::expiring(file, now, ttl))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the store fails. Unknown ids are ignored.
    pub async fn delete(&self, id: MediaItemId) -> Result<(), CollectionError> {
        self.images.delete(id).await?;
        Ok(())
    }

    /// Remove every image expired at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<usize, CollectionError> {
        self.images.sweep_expired(now).await
    }
}

/// The single greenhouse video on the about page.
pub struct GreenhouseVideo<'a, S> {
    video: OrderedCollection<'a, S>,
}

impl<'a, S> GreenhouseVideo<'a, S>
where
    S: OrderedStore<Item = MediaItem, Draft = MediaDraft>,
{
    #[must_use]
    pub const fn new(store: S, uploads: &'a UploadStore) -> Self {
        Self {
            video: OrderedCollection::new(store, &catalogue::GREENHOUSE_VIDEO, uploads),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn current(&self) -> Result<Option<MediaItem>, CollectionError> {
        Ok(self.video.list(None).await?.into_iter().next_back())
    }

    /// Replace the current video with `file`.
    ///
    /// The upload is validated before the existing video is removed.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` or upload error for a non-video or oversized
    /// file, leaving the current video in place.
    #[instrument(skip(self, file), fields(name = %file.original_name))]
    pub async fn replace(&self, file: UploadedFile) -> Result<MediaItem, CollectionError> {
        if let Some(rule) = &self.video.policy().upload {
            UploadStore::validate(rule, &file)?;
        }
        for existing in self.video.list(None).await? {
            self.video.delete(existing.id).await?;
        }
        let saved = self
            .video
            .add_uploads(None, vec![file], MediaDraft::from_upload)
            .await?;
        saved
            .into_iter()
            .next()
            .ok_or_else(|| CollectionError::Validation("No video uploaded".to_owned()))
    }

    /// # Errors
    ///
    /// Returns an error if the store fails. Unknown ids are ignored.
    pub async fn delete(&self, id: MediaItemId) -> Result<(), CollectionError> {
        self.video.delete(id).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Bytes;

    use super::*;
    use crate::collections::memory::MemoryStore;
    use crate::uploads::UploadError;
    use crate::uploads::tests::{image, temp_root};

    fn video(name: &str) -> UploadedFile {
        UploadedFile {
            original_name: name.to_owned(),
            content_type: "video/mp4".to_owned(),
            bytes: Bytes::from_static(b"\x00\x00\x00\x18ftypmp42"),
        }
    }

    #[tokio::test]
    async fn test_hero_images_expire_after_thirty_days() {
        let uploads = UploadStore::new(temp_root());
        let hero = HeroImages::new(MemoryStore::new(), &uploads);
        let now = Utc::now();

        let saved = hero.add(vec![image("field.png", 8)], now).await.unwrap();
        assert_eq!(saved[0].expires_at, Some(now + Duration::days(30)));

        assert_eq!(hero.list(now + Duration::days(29)).await.unwrap().len(), 1);
        assert!(hero.list(now + Duration::days(31)).await.unwrap().is_empty());
        assert!(!uploads.resolve(&saved[0].url).unwrap().exists());
    }

    #[tokio::test]
    async fn test_hero_limit_counts_only_live_images() {
        let uploads = UploadStore::new(temp_root());
        let hero = HeroImages::new(MemoryStore::new(), &uploads);
        let long_ago = Utc::now() - Duration::days(40);
        let files: Vec<_> = (0..50).map(|i| image(&format!("{i}.png"), 1)).collect();
        hero.add(files, long_ago).await.unwrap();

        // All 50 have expired, so a new batch fits
        let saved = hero.add(vec![image("new.png", 1)], Utc::now()).await.unwrap();
        assert_eq!(saved.len(), 1);
    }

    #[tokio::test]
    async fn test_greenhouse_replace_removes_previous() {
        let uploads = UploadStore::new(temp_root());
        let greenhouse = GreenhouseVideo::new(MemoryStore::new(), &uploads);

        let first = greenhouse.replace(video("tour.mp4")).await.unwrap();
        let second = greenhouse.replace(video("tour2.mov")).await.unwrap();

        assert!(second.url.ends_with(".mov"));
        assert!(!uploads.resolve(&first.url).unwrap().exists());
        assert_eq!(greenhouse.current().await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_greenhouse_rejects_images_and_keeps_current() {
        let uploads = UploadStore::new(temp_root());
        let greenhouse = GreenhouseVideo::new(MemoryStore::new(), &uploads);
        let current = greenhouse.replace(video("tour.mp4")).await.unwrap();

        let result = greenhouse.replace(image("photo.png", 8)).await;
        assert!(matches!(
            result,
            Err(CollectionError::Upload(UploadError::NotAVideo))
        ));
        assert_eq!(greenhouse.current().await.unwrap(), Some(current));
    }
}
