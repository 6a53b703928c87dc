//! Ordered collections.
//!
//! Almost every piece of editable content on the site is a list of rows with
//! a `sort_order`: hero images, team members, testimonials, service products,
//! branches, and so on. They all share the same rules, implemented once here
//! by [`OrderedCollection`] over a storage backend implementing
//! [`OrderedStore`]:
//!
//! - listing returns rows by `(sort_order asc, id asc)` for one scope
//! - adding checks the collection limit first, then numbers the new rows
//!   `max(sort_order in scope) + 1, + 2, ...` (or `baseline + 1, ...` when the
//!   scope is empty) and inserts them as one batch; a policy with a fixed
//!   order gives every new row that order instead
//! - deleting an unknown id is a no-op; deleting a known row removes the row
//!   first and then, best-effort, any upload it owns
//! - reordering overwrites a single row's `sort_order` without touching its
//!   siblings
//! - replacing a row's image stores the new upload, repoints the row, then
//!   removes the previous file
//!
//! Gaps left by deletions are never renumbered.

pub mod catalogue;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;

use std::fmt;
use std::future::Future;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::uploads::{StoredFile, UploadError, UploadRule, UploadStore, UploadedFile};

pub use catalogue::CollectionPolicy;

/// A row that lives in an ordered collection.
pub trait OrderedItem: Clone + Send + Sync + 'static {
    type Id: Copy + Ord + Send + Sync + fmt::Debug + fmt::Display + 'static;
    /// Partition key: `()` for global collections, a parent id otherwise.
    type Scope: Copy + Eq + Send + Sync + fmt::Debug + 'static;

    fn id(&self) -> Self::Id;
    fn scope(&self) -> Self::Scope;
    fn sort_order(&self) -> i32;

    /// Public URLs of uploads owned by this row.
    fn owned_files(&self) -> Vec<&str> {
        Vec::new()
    }
}

/// A draft paired with the position assigned to it.
#[derive(Debug, Clone)]
pub struct Positioned<D> {
    pub sort_order: i32,
    pub draft: D,
}

/// Storage backend for one ordered collection.
///
/// Implementations must return `list` results ordered by
/// `(sort_order asc, id asc)` and must insert a batch all-or-nothing.
pub trait OrderedStore: Send + Sync {
    type Item: OrderedItem;
    /// Content fields of a row that has not been saved yet.
    type Draft: Send + Sync;

    fn list(
        &self,
        scope: <Self::Item as OrderedItem>::Scope,
    ) -> impl Future<Output = Result<Vec<Self::Item>, RepositoryError>> + Send;

    fn count(
        &self,
        scope: <Self::Item as OrderedItem>::Scope,
    ) -> impl Future<Output = Result<usize, RepositoryError>> + Send;

    fn max_sort_order(
        &self,
        scope: <Self::Item as OrderedItem>::Scope,
    ) -> impl Future<Output = Result<Option<i32>, RepositoryError>> + Send;

    fn insert_batch(
        &self,
        scope: <Self::Item as OrderedItem>::Scope,
        rows: Vec<Positioned<Self::Draft>>,
    ) -> impl Future<Output = Result<Vec<Self::Item>, RepositoryError>> + Send;

    fn find(
        &self,
        id: <Self::Item as OrderedItem>::Id,
    ) -> impl Future<Output = Result<Option<Self::Item>, RepositoryError>> + Send;

    /// Returns `false` when no row matched.
    fn delete(
        &self,
        id: <Self::Item as OrderedItem>::Id,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    fn update_sort_order(
        &self,
        id: <Self::Item as OrderedItem>::Id,
        sort_order: i32,
    ) -> impl Future<Output = Result<Option<Self::Item>, RepositoryError>> + Send;
}

/// A store whose rows can have their content fields rewritten.
pub trait EditableStore: OrderedStore {
    /// Returns `None` when no row matched.
    fn update(
        &self,
        id: <Self::Item as OrderedItem>::Id,
        draft: Self::Draft,
    ) -> impl Future<Output = Result<Option<Self::Item>, RepositoryError>> + Send;
}

/// A store whose rows carry one image URL (portrait, avatar, cover, or a
/// category's primary image). An empty string means no image.
pub trait PrimaryImageStore: OrderedStore {
    /// Current URL, or `None` when the row does not exist.
    fn primary_image(
        &self,
        id: <Self::Item as OrderedItem>::Id,
    ) -> impl Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Returns `false` when no row matched.
    fn set_primary_image(
        &self,
        id: <Self::Item as OrderedItem>::Id,
        url: &str,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

/// A store whose rows can expire.
pub trait ExpiringStore: OrderedStore {
    /// Ids of rows whose expiry is strictly before `now`.
    fn expired(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<<Self::Item as OrderedItem>::Id>, RepositoryError>> + Send;
}

/// Errors that can occur in collection operations.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// Adding would push the collection past its cap.
    #[error("{collection} limit is {limit}")]
    LimitExceeded {
        collection: &'static str,
        limit: usize,
    },

    /// Referenced row does not exist.
    #[error("{collection} {id} not found")]
    NotFound {
        collection: &'static str,
        id: String,
    },

    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CollectionError {
    pub(crate) fn not_found(collection: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            collection,
            id: id.to_string(),
        }
    }
}

/// Generic manager for one ordered collection.
pub struct OrderedCollection<'a, S> {
    store: S,
    policy: &'static CollectionPolicy,
    uploads: &'a UploadStore,
}

impl<'a, S> OrderedCollection<'a, S>
where
    S: OrderedStore,
{
    #[must_use]
    pub const fn new(
        store: S,
        policy: &'static CollectionPolicy,
        uploads: &'a UploadStore,
    ) -> Self {
        Self {
            store,
            policy,
            uploads,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn policy(&self) -> &'static CollectionPolicy {
        self.policy
    }

    #[must_use]
    pub const fn uploads(&self) -> &'a UploadStore {
        self.uploads
    }

    /// All rows in `scope`, by `(sort_order, id)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn list(
        &self,
        scope: <S::Item as OrderedItem>::Scope,
    ) -> Result<Vec<S::Item>, CollectionError> {
        Ok(self.store.list(scope).await?)
    }

    /// Fetch one row.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is unknown.
    pub async fn get(&self, id: <S::Item as OrderedItem>::Id) -> Result<S::Item, CollectionError> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| CollectionError::not_found(self.policy.name, id))
    }

    /// Fail unless `incoming` more rows fit in `scope`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty batch and `LimitExceeded` when the
    /// batch is larger than the per-request cap or would overflow the
    /// collection limit.
    pub async fn ensure_capacity(
        &self,
        scope: <S::Item as OrderedItem>::Scope,
        incoming: usize,
    ) -> Result<(), CollectionError> {
        if incoming == 0 {
            return Err(CollectionError::Validation(format!(
                "At least one {} item is required",
                self.policy.name
            )));
        }
        if let Some(max_batch) = self.policy.max_batch
            && incoming > max_batch
        {
            return Err(CollectionError::LimitExceeded {
                collection: self.policy.name,
                limit: max_batch,
            });
        }
        if let Some(limit) = self.policy.limit {
            let current = self.store.count(scope).await?;
            if current + incoming > limit {
                return Err(CollectionError::LimitExceeded {
                    collection: self.policy.name,
                    limit,
                });
            }
        }
        Ok(())
    }

    /// Append rows to `scope` in input order.
    ///
    /// # Errors
    ///
    /// Returns `LimitExceeded` (leaving the collection untouched) if the batch
    /// does not fit, or a repository error if the insert fails.
    pub async fn add(
        &self,
        scope: <S::Item as OrderedItem>::Scope,
        drafts: Vec<S::Draft>,
    ) -> Result<Vec<S::Item>, CollectionError> {
        self.ensure_capacity(scope, drafts.len()).await?;

        let rows: Vec<Positioned<S::Draft>> = if let Some(sort_order) = self.policy.fixed_order {
            drafts
                .into_iter()
                .map(|draft| Positioned { sort_order, draft })
                .collect()
        } else {
            let start = self
                .store
                .max_sort_order(scope)
                .await?
                .unwrap_or(self.policy.baseline);
            drafts
                .into_iter()
                .zip(1..)
                .map(|(draft, offset)| Positioned {
                    sort_order: start + offset,
                    draft,
                })
                .collect()
        };

        let saved = self.store.insert_batch(scope, rows).await?;
        tracing::info!(
            collection = self.policy.name,
            scope = ?scope,
            added = saved.len(),
            "Added collection items"
        );
        Ok(saved)
    }

    /// Store uploaded files and append one row per file.
    ///
    /// Capacity is checked before anything is written. If the insert fails
    /// the freshly written files are removed again.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the collection does not take uploads,
    /// `LimitExceeded`, an upload error, or a repository error.
    pub async fn add_uploads<F>(
        &self,
        scope: <S::Item as OrderedItem>::Scope,
        files: Vec<UploadedFile>,
        to_draft: F,
    ) -> Result<Vec<S::Item>, CollectionError>
    where
        F: Fn(StoredFile) -> S::Draft + Send,
    {
        let rule = self.upload_rule()?;
        self.ensure_capacity(scope, files.len()).await?;

        let stored = self.uploads.save_all(rule, files).await?;
        let urls: Vec<String> = stored.iter().map(|s| s.url.clone()).collect();
        let drafts = stored.into_iter().map(to_draft).collect();

        match self.add(scope, drafts).await {
            Ok(saved) => Ok(saved),
            Err(e) => {
                self.uploads.remove_all(&urls).await;
                Err(e)
            }
        }
    }

    /// Store a single upload for this collection without creating a row.
    ///
    /// Used for files that hang off an existing row (avatars, covers).
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the collection does not take uploads, or an
    /// upload error.
    pub async fn store_upload(&self, file: UploadedFile) -> Result<StoredFile, CollectionError> {
        let rule = self.upload_rule()?;
        Ok(self.uploads.save(rule, file).await?)
    }

    /// Delete a row and, best-effort, its files.
    ///
    /// Returns the deleted row, or `None` if the id was unknown.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store fails; file removal never fails.
    pub async fn delete(
        &self,
        id: <S::Item as OrderedItem>::Id,
    ) -> Result<Option<S::Item>, CollectionError> {
        let Some(item) = self.store.find(id).await? else {
            tracing::debug!(collection = self.policy.name, %id, "Delete of unknown id ignored");
            return Ok(None);
        };

        if !self.store.delete(id).await? {
            return Ok(None);
        }

        let files: Vec<String> = item.owned_files().into_iter().map(str::to_owned).collect();
        self.uploads.remove_all(&files).await;
        tracing::info!(collection = self.policy.name, %id, "Deleted collection item");
        Ok(Some(item))
    }

    /// Overwrite a row's `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is unknown.
    pub async fn update_order(
        &self,
        id: <S::Item as OrderedItem>::Id,
        sort_order: i32,
    ) -> Result<S::Item, CollectionError> {
        self.store
            .update_sort_order(id, sort_order)
            .await?
            .ok_or_else(|| CollectionError::not_found(self.policy.name, id))
    }

    fn upload_rule(&self) -> Result<UploadRule, CollectionError> {
        self.policy.upload.ok_or_else(|| {
            CollectionError::Validation(format!("{} does not accept uploads", self.policy.name))
        })
    }
}

impl<S> OrderedCollection<'_, S>
where
    S: EditableStore,
{
    /// Rewrite a row's content fields, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is unknown.
    pub async fn update(
        &self,
        id: <S::Item as OrderedItem>::Id,
        draft: S::Draft,
    ) -> Result<S::Item, CollectionError> {
        self.store
            .update(id, draft)
            .await?
            .ok_or_else(|| CollectionError::not_found(self.policy.name, id))
    }
}

impl<S> OrderedCollection<'_, S>
where
    S: PrimaryImageStore,
{
    /// Store `file` as the row's image and remove the one it replaces.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is unknown (the new file is removed
    /// again), or an upload or repository error.
    pub async fn replace_image(
        &self,
        id: <S::Item as OrderedItem>::Id,
        file: UploadedFile,
    ) -> Result<S::Item, CollectionError> {
        let previous = self
            .store
            .primary_image(id)
            .await?
            .ok_or_else(|| CollectionError::not_found(self.policy.name, id))?;

        let stored = self.store_upload(file).await?;
        match self.store.set_primary_image(id, &stored.url).await {
            Ok(true) => {}
            Ok(false) => {
                self.uploads.remove(&stored.url).await;
                return Err(CollectionError::not_found(self.policy.name, id));
            }
            Err(e) => {
                self.uploads.remove(&stored.url).await;
                return Err(e.into());
            }
        }

        if previous != stored.url {
            self.uploads.remove(&previous).await;
        }
        tracing::info!(collection = self.policy.name, %id, url = %stored.url, "Replaced image");
        self.get(id).await
    }
}

impl<S> OrderedCollection<'_, S>
where
    S: ExpiringStore,
{
    /// Delete every expired row (and its files). Returns how many went.
    ///
    /// Safe to run concurrently with itself: rows already gone are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, CollectionError> {
        let mut removed = 0;
        for id in self.store.expired(now).await? {
            if self.delete(id).await?.is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::info!(collection = self.policy.name, removed, "Swept expired items");
        }
        Ok(removed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::memory::MemoryStore;
    use super::*;
    use crate::collections::catalogue;
    use crate::models::media::{MediaDraft, MediaItem};
    use crate::models::team::{TeamDraft, TeamMember};
    use crate::uploads::tests::{image, temp_root};

    fn draft(name: &str) -> MediaDraft {
        MediaDraft {
            filename: format!("{name}.jpg"),
            url: format!("/uploads/feature/{name}.jpg"),
            caption: String::new(),
            expires_at: None,
        }
    }

    fn member(name: &str) -> TeamDraft {
        TeamDraft {
            name: name.to_owned(),
            role: "Agronomist".to_owned(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_add_assigns_consecutive_orders_across_batches() {
        let uploads = UploadStore::new(temp_root());
        let features = OrderedCollection::new(
            MemoryStore::<MediaItem>::new(),
            &catalogue::FEATURE_IMAGES,
            &uploads,
        );

        features.add(None, vec![draft("a")]).await.unwrap();
        features.add(None, vec![draft("b"), draft("c")]).await.unwrap();
        features.add(None, vec![draft("d")]).await.unwrap();

        let orders: Vec<i32> = features
            .list(None)
            .await
            .unwrap()
            .iter()
            .map(OrderedItem::sort_order)
            .collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_negative_baseline_starts_at_zero() {
        let uploads = UploadStore::new(temp_root());
        let intro = OrderedCollection::new(
            MemoryStore::<MediaItem>::new(),
            &catalogue::ABOUT_INTRO_IMAGES,
            &uploads,
        );

        let saved = intro.add(None, vec![draft("a"), draft("b")]).await.unwrap();
        assert_eq!(saved[0].sort_order(), 0);
        assert_eq!(saved[1].sort_order(), 1);
    }

    #[tokio::test]
    async fn test_limit_exceeded_leaves_collection_untouched() {
        let uploads = UploadStore::new(temp_root());
        let features = OrderedCollection::new(
            MemoryStore::<MediaItem>::new(),
            &catalogue::FEATURE_IMAGES,
            &uploads,
        );
        let nine = (0..9).map(|i| draft(&i.to_string())).collect();
        features.add(None, nine).await.unwrap();

        let err = features
            .add(None, vec![draft("x"), draft("y")])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CollectionError::LimitExceeded { limit: 10, .. }
        ));
        assert_eq!(features.list(None).await.unwrap().len(), 9);

        // Exactly reaching the cap is fine
        features.add(None, vec![draft("z")]).await.unwrap();
        assert_eq!(features.list(None).await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected() {
        let uploads = UploadStore::new(temp_root());
        let team = OrderedCollection::new(
            MemoryStore::<TeamMember>::new(),
            &catalogue::TEAM_MEMBERS,
            &uploads,
        );
        assert!(matches!(
            team.add((), Vec::new()).await,
            Err(CollectionError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_scopes_are_independent() {
        let uploads = UploadStore::new(temp_root());
        let offers = OrderedCollection::new(
            MemoryStore::<MediaItem>::new(),
            &catalogue::OFFER_IMAGES,
            &uploads,
        );

        offers.add(Some(1), vec![draft("a"), draft("b")]).await.unwrap();
        let other = offers.add(Some(2), vec![draft("c")]).await.unwrap();

        assert_eq!(other[0].sort_order(), 1);
        assert_eq!(offers.list(Some(1)).await.unwrap().len(), 2);
        assert_eq!(offers.list(Some(2)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_noop() {
        let uploads = UploadStore::new(temp_root());
        let team = OrderedCollection::new(
            MemoryStore::<TeamMember>::new(),
            &catalogue::TEAM_MEMBERS,
            &uploads,
        );
        team.add((), vec![member("Ama")]).await.unwrap();

        let deleted = team
            .delete(lakeside_core::TeamMemberId::new(999))
            .await
            .unwrap();
        assert!(deleted.is_none());
        assert_eq!(team.list(()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_keeps_gaps_and_order() {
        let uploads = UploadStore::new(temp_root());
        let features = OrderedCollection::new(
            MemoryStore::<MediaItem>::new(),
            &catalogue::FEATURE_IMAGES,
            &uploads,
        );
        let saved = features
            .add(None, vec![draft("a"), draft("b"), draft("c")])
            .await
            .unwrap();

        features.delete(saved[1].id()).await.unwrap();

        let remaining: Vec<i32> = features
            .list(None)
            .await
            .unwrap()
            .iter()
            .map(OrderedItem::sort_order)
            .collect();
        assert_eq!(remaining, vec![1, 3]);

        // Next insert continues after the max, not after the count
        let next = features.add(None, vec![draft("d")]).await.unwrap();
        assert_eq!(next[0].sort_order(), 4);
    }

    #[tokio::test]
    async fn test_delete_removes_backing_file() {
        let uploads = UploadStore::new(temp_root());
        let about = OrderedCollection::new(
            MemoryStore::<MediaItem>::new(),
            &catalogue::ABOUT_IMAGES,
            &uploads,
        );
        let saved = about
            .add_uploads(None, vec![image("barn.png", 16)], MediaDraft::from_upload)
            .await
            .unwrap();
        let path = uploads.resolve(&saved[0].url).unwrap();
        assert!(path.exists());

        about.delete(saved[0].id()).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_delete_succeeds_when_file_is_already_gone() {
        let uploads = UploadStore::new(temp_root());
        let features = OrderedCollection::new(
            MemoryStore::<MediaItem>::new(),
            &catalogue::FEATURE_IMAGES,
            &uploads,
        );
        let saved = features.add(None, vec![draft("ghost")]).await.unwrap();

        let deleted = features.delete(saved[0].id()).await.unwrap();
        assert!(deleted.is_some());
        assert!(features.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_insert_removes_written_files() {
        let uploads = UploadStore::new(temp_root());
        let store = MemoryStore::<MediaItem>::new();
        store.fail_next_insert();
        let about = OrderedCollection::new(store, &catalogue::ABOUT_IMAGES, &uploads);

        let result = about
            .add_uploads(None, vec![image("a.png", 8)], MediaDraft::from_upload)
            .await;
        assert!(matches!(result, Err(CollectionError::Repository(_))));

        let dir = uploads.uploads_dir().join("about");
        let leftovers = std::fs::read_dir(&dir).map_or(0, Iterator::count);
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_upload_limit_checked_before_writing() {
        let uploads = UploadStore::new(temp_root());
        let about = OrderedCollection::new(
            MemoryStore::<MediaItem>::new(),
            &catalogue::ABOUT_IMAGES,
            &uploads,
        );
        let files: Vec<_> = (0..11).map(|i| image(&format!("{i}.png"), 4)).collect();

        let result = about.add_uploads(None, files, MediaDraft::from_upload).await;
        assert!(matches!(result, Err(CollectionError::LimitExceeded { .. })));
        assert!(!uploads.uploads_dir().join("about").exists());
    }

    #[tokio::test]
    async fn test_update_order_allows_duplicates_and_ties_break_by_id() {
        let uploads = UploadStore::new(temp_root());
        let accents = OrderedCollection::new(
            MemoryStore::<MediaItem>::new(),
            &catalogue::ABOUT_ACCENT_IMAGES,
            &uploads,
        );
        let saved = accents
            .add(None, vec![draft("a"), draft("b"), draft("c")])
            .await
            .unwrap();
        assert_eq!(saved[0].sort_order(), 0);

        // Move "c" onto "a"'s position
        accents.update_order(saved[2].id(), 0).await.unwrap();

        let ids: Vec<_> = accents
            .list(None)
            .await
            .unwrap()
            .iter()
            .map(OrderedItem::id)
            .collect();
        assert_eq!(ids, vec![saved[0].id(), saved[2].id(), saved[1].id()]);
    }

    #[tokio::test]
    async fn test_update_order_unknown_id() {
        let uploads = UploadStore::new(temp_root());
        let accents = OrderedCollection::new(
            MemoryStore::<MediaItem>::new(),
            &catalogue::ABOUT_ACCENT_IMAGES,
            &uploads,
        );
        let result = accents
            .update_order(lakeside_core::MediaItemId::new(5), 3)
            .await;
        assert!(matches!(result, Err(CollectionError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_keeps_position() {
        let uploads = UploadStore::new(temp_root());
        let team = OrderedCollection::new(
            MemoryStore::<TeamMember>::new(),
            &catalogue::TEAM_MEMBERS,
            &uploads,
        );
        let saved = team.add((), vec![member("Ama"), member("Kofi")]).await.unwrap();

        let updated = team.update(saved[1].id(), member("Kofi Mensah")).await.unwrap();
        assert_eq!(updated.name, "Kofi Mensah");
        assert_eq!(updated.sort_order(), 2);

        let missing = team
            .update(lakeside_core::TeamMemberId::new(42), member("Nobody"))
            .await;
        assert!(matches!(missing, Err(CollectionError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_replace_image_removes_previous_file() {
        let uploads = UploadStore::new(temp_root());
        let team = OrderedCollection::new(
            MemoryStore::<TeamMember>::new(),
            &catalogue::TEAM_MEMBERS,
            &uploads,
        );
        let saved = team.add((), vec![member("Ama")]).await.unwrap();
        let id = saved[0].id();

        let first = team.replace_image(id, image("ama.png", 8)).await.unwrap();
        let first_path = uploads.resolve(&first.image_url).unwrap();
        assert!(first_path.exists());

        let second = team.replace_image(id, image("ama2.png", 8)).await.unwrap();
        assert_ne!(first.image_url, second.image_url);
        assert!(!first_path.exists());
        assert!(uploads.resolve(&second.image_url).unwrap().exists());
    }

    #[tokio::test]
    async fn test_replace_image_unknown_row_writes_nothing() {
        let uploads = UploadStore::new(temp_root());
        let team = OrderedCollection::new(
            MemoryStore::<TeamMember>::new(),
            &catalogue::TEAM_MEMBERS,
            &uploads,
        );
        let result = team
            .replace_image(lakeside_core::TeamMemberId::new(3), image("x.png", 8))
            .await;
        assert!(matches!(result, Err(CollectionError::NotFound { .. })));
        assert!(!uploads.uploads_dir().join("team").exists());
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired_rows() {
        let uploads = UploadStore::new(temp_root());
        let hero = OrderedCollection::new(
            MemoryStore::<MediaItem>::new(),
            &catalogue::HERO_IMAGES,
            &uploads,
        );
        let now = Utc::now();
        let mut stale = draft("old");
        stale.expires_at = Some(now - Duration::hours(1));
        let mut fresh = draft("new");
        fresh.expires_at = Some(now + Duration::days(29));
        hero.add(None, vec![stale, fresh]).await.unwrap();

        assert_eq!(hero.sweep_expired(now).await.unwrap(), 1);
        // Idempotent
        assert_eq!(hero.sweep_expired(now).await.unwrap(), 0);

        let left = hero.list(None).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].filename, "new.jpg");
    }
}
