//! In-memory ordered stores for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use chrono::{DateTime, Utc};
use lakeside_core::MediaItemId;

use super::{EditableStore, ExpiringStore, OrderedItem, OrderedStore, Positioned, PrimaryImageStore};
use crate::db::RepositoryError;
use crate::models::media::MediaItem;
use crate::services::news::CaptionStore;

/// A row type that can be built from a draft without a database.
pub trait MemoryRecord: OrderedItem {
    type Draft: Send + Sync;

    fn materialize(id: i32, scope: Self::Scope, sort_order: i32, draft: Self::Draft) -> Self;
    fn set_sort_order(&mut self, sort_order: i32);

    /// Overwrite content fields from a draft.
    fn apply(&mut self, draft: Self::Draft);

    /// The row's single image URL, for types that have one.
    fn image_slot(&mut self) -> Option<&mut String> {
        None
    }
}

/// `Vec`-backed store with sequential ids starting at 1.
pub struct MemoryStore<T> {
    rows: Mutex<Vec<T>>,
    next_id: AtomicI32,
    fail_next_insert: AtomicBool,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(1),
            fail_next_insert: AtomicBool::new(false),
        }
    }
}

impl<T: MemoryRecord> MemoryStore<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `insert_batch` fail without storing anything.
    pub fn fail_next_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }

    /// Snapshot of every row regardless of scope.
    #[must_use]
    pub fn all(&self) -> Vec<T> {
        self.lock().clone()
    }

    /// Apply `f` to the row with `id`, returning the updated row.
    pub fn modify(&self, id: T::Id, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut rows = self.lock();
        let row = rows.iter_mut().find(|r| r.id() == id)?;
        f(row);
        Some(row.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<T>> {
        // A panicking test thread must not wedge the others
        self.rows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<T: MemoryRecord> OrderedStore for MemoryStore<T> {
    type Item = T;
    type Draft = <T as MemoryRecord>::Draft;

    async fn list(&self, scope: T::Scope) -> Result<Vec<T>, RepositoryError> {
        let mut rows: Vec<T> = self
            .lock()
            .iter()
            .filter(|r| r.scope() == scope)
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.sort_order(), r.id()));
        Ok(rows)
    }

    async fn count(&self, scope: T::Scope) -> Result<usize, RepositoryError> {
        Ok(self.lock().iter().filter(|r| r.scope() == scope).count())
    }

    async fn max_sort_order(&self, scope: T::Scope) -> Result<Option<i32>, RepositoryError> {
        Ok(self
            .lock()
            .iter()
            .filter(|r| r.scope() == scope)
            .map(OrderedItem::sort_order)
            .max())
    }

    async fn insert_batch(
        &self,
        scope: T::Scope,
        rows: Vec<Positioned<Self::Draft>>,
    ) -> Result<Vec<T>, RepositoryError> {
        if self.fail_next_insert.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::DataCorruption(
                "injected insert failure".to_owned(),
            ));
        }
        let saved: Vec<T> = rows
            .into_iter()
            .map(|row| {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                T::materialize(id, scope, row.sort_order, row.draft)
            })
            .collect();
        self.lock().extend(saved.iter().cloned());
        Ok(saved)
    }

    async fn find(&self, id: T::Id) -> Result<Option<T>, RepositoryError> {
        Ok(self.lock().iter().find(|r| r.id() == id).cloned())
    }

    async fn delete(&self, id: T::Id) -> Result<bool, RepositoryError> {
        let mut rows = self.lock();
        let before = rows.len();
        rows.retain(|r| r.id() != id);
        Ok(rows.len() != before)
    }

    async fn update_sort_order(
        &self,
        id: T::Id,
        sort_order: i32,
    ) -> Result<Option<T>, RepositoryError> {
        Ok(self.modify(id, |row| row.set_sort_order(sort_order)))
    }
}

impl ExpiringStore for MemoryStore<MediaItem> {
    async fn expired(&self, now: DateTime<Utc>) -> Result<Vec<MediaItemId>, RepositoryError> {
        Ok(self
            .lock()
            .iter()
            .filter(|r| r.expires_at.is_some_and(|at| at < now))
            .map(|r| r.id)
            .collect())
    }
}

impl CaptionStore for MemoryStore<MediaItem> {
    async fn update_caption(
        &self,
        id: MediaItemId,
        caption: &str,
    ) -> Result<Option<MediaItem>, RepositoryError> {
        Ok(self.modify(id, |row| caption.clone_into(&mut row.caption)))
    }
}

impl<T: MemoryRecord> EditableStore for MemoryStore<T> {
    async fn update(&self, id: T::Id, draft: Self::Draft) -> Result<Option<T>, RepositoryError> {
        Ok(self.modify(id, |row| row.apply(draft)))
    }
}

impl<T: MemoryRecord> PrimaryImageStore for MemoryStore<T> {
    async fn primary_image(&self, id: T::Id) -> Result<Option<String>, RepositoryError> {
        let mut rows = self.lock();
        Ok(rows
            .iter_mut()
            .find(|r| r.id() == id)
            .and_then(|r| r.image_slot().cloned()))
    }

    async fn set_primary_image(&self, id: T::Id, url: &str) -> Result<bool, RepositoryError> {
        let mut rows = self.lock();
        let Some(slot) = rows.iter_mut().find(|r| r.id() == id).and_then(MemoryRecord::image_slot)
        else {
            return Ok(false);
        };
        url.clone_into(slot);
        Ok(true)
    }
}
