//! Services catalogue: categories, their products, and their images.
//!
//! A category keeps a denormalized `image_url` pointing at one of its own
//! images. Adding images to a category without a pointer sets it to the
//! first new image; deleting the image it points at moves it to the first
//! remaining image (by sort order) or clears it.

use tracing::instrument;

use lakeside_core::{MediaItemId, ServiceCategoryId, ServiceProductId};

use super::required;
use crate::collections::{
    CollectionError, EditableStore, OrderedCollection, OrderedStore, PrimaryImageStore, catalogue,
};
use crate::models::media::{MediaDraft, MediaItem};
use crate::models::service::{
    CategoryDraft, DEFAULT_CATALOGUE, ProductDraft, ServiceCategory, ServiceProduct,
};
use crate::uploads::{UploadStore, UploadedFile};

/// A category with everything shown alongside it.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListing {
    #[serde(flatten)]
    pub category: ServiceCategory,
    pub images: Vec<MediaItem>,
    pub products: Vec<ServiceProduct>,
}

impl CategoryListing {
    /// First gallery image, falling back to the stored pointer.
    #[must_use]
    pub fn display_image(&self) -> &str {
        self.images
            .first()
            .map_or(self.category.image_url.as_str(), |image| image.url.as_str())
    }
}

/// Media scope of a category's images.
const fn image_scope(id: ServiceCategoryId) -> Option<i32> {
    Some(id.as_i32())
}

/// Category, product and category-image operations.
pub struct Catalog<'a, C, P, I> {
    categories: OrderedCollection<'a, C>,
    products: OrderedCollection<'a, P>,
    images: OrderedCollection<'a, I>,
}

impl<'a, C, P, I> Catalog<'a, C, P, I>
where
    C: EditableStore<Item = ServiceCategory, Draft = CategoryDraft> + PrimaryImageStore,
    P: EditableStore<Item = ServiceProduct, Draft = ProductDraft>,
    I: OrderedStore<Item = MediaItem, Draft = MediaDraft>,
{
    #[must_use]
    pub const fn new(categories: C, products: P, images: I, uploads: &'a UploadStore) -> Self {
        Self {
            categories: OrderedCollection::new(categories, &catalogue::SERVICE_CATEGORIES, uploads),
            products: OrderedCollection::new(products, &catalogue::SERVICE_PRODUCTS, uploads),
            images: OrderedCollection::new(images, &catalogue::SERVICE_CATEGORY_IMAGES, uploads),
        }
    }

    /// Every category in order, each with its images and products.
    ///
    /// # Errors
    ///
    /// Returns an error if a store fails.
    pub async fn list(&self) -> Result<Vec<CategoryListing>, CollectionError> {
        let categories = self.categories.list(()).await?;
        let mut listings = Vec::with_capacity(categories.len());
        for category in categories {
            let images = self.images.list(image_scope(category.id)).await?;
            let products = self.products.list(category.id).await?;
            listings.push(CategoryListing {
                category,
                images,
                products,
            });
        }
        Ok(listings)
    }

    /// # Errors
    ///
    /// Returns `Validation` if the name is blank.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_category(
        &self,
        draft: CategoryDraft,
    ) -> Result<ServiceCategory, CollectionError> {
        let draft = validate_category(draft)?;
        first(self.categories.add((), vec![draft]).await?)
    }

    /// # Errors
    ///
    /// Returns `Validation` if the name is blank, `NotFound` if the id is
    /// unknown.
    #[instrument(skip(self, draft))]
    pub async fn update_category(
        &self,
        id: ServiceCategoryId,
        draft: CategoryDraft,
    ) -> Result<ServiceCategory, CollectionError> {
        let draft = validate_category(draft)?;
        self.categories.update(id, draft).await
    }

    /// Delete a category's products, then its images (and their files),
    /// then the category itself. Unknown ids are ignored.
    ///
    /// The steps are independent statements; a failure part-way leaves the
    /// earlier deletions in place.
    ///
    /// # Errors
    ///
    /// Returns an error if a store fails.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: ServiceCategoryId) -> Result<(), CollectionError> {
        for product in self.products.list(id).await? {
            self.products.delete(product.id).await?;
        }
        for image in self.images.list(image_scope(id)).await? {
            self.images.delete(image.id).await?;
        }
        self.categories.delete(id).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `Validation` if the name is blank, `NotFound` if the category
    /// does not exist.
    #[instrument(skip(self, draft))]
    pub async fn create_product(
        &self,
        category_id: ServiceCategoryId,
        draft: ProductDraft,
    ) -> Result<ServiceProduct, CollectionError> {
        let draft = validate_product(draft)?;
        self.categories.get(category_id).await?;
        first(self.products.add(category_id, vec![draft]).await?)
    }

    /// # Errors
    ///
    /// Returns `Validation` if the name is blank, `NotFound` if the id is
    /// unknown.
    #[instrument(skip(self, draft))]
    pub async fn update_product(
        &self,
        id: ServiceProductId,
        draft: ProductDraft,
    ) -> Result<ServiceProduct, CollectionError> {
        let draft = validate_product(draft)?;
        self.products.update(id, draft).await
    }

    /// # Errors
    ///
    /// Returns an error if the store fails. Unknown ids are ignored.
    pub async fn delete_product(&self, id: ServiceProductId) -> Result<(), CollectionError> {
        self.products.delete(id).await?;
        Ok(())
    }

    /// Images of one category, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn list_images(
        &self,
        category_id: ServiceCategoryId,
    ) -> Result<Vec<MediaItem>, CollectionError> {
        self.images.list(image_scope(category_id)).await
    }

    /// Store uploads as category images. Sets the primary pointer to the
    /// first new image when the category has none.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category does not exist, `LimitExceeded`
    /// past 12 images, or an upload error.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn add_images(
        &self,
        category_id: ServiceCategoryId,
        files: Vec<UploadedFile>,
    ) -> Result<Vec<MediaItem>, CollectionError> {
        let pointer = self.primary_image(category_id).await?;

        let saved = self
            .images
            .add_uploads(image_scope(category_id), files, MediaDraft::from_upload)
            .await?;

        if pointer.is_empty()
            && let Some(image) = saved.first()
        {
            self.categories
                .store()
                .set_primary_image(category_id, &image.url)
                .await?;
        }
        Ok(saved)
    }

    /// Upload one image into the category's gallery and make it primary.
    ///
    /// # Errors
    ///
    /// Same as [`add_images`](Self::add_images).
    pub async fn set_image(
        &self,
        category_id: ServiceCategoryId,
        file: UploadedFile,
    ) -> Result<ServiceCategory, CollectionError> {
        let saved = self.add_images(category_id, vec![file]).await?;
        let image = first(saved)?;
        self.categories
            .store()
            .set_primary_image(category_id, &image.url)
            .await?;
        self.categories.get(category_id).await
    }

    /// Delete a category image, repointing the category if it was primary.
    ///
    /// # Errors
    ///
    /// Returns an error if a store fails. Unknown ids are ignored.
    #[instrument(skip(self))]
    pub async fn delete_image(&self, image_id: MediaItemId) -> Result<(), CollectionError> {
        let Some(image) = self.images.delete(image_id).await? else {
            return Ok(());
        };
        let Some(category_id) = image.scope_id.map(ServiceCategoryId::new) else {
            return Ok(());
        };

        let store = self.categories.store();
        let Some(pointer) = store.primary_image(category_id).await? else {
            return Ok(());
        };
        if pointer != image.url {
            return Ok(());
        }

        let remaining = self.images.list(image_scope(category_id)).await?;
        let next = remaining.first().map_or("", |next| next.url.as_str());
        store.set_primary_image(category_id, next).await?;
        tracing::debug!(%category_id, primary = next, "Repointed category image");
        Ok(())
    }

    /// Create the default categories (one product each) on an empty table.
    ///
    /// Returns how many categories were created.
    ///
    /// # Errors
    ///
    /// Returns an error if a store fails.
    pub async fn seed_defaults(&self) -> Result<usize, CollectionError> {
        if self.categories.store().count(()).await? > 0 {
            return Ok(0);
        }
        for (name, description, product, product_description) in DEFAULT_CATALOGUE {
            let category = self
                .create_category(CategoryDraft {
                    name: name.to_owned(),
                    description: description.to_owned(),
                })
                .await?;
            self.create_product(
                category.id,
                ProductDraft {
                    name: product.to_owned(),
                    description: product_description.to_owned(),
                },
            )
            .await?;
        }
        tracing::info!(count = DEFAULT_CATALOGUE.len(), "Seeded service categories");
        Ok(DEFAULT_CATALOGUE.len())
    }

    async fn primary_image(&self, id: ServiceCategoryId) -> Result<String, CollectionError> {
        self.categories
            .store()
            .primary_image(id)
            .await?
            .ok_or_else(|| CollectionError::not_found(catalogue::SERVICE_CATEGORIES.name, id))
    }
}

fn validate_category(draft: CategoryDraft) -> Result<CategoryDraft, CollectionError> {
    Ok(CategoryDraft {
        name: required(&draft.name, "Category name")?,
        description: draft.description.trim().to_owned(),
    })
}

fn validate_product(draft: ProductDraft) -> Result<ProductDraft, CollectionError> {
    Ok(ProductDraft {
        name: required(&draft.name, "Product name")?,
        description: draft.description.trim().to_owned(),
    })
}

fn first<T>(saved: Vec<T>) -> Result<T, CollectionError> {
    saved
        .into_iter()
        .next()
        .ok_or_else(|| CollectionError::Validation("nothing was saved".to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::collections::memory::MemoryStore;
    use crate::uploads::tests::{image, temp_root};

    type TestCatalog<'a> = Catalog<
        'a,
        MemoryStore<ServiceCategory>,
        MemoryStore<ServiceProduct>,
        MemoryStore<MediaItem>,
    >;

    fn catalog(uploads: &UploadStore) -> TestCatalog<'_> {
        Catalog::new(MemoryStore::new(), MemoryStore::new(), MemoryStore::new(), uploads)
    }

    fn category(name: &str) -> CategoryDraft {
        CategoryDraft {
            name: name.to_owned(),
            description: String::new(),
        }
    }

    async fn pointer(catalog: &TestCatalog<'_>, id: ServiceCategoryId) -> String {
        catalog.categories.get(id).await.unwrap().image_url
    }

    #[tokio::test]
    async fn test_first_images_set_primary_pointer() {
        let uploads = UploadStore::new(temp_root());
        let catalog = catalog(&uploads);
        let feed = catalog.create_category(category("Animal Feed")).await.unwrap();

        let saved = catalog
            .add_images(feed.id, vec![image("a.png", 4), image("b.png", 4)])
            .await
            .unwrap();
        assert_eq!(pointer(&catalog, feed.id).await, saved[0].url);

        // Later additions leave an existing pointer alone
        catalog.add_images(feed.id, vec![image("c.png", 4)]).await.unwrap();
        assert_eq!(pointer(&catalog, feed.id).await, saved[0].url);
    }

    #[tokio::test]
    async fn test_deleting_primary_repoints_to_next_in_order() {
        let uploads = UploadStore::new(temp_root());
        let catalog = catalog(&uploads);
        let crops = catalog.create_category(category("Crops")).await.unwrap();
        let saved = catalog
            .add_images(
                crops.id,
                vec![image("a.png", 4), image("b.png", 4), image("c.png", 4)],
            )
            .await
            .unwrap();

        catalog.delete_image(saved[0].id).await.unwrap();
        assert_eq!(pointer(&catalog, crops.id).await, saved[1].url);

        // Deleting a non-primary image keeps the pointer
        catalog.delete_image(saved[2].id).await.unwrap();
        assert_eq!(pointer(&catalog, crops.id).await, saved[1].url);

        catalog.delete_image(saved[1].id).await.unwrap();
        assert_eq!(pointer(&catalog, crops.id).await, "");
    }

    #[tokio::test]
    async fn test_repoint_follows_sort_order_not_insertion() {
        let uploads = UploadStore::new(temp_root());
        let catalog = catalog(&uploads);
        let crops = catalog.create_category(category("Crops")).await.unwrap();
        let saved = catalog
            .add_images(
                crops.id,
                vec![image("a.png", 4), image("b.png", 4), image("c.png", 4)],
            )
            .await
            .unwrap();
        // Move "c" ahead of "b"
        catalog.images.update_order(saved[2].id, 0).await.unwrap();

        catalog.delete_image(saved[0].id).await.unwrap();
        assert_eq!(pointer(&catalog, crops.id).await, saved[2].url);
    }

    #[tokio::test]
    async fn test_set_image_makes_upload_primary() {
        let uploads = UploadStore::new(temp_root());
        let catalog = catalog(&uploads);
        let trade = catalog.create_category(category("Trade")).await.unwrap();
        catalog.add_images(trade.id, vec![image("a.png", 4)]).await.unwrap();

        let updated = catalog.set_image(trade.id, image("hero.png", 4)).await.unwrap();
        let images = catalog.list_images(trade.id).await.unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(updated.image_url, images[1].url);
    }

    #[tokio::test]
    async fn test_add_images_unknown_category() {
        let uploads = UploadStore::new(temp_root());
        let catalog = catalog(&uploads);
        let result = catalog
            .add_images(ServiceCategoryId::new(9), vec![image("a.png", 4)])
            .await;
        assert!(matches!(result, Err(CollectionError::NotFound { .. })));
        assert!(!uploads.uploads_dir().join("services").exists());
    }

    #[tokio::test]
    async fn test_category_image_limit() {
        let uploads = UploadStore::new(temp_root());
        let catalog = catalog(&uploads);
        let crops = catalog.create_category(category("Crops")).await.unwrap();
        let files: Vec<_> = (0..13).map(|i| image(&format!("{i}.png"), 2)).collect();

        let result = catalog.add_images(crops.id, files).await;
        assert!(matches!(
            result,
            Err(CollectionError::LimitExceeded { limit: 12, .. })
        ));
        assert_eq!(pointer(&catalog, crops.id).await, "");
    }

    #[tokio::test]
    async fn test_delete_category_cascades() {
        let uploads = UploadStore::new(temp_root());
        let catalog = catalog(&uploads);
        let crops = catalog.create_category(category("Crops")).await.unwrap();
        let feed = catalog.create_category(category("Feed")).await.unwrap();
        catalog
            .create_product(
                crops.id,
                ProductDraft {
                    name: "Maize".to_owned(),
                    description: String::new(),
                },
            )
            .await
            .unwrap();
        let saved = catalog.add_images(crops.id, vec![image("a.png", 4)]).await.unwrap();
        let path = uploads.resolve(&saved[0].url).unwrap();

        catalog.delete_category(crops.id).await.unwrap();

        let listings = catalog.list().await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].category.id, feed.id);
        assert!(catalog.products.store().all().is_empty());
        assert!(catalog.images.store().all().is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_validation() {
        let uploads = UploadStore::new(temp_root());
        let catalog = catalog(&uploads);
        assert!(matches!(
            catalog.create_category(category("   ")).await,
            Err(CollectionError::Validation(_))
        ));

        let crops = catalog.create_category(category(" Crops ")).await.unwrap();
        assert_eq!(crops.name, "Crops");
        let product = catalog
            .create_product(
                ServiceCategoryId::new(99),
                ProductDraft {
                    name: "Maize".to_owned(),
                    description: String::new(),
                },
            )
            .await;
        assert!(matches!(product, Err(CollectionError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_seed_defaults_once() {
        let uploads = UploadStore::new(temp_root());
        let catalog = catalog(&uploads);

        assert_eq!(catalog.seed_defaults().await.unwrap(), 4);
        assert_eq!(catalog.seed_defaults().await.unwrap(), 0);

        let listings = catalog.list().await.unwrap();
        assert_eq!(listings.len(), 4);
        assert_eq!(listings[0].category.name, "Crop Production");
        assert_eq!(listings[0].category.sort_order, 1);
        assert!(listings.iter().all(|l| l.products.len() == 1));
    }

    #[tokio::test]
    async fn test_display_image_prefers_gallery() {
        let uploads = UploadStore::new(temp_root());
        let catalog = catalog(&uploads);
        let crops = catalog.create_category(category("Crops")).await.unwrap();
        catalog
            .categories
            .store()
            .set_primary_image(crops.id, "/uploads/services/legacy.jpg")
            .await
            .unwrap();

        let listings = catalog.list().await.unwrap();
        assert_eq!(listings[0].display_image(), "/uploads/services/legacy.jpg");

        let saved = catalog.add_images(crops.id, vec![image("a.png", 4)]).await.unwrap();
        let listings = catalog.list().await.unwrap();
        assert_eq!(listings[0].display_image(), saved[0].url);
    }
}
