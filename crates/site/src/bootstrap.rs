//! First-boot setup: the bootstrap admin and default content.
//!
//! Every step is a no-op when its table already has rows, so running it on
//! each start is safe.

use thiserror::Error;

use lakeside_core::CoordinatesError;

use crate::collections::{CollectionError, OrderedCollection, OrderedStore, catalogue};
use crate::db::{
    BranchRepository, CategoryRepository, ContentRepository, MediaRepository, OfferRepository,
    ProductRepository, RepositoryError,
};
use crate::models::branch::{Branch, BranchDraft, default_branches};
use crate::models::media::MediaKind;
use crate::models::offer::{DEFAULT_OFFER_TITLES, OfferCard, OfferDraft};
use crate::services::auth::AuthError;
use crate::services::catalog::Catalog;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("admin bootstrap failed: {0}")]
    Auth(#[from] AuthError),

    #[error("seeding failed: {0}")]
    Collection(#[from] CollectionError),

    #[error("seeding failed: {0}")]
    Repository(#[from] RepositoryError),

    #[error("invalid default branch: {0}")]
    Coordinates(#[from] CoordinatesError),
}

/// Create the four offer cards on an empty table. Returns how many were made.
///
/// # Errors
///
/// Returns an error if the store fails.
pub async fn seed_offer_cards<S>(cards: &OrderedCollection<'_, S>) -> Result<usize, CollectionError>
where
    S: OrderedStore<Item = OfferCard, Draft = OfferDraft>,
{
    if cards.store().count(()).await? > 0 {
        return Ok(0);
    }
    let drafts: Vec<_> = DEFAULT_OFFER_TITLES
        .iter()
        .map(|title| OfferDraft {
            title: (*title).to_owned(),
        })
        .collect();
    let created = cards.add((), drafts).await?.len();
    tracing::info!(count = created, "Seeded offer cards");
    Ok(created)
}

/// Create the default branches on an empty table.
///
/// # Errors
///
/// Returns an error if the store fails or a default coordinate is invalid.
pub async fn seed_branches<S>(branches: &OrderedCollection<'_, S>) -> Result<usize, BootstrapError>
where
    S: OrderedStore<Item = Branch, Draft = BranchDraft>,
{
    if branches.store().count(()).await? > 0 {
        return Ok(0);
    }
    let created = branches.add((), default_branches()?).await?.len();
    tracing::info!(count = created, "Seeded branches");
    Ok(created)
}

/// Run every first-boot step against the database.
///
/// # Errors
///
/// Returns an error if a step fails, including a missing bootstrap admin
/// in production.
pub async fn run(state: &AppState) -> Result<(), BootstrapError> {
    let config = state.config();
    state
        .auth()
        .ensure_default_admin(&config.admin_bootstrap, config.is_production())
        .await?;

    let pool = state.pool();
    let uploads = state.uploads();

    seed_offer_cards(&OrderedCollection::new(
        OfferRepository::new(pool),
        &catalogue::OFFER_CARDS,
        uploads,
    ))
    .await?;

    Catalog::new(
        CategoryRepository::new(pool),
        ProductRepository::new(pool),
        MediaRepository::new(pool, MediaKind::ServiceCategory),
        uploads,
    )
    .seed_defaults()
    .await?;

    seed_branches(&OrderedCollection::new(
        BranchRepository::new(pool),
        &catalogue::BRANCHES,
        uploads,
    ))
    .await?;

    ContentRepository::new(pool).get().await?;
    Ok(())
}
