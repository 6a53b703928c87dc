//! Business logic services for the site.
//!
//! # Services
//!
//! - `auth` - Admin login, sessions, bootstrap admin, password resets
//! - `catalog` - Service categories, products and the primary image pointer
//! - `gallery` - Hero images with expiry and the single greenhouse video
//! - `news` - Articles, covers and captioned article images
//! - `pages` - Read-only view models for the public pages

pub mod auth;
pub mod catalog;
pub mod gallery;
pub mod news;
pub mod pages;

use crate::collections::CollectionError;

/// Trimmed `value`, or a validation error naming `what`.
pub(crate) fn required(value: &str, what: &str) -> Result<String, CollectionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CollectionError::Validation(format!("{what} is required")));
    }
    Ok(trimmed.to_owned())
}
