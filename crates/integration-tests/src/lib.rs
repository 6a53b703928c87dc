//! Integration tests for the Lakeside Farms site.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (no database needed)
//! cargo test -p lakeside-integration-tests
//!
//! # Tests against a running server (see `tests/site_http.rs`)
//! SITE_BASE_URL=http://localhost:3000 cargo test -p lakeside-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `content_collections` - ordering, limits and file cleanup over memory stores
//! - `admin_auth` - sessions, password resets and CSRF tokens
//! - `site_http` - HTTP flows against a live server

use std::path::PathBuf;

use axum::body::Bytes;
use lakeside_site::uploads::{UploadStore, UploadedFile};

/// Upload store rooted in a fresh temporary directory.
#[must_use]
pub fn temp_uploads() -> UploadStore {
    let root: PathBuf =
        std::env::temp_dir().join(format!("lakeside-it-{}", uuid::Uuid::new_v4()));
    UploadStore::new(root)
}

/// A small in-memory PNG upload.
#[must_use]
pub fn png(name: &str) -> UploadedFile {
    UploadedFile {
        original_name: name.to_owned(),
        content_type: "image/png".to_owned(),
        bytes: Bytes::from_static(b"\x89PNG\r\n\x1a\nlakeside"),
    }
}

/// A small in-memory MP4 upload.
#[must_use]
pub fn mp4(name: &str) -> UploadedFile {
    UploadedFile {
        original_name: name.to_owned(),
        content_type: "video/mp4".to_owned(),
        bytes: Bytes::from_static(b"\0\0\0\x18ftypmp42"),
    }
}

/// Whether the file behind a public upload URL exists on disk.
#[must_use]
pub fn stored(uploads: &UploadStore, url: &str) -> bool {
    uploads.resolve(url).is_some_and(|path| path.is_file())
}
