//! Uploaded file storage under the public static root.
//!
//! Files are written to `<root>/uploads/<subdir>/<uuid><ext>` and referenced
//! by the URL path `/uploads/<subdir>/<uuid><ext>`. Removal is best-effort:
//! the database row is the source of truth, so a missing or locked file is
//! logged and otherwise ignored.

use std::path::{Component, Path, PathBuf};

use axum::body::Bytes;
use thiserror::Error;
use uuid::Uuid;

/// Kind of media a collection accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaClass {
    Image,
    Video,
}

impl MediaClass {
    /// Whether a declared content type belongs to this class.
    #[must_use]
    pub fn accepts(self, content_type: &str) -> bool {
        let prefix = match self {
            Self::Image => "image/",
            Self::Video => "video/",
        };
        content_type.trim().to_ascii_lowercase().starts_with(prefix)
    }

    /// Extension used when the uploaded name has none.
    #[must_use]
    pub const fn default_extension(self) -> &'static str {
        match self {
            Self::Image => ".jpg",
            Self::Video => ".mp4",
        }
    }
}

/// Where and how a collection stores its uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadRule {
    /// Directory under `<root>/uploads/`.
    pub subdir: &'static str,
    /// Largest accepted file in bytes.
    pub max_bytes: usize,
    pub class: MediaClass,
}

impl UploadRule {
    #[must_use]
    pub const fn image(subdir: &'static str, max_mib: usize) -> Self {
        Self {
            subdir,
            max_bytes: max_mib * 1024 * 1024,
            class: MediaClass::Image,
        }
    }

    #[must_use]
    pub const fn video(subdir: &'static str, max_mib: usize) -> Self {
        Self {
            subdir,
            max_bytes: max_mib * 1024 * 1024,
            class: MediaClass::Video,
        }
    }
}

/// A file received from a multipart form, held in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// A file written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub filename: String,
    pub url: String,
}

/// Errors that can occur while storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Only image uploads are allowed")]
    NotAnImage,

    #[error("Only video uploads are allowed")]
    NotAVideo,

    #[error("{name} exceeds the {max_bytes} byte upload limit")]
    TooLarge { name: String, max_bytes: usize },

    #[error("upload i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Filesystem store rooted at the public static directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Create a store rooted at `root` (the directory served as `/`).
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory served under `/uploads`.
    #[must_use]
    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }

    /// Check a file against a rule without writing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type is outside the rule's class or
    /// the file is larger than the rule allows.
    pub fn validate(rule: &UploadRule, file: &UploadedFile) -> Result<(), UploadError> {
        if !rule.class.accepts(&file.content_type) {
            return Err(match rule.class {
                MediaClass::Image => UploadError::NotAnImage,
                MediaClass::Video => UploadError::NotAVideo,
            });
        }
        if file.bytes.len() > rule.max_bytes {
            return Err(UploadError::TooLarge {
                name: file.original_name.clone(),
                max_bytes: rule.max_bytes,
            });
        }
        Ok(())
    }

    /// Validate and write a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the file cannot be written.
    pub async fn save(
        &self,
        rule: UploadRule,
        file: UploadedFile,
    ) -> Result<StoredFile, UploadError> {
        Self::validate(&rule, &file)?;

        let dir = self.uploads_dir().join(rule.subdir);
        tokio::fs::create_dir_all(&dir).await?;

        let filename = format!(
            "{}{}",
            Uuid::new_v4(),
            extension_for(&file.original_name, rule.class)
        );
        let size = file.bytes.len();
        tokio::fs::write(dir.join(&filename), file.bytes).await?;

        let url = format!("/uploads/{}/{filename}", rule.subdir);
        tracing::debug!(%url, bytes = size, "Stored upload");
        Ok(StoredFile { filename, url })
    }

    /// Validate every file, then write them all.
    ///
    /// Nothing is written if any file fails validation. If a write fails
    /// part-way, files already written are removed.
    ///
    /// # Errors
    ///
    /// Returns the first validation or i/o error.
    pub async fn save_all(
        &self,
        rule: UploadRule,
        files: Vec<UploadedFile>,
    ) -> Result<Vec<StoredFile>, UploadError> {
        for file in &files {
            Self::validate(&rule, file)?;
        }

        let mut stored: Vec<StoredFile> = Vec::with_capacity(files.len());
        for file in files {
            match self.save(rule, file).await {
                Ok(saved) => stored.push(saved),
                Err(e) => {
                    let urls: Vec<String> = stored.into_iter().map(|s| s.url).collect();
                    self.remove_all(&urls).await;
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }

    /// Map a public `/uploads/...` URL to its path on disk.
    ///
    /// Returns `None` for empty URLs, URLs outside `/uploads/`, and any URL
    /// containing `..` or absolute components.
    #[must_use]
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        let relative = Path::new(url.strip_prefix('/')?);
        if !relative.starts_with("uploads") {
            return None;
        }
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }

    /// Remove the file behind `url`, ignoring failures.
    pub async fn remove(&self, url: &str) {
        if url.is_empty() {
            return;
        }
        let Some(path) = self.resolve(url) else {
            tracing::warn!(%url, "Refusing to delete file outside uploads directory");
            return;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(%url, "Deleted upload"),
            Err(e) => tracing::warn!(%url, error = %e, "Failed to delete upload"),
        }
    }

    /// Remove several files, ignoring failures.
    pub async fn remove_all<U: AsRef<str> + Sync>(&self, urls: &[U]) {
        for url in urls {
            self.remove(url.as_ref()).await;
        }
    }
}

/// `.ext` from the original filename, or the class default.
fn extension_for(original_name: &str, class: MediaClass) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map_or_else(
            || class.default_extension().to_owned(),
            |ext| format!(".{}", ext.to_ascii_lowercase()),
        )
}
