//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Instant;

use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::db::AdminRepository;
use crate::services::auth::AuthService;
use crate::uploads::UploadStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: PgPool,
    uploads: UploadStore,
    started_at: Instant,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Uploads are stored under `config.uploads_root`.
    #[must_use]
    pub fn new(config: SiteConfig, pool: PgPool) -> Self {
        let uploads = UploadStore::new(config.uploads_root.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                uploads,
                started_at: Instant::now(),
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the upload store.
    #[must_use]
    pub fn uploads(&self) -> &UploadStore {
        &self.inner.uploads
    }

    /// Seconds since the state was created.
    #[must_use]
    pub fn uptime_secs(&self) -> f64 {
        self.inner.started_at.elapsed().as_secs_f64()
    }

    /// Auth service over the admin tables.
    #[must_use]
    pub fn auth(&self) -> AuthService<AdminRepository<'_>> {
        AuthService::new(AdminRepository::new(self.pool()))
    }
}
