//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::PortalConfig;
use crate::services::EmailService;

/// Application state shared across all handlers.
///
/// Cheap to clone; the inner data lives behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    pool: PgPool,
    email: EmailService,
}

impl AppState {
    /// Create the shared application state.
    #[must_use]
    pub fn new(config: PortalConfig, pool: PgPool, email: EmailService) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                email,
            }),
        }
    }

    /// The loaded configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// The database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The transactional email service.
    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }
}
