//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::warn;

use crate::config::StorefrontConfig;
use crate::services::{AssistantClient, CatalogService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    catalog: CatalogService,
    assistant: Option<AssistantClient>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let catalog = CatalogService::new(pool.clone(), config.catalog_cache_ttl);
        let assistant = config
            .assistant
            .as_ref()
            .and_then(|cfg| match AssistantClient::new(cfg) {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!(error = %e, "Shopping assistant disabled");
                    None
                }
            });

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
                assistant,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the cached product catalog.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get the shopping assistant client, if one is configured.
    #[must_use]
    pub fn assistant(&self) -> Option<&AssistantClient> {
        self.inner.assistant.as_ref()
    }
}
