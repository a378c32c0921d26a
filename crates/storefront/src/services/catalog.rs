//! Cached access to the product catalog.
//!
//! The whole product list is fetched in one query and cached, and listing
//! pages, detail lookups and search suggestions are all served from it.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use souq_core::ProductId;
use souq_core::catalog::{self, Product, ProductPage, ProductQuery};

use crate::db::{ProductRepository, RepositoryError};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum CacheKey {
    AllProducts,
}

/// Read-only catalog backed by `souq.products`.
///
/// Cheap to clone; clones share one cache.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    pool: PgPool,
    cache: Cache<CacheKey, Arc<Vec<Product>>>,
}

impl CatalogService {
    /// Create a catalog whose product list is cached for `ttl`.
    #[must_use]
    pub fn new(pool: PgPool, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(16).time_to_live(ttl).build();

        Self {
            inner: Arc::new(CatalogServiceInner { pool, cache }),
        }
    }

    /// Every product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the product list has to be fetched and
    /// the query fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, RepositoryError> {
        if let Some(products) = self.inner.cache.get(&CacheKey::AllProducts).await {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let products = Arc::new(ProductRepository::new(&self.inner.pool).list_all().await?);
        debug!(count = products.len(), "Fetched product list");

        self.inner
            .cache
            .insert(CacheKey::AllProducts, Arc::clone(&products))
            .await;

        Ok(products)
    }

    /// One page of a filtered, sorted listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the product list cannot be loaded.
    pub async fn list(&self, query: &ProductQuery) -> Result<ProductPage, RepositoryError> {
        let products = self.products().await?;
        Ok(catalog::list_products(&products, query))
    }

    /// Look up a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the product list cannot be loaded.
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products().await?;
        Ok(products.iter().find(|p| &p.id == id).cloned())
    }

    /// Search-box suggestions for `text`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the product list cannot be loaded.
    pub async fn suggest(&self, text: &str) -> Result<Vec<Product>, RepositoryError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let products = self.products().await?;
        Ok(catalog::suggest(&products, text))
    }

    /// The `n` newest products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the product list cannot be loaded.
    pub async fn newest(&self, n: usize) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products().await?;
        let mut newest: Vec<Product> = products.iter().cloned().collect();
        newest.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        newest.truncate(n);
        Ok(newest)
    }

    /// Distinct category ids, sorted, for the filter dropdown.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the product list cannot be loaded.
    pub async fn categories(&self) -> Result<Vec<String>, RepositoryError> {
        let products = self.products().await?;
        let mut categories: Vec<String> = products
            .iter()
            .filter_map(|p| p.category_id.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }
}
