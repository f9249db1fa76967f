//! Query cache for public catalog reads.
//!
//! Entries expire after the configured TTL. Concurrent lookups of the same
//! key share a single backend request.

use std::future::Future;
use std::time::Duration;

use maison_core::ProductId;
use maison_core::catalog::{ProductDetail, ProductFilter, ProductListing, ProductSummary};
use moka::future::Cache;

use crate::ApiError;

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products(ProductFilter),
    Product(ProductId),
    Related(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(ProductListing),
    Product(Box<ProductDetail>),
    Related(Vec<ProductSummary>),
}

/// TTL-bounded, request-coalescing cache.
#[derive(Clone)]
pub struct QueryCache {
    cache: Cache<CacheKey, CacheValue>,
}

impl QueryCache {
    /// Create a cache holding at most `capacity` entries for `ttl` each.
    #[must_use]
    pub fn new(ttl: Duration, capacity: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Return the cached value for `key`, or run `fetch` and cache its result.
    ///
    /// While a fetch for `key` is in flight, other callers wait for it instead
    /// of issuing their own request. Errors are not cached.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Shared`] wrapping the fetch error.
    pub async fn get_or_fetch<F>(&self, key: CacheKey, fetch: F) -> Result<CacheValue, ApiError>
    where
        F: Future<Output = Result<CacheValue, ApiError>>,
    {
        self.cache
            .try_get_with(key, fetch)
            .await
            .map_err(ApiError::Shared)
    }

    /// Drop one entry.
    pub async fn invalidate(&self, key: &CacheKey) {
        self.cache.invalidate(key).await;
    }

    /// Drop every entry.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}
