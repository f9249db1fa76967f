//! Catalog endpoints.
//!
//! These are public and go through the [`QueryCache`](crate::QueryCache).

use maison_core::ProductId;
use maison_core::catalog::{ProductDetail, ProductFilter, ProductListing, ProductSummary};
use tracing::{debug, instrument};

use crate::cache::{CacheKey, CacheValue};
use crate::{ApiClient, ApiError};

impl ApiClient {
    /// List products matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: &ProductFilter) -> Result<ProductListing, ApiError> {
        let key = CacheKey::Products(filter.clone());
        let fetch = async {
            debug!("Cache miss for product listing");
            let listing: ProductListing = self.get("/api/products", &filter.to_query(), None).await?;
            Ok(CacheValue::Products(listing))
        };

        match self.cache().get_or_fetch(key, fetch).await? {
            CacheValue::Products(listing) => Ok(listing),
            other => Err(unexpected(&other)),
        }
    }

    /// Get one product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown ids, or error if the API
    /// request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<ProductDetail, ApiError> {
        let fetch = async {
            let product: ProductDetail = self.get(&format!("/api/products/{id}"), &[], None).await?;
            Ok(CacheValue::Product(Box::new(product)))
        };

        match self.cache().get_or_fetch(CacheKey::Product(id), fetch).await? {
            CacheValue::Product(product) => Ok(*product),
            other => Err(unexpected(&other)),
        }
    }

    /// Products the backend recommends alongside `id`.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn related_products(&self, id: ProductId) -> Result<Vec<ProductSummary>, ApiError> {
        let fetch = async {
            let products: Vec<ProductSummary> = self
                .get(&format!("/api/products/{id}/related"), &[], None)
                .await?;
            Ok(CacheValue::Related(products))
        };

        match self.cache().get_or_fetch(CacheKey::Related(id), fetch).await? {
            CacheValue::Related(products) => Ok(products),
            other => Err(unexpected(&other)),
        }
    }
}

fn unexpected(value: &CacheValue) -> ApiError {
    ApiError::Parse(format!("cache returned mismatched entry: {value:?}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::extract::{Path, Query, State};
    use axum::routing::get;
    use axum::{Json, Router};
    use maison_core::catalog::{PageWindow, SortOrder};

    use super::*;
    use crate::test_support::client_for;

    fn product(id: i64, name: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": name,
            "price": "1450.00",
            "imageUrl": format!("/img/{id}.jpg"),
            "category": "bags",
            "colors": ["black"],
            "materials": ["leather"]
        })
    }

    async fn list(
        State(hits): State<Arc<AtomicUsize>>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<serde_json::Value> {
        hits.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        let limit = params.get("limit").cloned().unwrap_or_default();
        Json(serde_json::json!({
            "products": [product(1, "Tote"), product(2, &format!("limit={limit}"))],
            "total": 30
        }))
    }

    async fn detail(Path(id): Path<i64>) -> Json<serde_json::Value> {
        let mut value = product(id, "Tote");
        value["description"] = "Calfskin tote.".into();
        value["sizes"] = serde_json::json!(["S", "M"]);
        Json(value)
    }

    fn router(hits: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route("/api/products", get(list))
            .route("/api/products/{id}", get(detail))
            .with_state(hits)
    }

    #[tokio::test]
    async fn test_concurrent_identical_listings_are_coalesced() {
        let hits = Arc::new(AtomicUsize::new(0));
        let client = client_for(router(Arc::clone(&hits))).await;
        let filter = ProductFilter {
            category: Some("bags".to_string()),
            sort: SortOrder::PriceAsc,
            ..ProductFilter::default()
        };

        let (a, b) = tokio::join!(client.list_products(&filter), client.list_products(&filter));
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_all_is_a_distinct_request() {
        let hits = Arc::new(AtomicUsize::new(0));
        let client = client_for(router(Arc::clone(&hits))).await;

        let first = client.list_products(&ProductFilter::default()).await.unwrap();
        assert_eq!(first.products[1].name, "limit=12");
        assert!(first.has_more());

        let all = ProductFilter::default().load_all();
        assert_eq!(all.window, PageWindow::All);
        let listing = client.list_products(&all).await.unwrap();
        assert_eq!(listing.products[1].name, "limit=");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_get_product() {
        let client = client_for(router(Arc::new(AtomicUsize::new(0)))).await;
        let product = client.get_product(ProductId::new(5)).await.unwrap();
        assert_eq!(product.summary.id, ProductId::new(5));
        assert_eq!(product.sizes, vec!["S", "M"]);
    }
}
