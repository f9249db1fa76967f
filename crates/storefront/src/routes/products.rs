//! Product route handlers.
//!
//! The listing is always the backend's answer. Each listing is also saved
//! into the visitor's catalog slice so `/products/instant` can answer search
//! keystrokes locally while the real request is in flight. Those instant
//! results are flagged `provisional`: the local match is a plain substring
//! test and can disagree with the backend's search.

use std::collections::BTreeSet;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use maison_core::catalog::ProductDetail;
use maison_core::{CatalogAction, PageWindow, ProductFilter, ProductId, ProductSummary, SortOrder};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::ClientStore;
use crate::state::AppState;

/// Product card for listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub image_url: String,
    pub alt_image_url: Option<String>,
    pub category: String,
    pub line: Option<String>,
    pub colors: Vec<String>,
}

impl ProductCard {
    /// Build a card, formatting the price in the store currency.
    #[must_use]
    pub fn new(state: &AppState, product: &ProductSummary) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: state.format_price(product.price),
            image_url: product.image_url.clone(),
            alt_image_url: product.alt_image_url.clone(),
            category: product.category.clone(),
            line: product.line.clone(),
            colors: product.colors.clone(),
        }
    }
}

/// Listing query parameters.
///
/// `colors` and `materials` are comma-separated. `all=true` lifts the page
/// limit.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    pub category: Option<String>,
    pub line: Option<String>,
    pub search: Option<String>,
    pub sort: Option<SortOrder>,
    pub colors: Option<String>,
    pub materials: Option<String>,
    #[serde(default)]
    pub all: bool,
}

impl ListingParams {
    /// The filter these parameters describe.
    #[must_use]
    pub fn into_filter(self) -> ProductFilter {
        let filter = ProductFilter {
            category: self.category,
            line: self.line,
            search: self.search,
            sort: self.sort.unwrap_or_default(),
            colors: split_list(self.colors.as_deref()),
            materials: split_list(self.materials.as_deref()),
            window: PageWindow::default(),
        };
        if self.all { filter.load_all() } else { filter }
    }
}

fn split_list(value: Option<&str>) -> BTreeSet<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Product listing view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    pub products: Vec<ProductCard>,
    pub total: u64,
    pub has_more: bool,
    pub showing_all: bool,
}

/// Display the product listing.
#[instrument(skip(state, store))]
pub async fn index(
    State(state): State<AppState>,
    mut store: ClientStore,
    Query(params): Query<ListingParams>,
) -> Result<Json<ListingView>> {
    let filter = params.into_filter();
    let listing = state.api().list_products(&filter).await?;

    let view = ListingView {
        products: listing
            .products
            .iter()
            .map(|p| ProductCard::new(&state, p))
            .collect(),
        total: listing.total,
        has_more: listing.has_more(),
        showing_all: filter.window == PageWindow::All,
    };

    store.dispatch(CatalogAction::Loaded { filter, listing }).await?;
    Ok(Json(view))
}

/// Instant search query.
#[derive(Debug, Deserialize)]
pub struct InstantParams {
    #[serde(default)]
    pub search: String,
}

/// Instant search results from the last listing.
#[derive(Debug, Serialize)]
pub struct InstantView {
    /// Always `true`: replace with the backend listing once it arrives.
    pub provisional: bool,
    pub products: Vec<ProductCard>,
}

/// Filter the visitor's last listing locally.
#[instrument(skip(state, store))]
pub async fn instant(
    State(state): State<AppState>,
    store: ClientStore,
    Query(params): Query<InstantParams>,
) -> Json<InstantView> {
    let products = store
        .catalog()
        .instant_results(&params.search)
        .iter()
        .map(|p| ProductCard::new(&state, p))
        .collect();
    Json(InstantView {
        provisional: true,
        products,
    })
}

/// Product detail view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub card: ProductCard,
    pub description: String,
    pub sizes: Vec<String>,
    pub images: Vec<String>,
    pub details: Vec<String>,
    pub materials: Vec<String>,
    pub style_code: Option<String>,
}

impl ProductView {
    fn new(state: &AppState, product: &ProductDetail) -> Self {
        Self {
            card: ProductCard::new(state, &product.summary),
            description: product.description.clone(),
            sizes: product.sizes.clone(),
            images: product.images.clone(),
            details: product.details.clone(),
            materials: product.summary.materials.clone(),
            style_code: product
                .style_code
                .clone()
                .or_else(|| product.summary.sku.clone()),
        }
    }
}

/// Product page: the product and its related products.
#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub product: ProductView,
    pub related: Vec<ProductCard>,
}

/// Display a product.
#[instrument(skip(state), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductPage>> {
    let (product, related) = tokio::try_join!(
        state.api().get_product(id),
        state.api().related_products(id)
    )?;

    Ok(Json(ProductPage {
        product: ProductView::new(&state, &product),
        related: related.iter().map(|p| ProductCard::new(&state, p)).collect(),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_params_into_filter() {
        let params = ListingParams {
            category: Some("bags".to_string()),
            sort: Some(SortOrder::PriceDesc),
            colors: Some("Black, ivory,,".to_string()),
            ..ListingParams::default()
        };
        let filter = params.into_filter();
        assert_eq!(filter.category.as_deref(), Some("bags"));
        assert_eq!(filter.sort, SortOrder::PriceDesc);
        assert_eq!(
            filter.colors.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["black", "ivory"]
        );
        assert_eq!(filter.window, PageWindow::default());
    }

    #[test]
    fn test_all_lifts_page_limit() {
        let params = ListingParams {
            all: true,
            ..ListingParams::default()
        };
        assert_eq!(params.into_filter().window, PageWindow::All);
    }
}
