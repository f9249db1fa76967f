//! Product catalog types and the listing filter pipeline.
//!
//! Filtering is the backend's job: [`ProductFilter::to_query`] turns the
//! criteria into query parameters for the products endpoint. While a request
//! is in flight the storefront can answer instantly from the last listing
//! with [`local_filter`], which only does a case-insensitive substring match
//! on name and SKU.
//!
//! # Known limitation
//!
//! The local match and the backend's search are different algorithms and can
//! disagree. Local results are provisional and are never used in place of the
//! backend's answer.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::bag::BagItem;
use crate::types::ProductId;

/// Page size of the initial listing request.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// A product as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image_url: String,
    #[serde(default)]
    pub alt_image_url: Option<String>,
    pub category: String,
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub sku: Option<String>,
}

/// A product with everything the detail page needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub summary: ProductSummary,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default)]
    pub style_code: Option<String>,
}

impl ProductDetail {
    /// Snapshot this product in `size` for the bag.
    ///
    /// The size is taken as given; it is not checked against [`Self::sizes`].
    #[must_use]
    pub fn to_bag_item(&self, size: impl Into<String>) -> BagItem {
        BagItem {
            product_id: self.summary.id,
            size: size.into(),
            unit_price: self.summary.price,
            display_name: self.summary.name.clone(),
            image_url: Some(self.summary.image_url.clone()),
            style_code: self.style_code.clone().or_else(|| self.summary.sku.clone()),
        }
    }
}

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Featured,
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

impl SortOrder {
    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::Newest => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Name => "name",
        }
    }
}

/// How many products to request.
///
/// Switching from `Limited` to `All` re-requests the whole set and replaces
/// the listing; there is no incremental paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageWindow {
    Limited(u32),
    All,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::Limited(DEFAULT_PAGE_SIZE)
    }
}

/// Listing filter criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
    #[serde(default)]
    pub colors: BTreeSet<String>,
    #[serde(default)]
    pub materials: BTreeSet<String>,
    #[serde(default)]
    pub window: PageWindow,
}

impl ProductFilter {
    /// The same criteria with the page limit removed.
    #[must_use]
    pub fn load_all(self) -> Self {
        Self {
            window: PageWindow::All,
            ..self
        }
    }

    /// Trimmed search term, if any.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        non_blank(self.search.as_deref())
    }

    /// Query parameters for the backend products endpoint.
    ///
    /// Blank values are omitted. Colors and materials are comma-joined in
    /// sorted order so equal filters produce equal queries.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(category) = non_blank(self.category.as_deref()) {
            query.push(("category", category.to_string()));
        }
        if let Some(line) = non_blank(self.line.as_deref()) {
            query.push(("line", line.to_string()));
        }
        if let Some(search) = self.search_term() {
            query.push(("search", search.to_string()));
        }
        query.push(("sort", self.sort.as_str().to_string()));
        if !self.colors.is_empty() {
            query.push(("colors", join(&self.colors)));
        }
        if !self.materials.is_empty() {
            query.push(("materials", join(&self.materials)));
        }
        if let PageWindow::Limited(limit) = self.window {
            query.push(("limit", limit.to_string()));
        }
        query
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn join(values: &BTreeSet<String>) -> String {
    values.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}

/// One response from the products endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListing {
    pub products: Vec<ProductSummary>,
    /// Number of products matching the filter, regardless of the window.
    pub total: u64,
}

impl ProductListing {
    /// Whether a "load all" request would return more products.
    #[must_use]
    pub fn has_more(&self) -> bool {
        (self.products.len() as u64) < self.total
    }
}

/// Case-insensitive substring match on product name and SKU.
///
/// A blank search returns every product.
#[must_use]
pub fn local_filter<'a>(products: &'a [ProductSummary], search: &str) -> Vec<&'a ProductSummary> {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return products.iter().collect();
    }
    products
        .iter()
        .filter(|product| {
            product.name.to_lowercase().contains(&needle)
                || product
                    .sku
                    .as_deref()
                    .is_some_and(|sku| sku.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Catalog slice of the client state: the last listing and its filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCache {
    #[serde(default)]
    pub filter: Option<ProductFilter>,
    #[serde(default)]
    pub listing: Option<ProductListing>,
}

impl CatalogCache {
    /// Instant results for `search` from the cached listing.
    #[must_use]
    pub fn instant_results(&self, search: &str) -> Vec<ProductSummary> {
        self.listing.as_ref().map_or_else(Vec::new, |listing| {
            local_filter(&listing.products, search)
                .into_iter()
                .cloned()
                .collect()
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str, sku: Option<&str>) -> ProductSummary {
        ProductSummary {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Decimal::from(1200),
            image_url: format!("/img/{id}.jpg"),
            alt_image_url: None,
            category: "bags".to_string(),
            line: Some("Heritage".to_string()),
            colors: vec!["black".to_string()],
            materials: vec!["leather".to_string()],
            sku: sku.map(str::to_string),
        }
    }

    #[test]
    fn test_default_filter_requests_first_page() {
        let query = ProductFilter::default().to_query();
        assert_eq!(
            query,
            vec![("sort", "featured".to_string()), ("limit", "12".to_string())]
        );
    }

    #[test]
    fn test_full_filter_query() {
        let filter = ProductFilter {
            category: Some("bags".to_string()),
            line: Some("Heritage".to_string()),
            search: Some("  tote ".to_string()),
            sort: SortOrder::PriceDesc,
            colors: ["noir".to_string(), "camel".to_string()].into_iter().collect(),
            materials: ["calfskin".to_string()].into_iter().collect(),
            window: PageWindow::Limited(12),
        };
        let query = filter.to_query();
        assert_eq!(
            query,
            vec![
                ("category", "bags".to_string()),
                ("line", "Heritage".to_string()),
                ("search", "tote".to_string()),
                ("sort", "price_desc".to_string()),
                ("colors", "camel,noir".to_string()),
                ("materials", "calfskin".to_string()),
                ("limit", "12".to_string()),
            ]
        );
    }

    #[test]
    fn test_blank_values_are_omitted() {
        let filter = ProductFilter {
            category: Some("   ".to_string()),
            search: Some(String::new()),
            ..ProductFilter::default()
        };
        assert!(filter.to_query().iter().all(|(k, _)| *k != "category" && *k != "search"));
    }

    #[test]
    fn test_load_all_drops_limit_and_keeps_criteria() {
        let filter = ProductFilter {
            category: Some("shoes".to_string()),
            ..ProductFilter::default()
        }
        .load_all();
        assert_eq!(filter.window, PageWindow::All);
        let query = filter.to_query();
        assert!(query.iter().all(|(k, _)| *k != "limit"));
        assert!(query.contains(&("category", "shoes".to_string())));
    }

    #[test]
    fn test_has_more() {
        let listing = ProductListing {
            products: vec![product(1, "Tote", None)],
            total: 30,
        };
        assert!(listing.has_more());
        let listing = ProductListing {
            products: vec![product(1, "Tote", None)],
            total: 1,
        };
        assert!(!listing.has_more());
    }

    #[test]
    fn test_local_filter_matches_name_and_sku_case_insensitively() {
        let products = vec![
            product(1, "Heritage Tote", Some("HT-001")),
            product(2, "Evening Clutch", Some("EC-044")),
            product(3, "Silk Scarf", None),
        ];
        let by_name: Vec<_> = local_filter(&products, "TOTE").iter().map(|p| p.id).collect();
        assert_eq!(by_name, vec![ProductId::new(1)]);

        let by_sku: Vec<_> = local_filter(&products, "ec-0").iter().map(|p| p.id).collect();
        assert_eq!(by_sku, vec![ProductId::new(2)]);

        assert_eq!(local_filter(&products, "  ").len(), 3);
        assert!(local_filter(&products, "leather").is_empty());
    }

    #[test]
    fn test_local_filter_ignores_other_fields() {
        // Category and materials are server-side criteria only.
        let products = vec![product(1, "Tote", None)];
        assert!(local_filter(&products, "bags").is_empty());
    }

    #[test]
    fn test_catalog_cache_instant_results() {
        let cache = CatalogCache {
            filter: Some(ProductFilter::default()),
            listing: Some(ProductListing {
                products: vec![product(1, "Heritage Tote", None), product(2, "Clutch", None)],
                total: 2,
            }),
        };
        let results = cache.instant_results("clu");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Clutch");
        assert!(CatalogCache::default().instant_results("x").is_empty());
    }

    #[test]
    fn test_detail_to_bag_item() {
        let detail = ProductDetail {
            summary: product(4, "Heritage Tote", Some("HT-004")),
            description: String::new(),
            sizes: vec!["One Size".to_string()],
            images: vec![],
            details: vec![],
            style_code: None,
        };
        let item = detail.to_bag_item("One Size");
        assert_eq!(item.product_id, ProductId::new(4));
        assert_eq!(item.unit_price, Decimal::from(1200));
        assert_eq!(item.style_code.as_deref(), Some("HT-004"));
    }

    #[test]
    fn test_detail_deserializes_flattened() {
        let json = serde_json::json!({
            "id": 9,
            "name": "Cashmere Coat",
            "price": "2450.00",
            "imageUrl": "/img/9.jpg",
            "category": "outerwear",
            "sizes": ["S", "M"],
            "description": "Double-faced cashmere."
        });
        let detail: ProductDetail = serde_json::from_value(json).unwrap();
        assert_eq!(detail.summary.name, "Cashmere Coat");
        assert_eq!(detail.sizes, vec!["S", "M"]);
        assert!(detail.summary.colors.is_empty());
    }
}
