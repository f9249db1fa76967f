//! Home page route handler.

use axum::{Json, extract::State};
use maison_core::{PageWindow, ProductFilter, SortOrder};
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::ClientStore;
use crate::routes::auth::UserView;
use crate::routes::products::ProductCard;
use crate::state::AppState;

/// Number of featured products on the home page.
const FEATURED_COUNT: u32 = 4;

/// Home page data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub featured: Vec<ProductCard>,
    pub new_arrivals: Vec<ProductCard>,
    pub user: Option<UserView>,
    pub bag_count: u64,
}

/// Display the home page.
#[instrument(skip(state, store))]
pub async fn home(State(state): State<AppState>, store: ClientStore) -> Result<Json<HomeView>> {
    let featured = ProductFilter {
        sort: SortOrder::Featured,
        window: PageWindow::Limited(FEATURED_COUNT),
        ..ProductFilter::default()
    };
    let newest = ProductFilter {
        sort: SortOrder::Newest,
        ..featured.clone()
    };

    let (featured, newest) = tokio::try_join!(
        state.api().list_products(&featured),
        state.api().list_products(&newest)
    )?;

    Ok(Json(HomeView {
        featured: featured
            .products
            .iter()
            .map(|p| ProductCard::new(&state, p))
            .collect(),
        new_arrivals: newest
            .products
            .iter()
            .map(|p| ProductCard::new(&state, p))
            .collect(),
        user: store.user().map(UserView::from),
        bag_count: store.bag().total_items(),
    }))
}
