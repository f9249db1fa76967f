//! Shopping bag route handlers.
//!
//! The bag lives in the visitor's client state and is only changed through
//! [`BagAction`]s dispatched to their [`ClientStore`]. Every mutation answers
//! with the whole bag so the badge and drawer re-render from one response.

use axum::{Json, extract::State};
use maison_core::{Bag, BagAction, CartLine, ProductId, Toast};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::ClientStore;
use crate::state::AppState;

/// Bag line display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_price: String,
    pub display_name: String,
    pub image_url: Option<String>,
    pub style_code: Option<String>,
}

impl LineView {
    fn new(state: &AppState, line: &CartLine) -> Self {
        Self {
            product_id: line.product_id,
            size: line.size.clone(),
            quantity: line.quantity,
            unit_price: state.format_price(line.unit_price),
            line_price: state.format_price(line.line_total()),
            display_name: line.display_name.clone(),
            image_url: line.image_url.clone(),
            style_code: line.style_code.clone(),
        }
    }
}

/// Bag display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BagView {
    pub lines: Vec<LineView>,
    pub item_count: u64,
    pub subtotal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toast: Option<Toast>,
}

impl BagView {
    /// Render `bag` in the store currency.
    #[must_use]
    pub fn new(state: &AppState, bag: &Bag) -> Self {
        Self {
            lines: bag.lines().iter().map(|l| LineView::new(state, l)).collect(),
            item_count: bag.total_items(),
            subtotal: state.format_price(bag.total_price()),
            toast: None,
        }
    }

    fn with_toast(mut self, toast: Toast) -> Self {
        self.toast = Some(toast);
        self
    }
}

/// Add-to-bag request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRequest {
    pub product_id: ProductId,
    pub size: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// Quantity change request. Zero or less removes the line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: i64,
}

/// Line removal request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveRequest {
    pub product_id: ProductId,
    pub size: String,
}

/// Bag badge count.
#[derive(Debug, Serialize)]
pub struct CountView {
    pub count: u64,
}

/// Display the bag.
#[instrument(skip(state, store))]
pub async fn show(State(state): State<AppState>, store: ClientStore) -> Json<BagView> {
    Json(BagView::new(&state, store.bag()))
}

/// Add a product in a size to the bag.
///
/// The product is looked up so the line carries a price and name snapshot.
#[instrument(skip(state, store), fields(product_id = %request.product_id, size = %request.size))]
pub async fn add(
    State(state): State<AppState>,
    mut store: ClientStore,
    Json(request): Json<AddRequest>,
) -> Result<Json<BagView>> {
    if request.quantity == 0 {
        return Err(AppError::BadRequest(
            "quantity must be at least 1".to_string(),
        ));
    }

    let product = state.api().get_product(request.product_id).await?;
    let item = product.to_bag_item(request.size);

    store
        .dispatch(BagAction::Add {
            item,
            quantity: request.quantity,
        })
        .await?;

    let product_id = request.product_id.to_string();
    add_breadcrumb("bag", "Added to bag", Some(&[("product_id", &product_id)]));
    let toast = Toast::success(format!("{} added to your bag", product.summary.name));
    Ok(Json(BagView::new(&state, store.bag()).with_toast(toast)))
}

/// Change a line's quantity.
#[instrument(skip(state, store), fields(product_id = %request.product_id, quantity = request.quantity))]
pub async fn update(
    State(state): State<AppState>,
    mut store: ClientStore,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<BagView>> {
    store
        .dispatch(BagAction::UpdateQuantity {
            product_id: request.product_id,
            size: request.size,
            quantity: request.quantity,
        })
        .await?;

    Ok(Json(BagView::new(&state, store.bag())))
}

/// Remove a line.
#[instrument(skip(state, store), fields(product_id = %request.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    mut store: ClientStore,
    Json(request): Json<RemoveRequest>,
) -> Result<Json<BagView>> {
    store
        .dispatch(BagAction::Remove {
            product_id: request.product_id,
            size: request.size,
        })
        .await?;

    Ok(Json(BagView::new(&state, store.bag())))
}

/// Bag badge count.
pub async fn count(store: ClientStore) -> Json<CountView> {
    Json(CountView {
        count: store.bag().total_items(),
    })
}
