//! Account route handlers.
//!
//! All routes require a signed-in visitor and call the backend with their
//! token. A `401` from any of them is a forced logout. Mutations answer with
//! the re-fetched list and a success toast.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use maison_core::account::{
    Address, AddressInput, OrderSummary, Profile, ProfileUpdate, SavedItem,
};
use maison_core::{
    AccessToken, AddressId, OrderId, OrderStatus, ProductId, SavedItemId, SavedItemStatus, Toast,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireSession;
use crate::routes::products::ProductCard;
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// Profile with an optional toast.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub profile: Profile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toast: Option<Toast>,
}

/// Order history row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub number: String,
    pub placed_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: String,
    pub item_count: u32,
}

impl OrderView {
    fn new(state: &AppState, order: &OrderSummary) -> Self {
        Self {
            id: order.id,
            number: order.number.clone(),
            placed_at: order.placed_at,
            status: order.status,
            total: state.format_price(order.total),
            item_count: order.item_count,
        }
    }
}

/// Order history.
#[derive(Debug, Serialize)]
pub struct OrdersView {
    pub orders: Vec<OrderView>,
}

/// Address book with an optional toast.
#[derive(Debug, Serialize)]
pub struct AddressesView {
    pub addresses: Vec<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toast: Option<Toast>,
}

/// Wishlist entry display data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedItemView {
    pub id: SavedItemId,
    pub product: ProductCard,
    pub size: Option<String>,
    pub status: SavedItemStatus,
    pub saved_at: DateTime<Utc>,
}

impl SavedItemView {
    fn new(state: &AppState, item: &SavedItem) -> Self {
        Self {
            id: item.id,
            product: ProductCard::new(state, &item.product),
            size: item.size.clone(),
            status: item.status,
            saved_at: item.saved_at,
        }
    }
}

/// Wishlist with an optional toast.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedItemsView {
    pub items: Vec<SavedItemView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toast: Option<Toast>,
}

// =============================================================================
// Request Types
// =============================================================================

/// Save-for-later request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub size: Option<String>,
}

/// Saved item status change.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: SavedItemStatus,
}

// =============================================================================
// Profile
// =============================================================================

/// Account overview.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn profile(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
) -> Result<Json<ProfileView>> {
    let profile = state.api().get_profile(&user.token).await?;
    Ok(Json(ProfileView {
        profile,
        toast: None,
    }))
}

/// Update profile fields.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ProfileView>> {
    if update
        .display_name
        .as_deref()
        .is_some_and(|name| name.trim().is_empty())
    {
        return Err(AppError::BadRequest("display name cannot be blank".to_string()));
    }

    let profile = state.api().update_profile(&user.token, &update).await?;
    Ok(Json(ProfileView {
        profile,
        toast: Some(Toast::success("Profile updated")),
    }))
}

// =============================================================================
// Orders
// =============================================================================

/// Order history.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
) -> Result<Json<OrdersView>> {
    let orders = state.api().list_orders(&user.token).await?;
    Ok(Json(OrdersView {
        orders: orders.iter().map(|o| OrderView::new(&state, o)).collect(),
    }))
}

// =============================================================================
// Addresses
// =============================================================================

/// Address book.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn addresses(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
) -> Result<Json<AddressesView>> {
    let addresses = state.api().list_addresses(&user.token).await?;
    Ok(Json(AddressesView {
        addresses,
        toast: None,
    }))
}

/// Add an address.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_address(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
    Json(input): Json<AddressInput>,
) -> Result<Json<AddressesView>> {
    state.api().create_address(&user.token, &input).await?;
    refreshed_addresses(&state, &user.token, "Address added").await
}

/// Replace an address.
#[instrument(skip_all, fields(user_id = %user.id, address_id = %id))]
pub async fn update_address(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
    Path(id): Path<AddressId>,
    Json(input): Json<AddressInput>,
) -> Result<Json<AddressesView>> {
    state.api().update_address(&user.token, id, &input).await?;
    refreshed_addresses(&state, &user.token, "Address updated").await
}

/// Delete an address.
#[instrument(skip_all, fields(user_id = %user.id, address_id = %id))]
pub async fn delete_address(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
    Path(id): Path<AddressId>,
) -> Result<Json<AddressesView>> {
    state.api().delete_address(&user.token, id).await?;
    refreshed_addresses(&state, &user.token, "Address removed").await
}

async fn refreshed_addresses(
    state: &AppState,
    token: &AccessToken,
    message: &str,
) -> Result<Json<AddressesView>> {
    let addresses = state.api().list_addresses(token).await?;
    Ok(Json(AddressesView {
        addresses,
        toast: Some(Toast::success(message)),
    }))
}

// =============================================================================
// Saved Items
// =============================================================================

/// Wishlist.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn saved_items(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
) -> Result<Json<SavedItemsView>> {
    let items = state.api().list_saved_items(&user.token).await?;
    Ok(Json(SavedItemsView {
        items: items.iter().map(|i| SavedItemView::new(&state, i)).collect(),
        toast: None,
    }))
}

/// Save a product for later.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %request.product_id))]
pub async fn save_item(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
    Json(request): Json<SaveRequest>,
) -> Result<Json<SavedItemsView>> {
    state
        .api()
        .save_item(&user.token, request.product_id, request.size.as_deref())
        .await?;
    refreshed_saved_items(&state, &user.token, "Saved for later").await
}

/// Remove a saved item.
#[instrument(skip_all, fields(user_id = %user.id, saved_item_id = %id))]
pub async fn remove_saved_item(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
    Path(id): Path<SavedItemId>,
) -> Result<Json<SavedItemsView>> {
    state.api().remove_saved_item(&user.token, id).await?;
    refreshed_saved_items(&state, &user.token, "Removed from saved items").await
}

/// Move a saved item to another status.
#[instrument(skip_all, fields(user_id = %user.id, saved_item_id = %id))]
pub async fn set_saved_item_status(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
    Path(id): Path<SavedItemId>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<SavedItemsView>> {
    state
        .api()
        .set_saved_item_status(&user.token, id, request.status)
        .await?;
    refreshed_saved_items(&state, &user.token, "Saved item updated").await
}

async fn refreshed_saved_items(
    state: &AppState,
    token: &AccessToken,
    message: &str,
) -> Result<Json<SavedItemsView>> {
    let items = state.api().list_saved_items(token).await?;
    Ok(Json(SavedItemsView {
        items: items.iter().map(|i| SavedItemView::new(state, i)).collect(),
        toast: Some(Toast::success(message)),
    }))
}
