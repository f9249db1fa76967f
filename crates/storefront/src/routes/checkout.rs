//! Checkout handoff.
//!
//! Payment is the processor's job. The storefront posts the bag to the
//! backend, receives the processor's hosted checkout URL, empties the bag
//! and tells the shell where to go.

use axum::{Json, extract::State};
use maison_core::BagAction;
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::{AppError, Result};
use crate::middleware::ClientStore;
use crate::state::AppState;

/// Where to send the visitor to pay.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub redirect: String,
}

/// Hand the bag off to the payment processor.
///
/// Guests may check out; a signed-in visitor's token is forwarded so the
/// order lands in their history.
#[instrument(skip(state, store))]
pub async fn start(
    State(state): State<AppState>,
    mut store: ClientStore,
) -> Result<Json<CheckoutView>> {
    if store.bag().is_empty() {
        return Err(AppError::BadRequest("bag is empty".to_string()));
    }

    let token = store.user().map(|user| user.token.clone());
    let checkout = state
        .api()
        .start_checkout(store.bag(), token.as_ref())
        .await?;

    let items = store.bag().total_items();
    store.dispatch(BagAction::Clear).await?;
    info!(items, "Checkout started");

    Ok(Json(CheckoutView {
        redirect: checkout.redirect_url,
    }))
}
