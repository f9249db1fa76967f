//! Checkout handoff.
//!
//! The bag is posted to the backend, which opens a session with the payment
//! processor and answers with the URL to send the customer to.

use maison_core::bag::Bag;
use maison_core::types::ProductId;
use maison_core::AccessToken;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{ApiClient, ApiError};

/// A payment session opened by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    #[serde(alias = "url")]
    pub redirect_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutLine<'a> {
    product_id: ProductId,
    size: &'a str,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct CheckoutRequest<'a> {
    lines: Vec<CheckoutLine<'a>>,
}

impl ApiClient {
    /// Start checkout for `bag`. Guests pass no token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for an empty bag, or error if the
    /// API request fails.
    #[instrument(skip_all, fields(lines = bag.lines().len(), items = bag.total_items()))]
    pub async fn start_checkout(
        &self,
        bag: &Bag,
        token: Option<&AccessToken>,
    ) -> Result<CheckoutSession, ApiError> {
        if bag.is_empty() {
            return Err(ApiError::InvalidRequest("bag is empty".to_string()));
        }
        let body = CheckoutRequest {
            lines: bag
                .lines()
                .iter()
                .map(|line| CheckoutLine {
                    product_id: line.product_id,
                    size: &line.size,
                    quantity: line.quantity,
                })
                .collect(),
        };
        let session: CheckoutSession = self.post("/api/checkout", &body, token).await?;
        info!("Checkout session opened");
        Ok(session)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::routing::post;
    use axum::{Json, Router};
    use maison_core::bag::{BagAction, BagItem};
    use rust_decimal::Decimal;

    use super::*;
    use crate::test_support::client_for;

    async fn checkout(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
        assert_eq!(body["lines"][0]["productId"], 1);
        assert_eq!(body["lines"][0]["quantity"], 2);
        Json(serde_json::json!({ "url": "https://pay.example/session/abc" }))
    }

    #[tokio::test]
    async fn test_checkout_posts_lines() {
        let client = client_for(Router::new().route("/api/checkout", post(checkout))).await;
        let mut bag = Bag::default();
        bag.apply(BagAction::Add {
            item: BagItem {
                product_id: ProductId::new(1),
                size: "M".to_string(),
                unit_price: Decimal::from(100),
                display_name: "Tee".to_string(),
                image_url: None,
                style_code: None,
            },
            quantity: 2,
        });
        let session = client.start_checkout(&bag, None).await.unwrap();
        assert_eq!(session.redirect_url, "https://pay.example/session/abc");
    }

    #[tokio::test]
    async fn test_empty_bag_is_rejected() {
        let client = client_for(Router::new()).await;
        let err = client.start_checkout(&Bag::default(), None).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }
}
