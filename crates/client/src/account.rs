//! Account endpoints: profile, address book and order history.
//!
//! Every call needs the signed-in user's token.

use maison_core::AccessToken;
use maison_core::account::{Address, AddressInput, OrderSummary, Profile, ProfileUpdate};
use maison_core::types::AddressId;
use tracing::instrument;

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// Get the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip_all)]
    pub async fn get_profile(&self, token: &AccessToken) -> Result<Profile, ApiError> {
        self.get("/api/user/profile", &[], Some(token)).await
    }

    /// Update profile fields.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip_all)]
    pub async fn update_profile(
        &self,
        token: &AccessToken,
        update: &ProfileUpdate,
    ) -> Result<Profile, ApiError> {
        self.patch("/api/user/profile", update, Some(token)).await
    }

    /// List saved addresses.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip_all)]
    pub async fn list_addresses(&self, token: &AccessToken) -> Result<Vec<Address>, ApiError> {
        self.get("/api/user/addresses", &[], Some(token)).await
    }

    /// Add an address.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if required fields are blank, or
    /// error if the API request fails.
    #[instrument(skip_all)]
    pub async fn create_address(
        &self,
        token: &AccessToken,
        input: &AddressInput,
    ) -> Result<Address, ApiError> {
        check_address(input)?;
        self.post("/api/user/addresses", input, Some(token)).await
    }

    /// Replace an address.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if required fields are blank, or
    /// error if the API request fails.
    #[instrument(skip(self, token, input), fields(address_id = %id))]
    pub async fn update_address(
        &self,
        token: &AccessToken,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<Address, ApiError> {
        check_address(input)?;
        self.put(&format!("/api/user/addresses/{id}"), input, Some(token))
            .await
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token), fields(address_id = %id))]
    pub async fn delete_address(&self, token: &AccessToken, id: AddressId) -> Result<(), ApiError> {
        self.delete(&format!("/api/user/addresses/{id}"), Some(token))
            .await
    }

    /// Order history, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip_all)]
    pub async fn list_orders(&self, token: &AccessToken) -> Result<Vec<OrderSummary>, ApiError> {
        self.get("/api/user/orders", &[], Some(token)).await
    }
}

fn check_address(input: &AddressInput) -> Result<(), ApiError> {
    let missing = input.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::InvalidRequest(format!(
            "missing address fields: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};

    use super::*;
    use crate::test_support::client_for;

    async fn orders(headers: HeaderMap) -> Result<Json<serde_json::Value>, StatusCode> {
        let authorized = headers
            .get("authorization")
            .is_some_and(|v| v.as_bytes() == b"Bearer good");
        if !authorized {
            return Err(StatusCode::UNAUTHORIZED);
        }
        Ok(Json(serde_json::json!([{
            "id": 501,
            "number": "M-000501",
            "placedAt": "2026-09-30T14:05:00Z",
            "status": "shipped",
            "total": "2900.00",
            "itemCount": 2
        }])))
    }

    #[tokio::test]
    async fn test_list_orders() {
        let client = client_for(Router::new().route("/api/user/orders", get(orders))).await;
        let orders = client.list_orders(&AccessToken::new("good")).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].item_count, 2);
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthorized() {
        let client = client_for(Router::new().route("/api/user/orders", get(orders))).await;
        let err = client
            .list_orders(&AccessToken::new("expired"))
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_blank_address_is_rejected_locally() {
        let client = client_for(Router::new()).await;
        let input = AddressInput {
            first_name: "Camille".to_string(),
            last_name: String::new(),
            line1: "1 Rue".to_string(),
            line2: None,
            city: "Paris".to_string(),
            region: None,
            postal_code: "75001".to_string(),
            country: "FR".to_string(),
            phone: None,
            is_default: false,
        };
        let err = client
            .create_address(&AccessToken::new("good"), &input)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(msg) if msg.contains("lastName")));
    }
}
