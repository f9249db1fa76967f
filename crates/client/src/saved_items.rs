//! Saved items (wishlist) endpoints.

use maison_core::account::SavedItem;
use maison_core::types::{ProductId, SavedItemId, SavedItemStatus};
use maison_core::AccessToken;
use serde::Serialize;
use tracing::instrument;

use crate::{ApiClient, ApiError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveRequest<'a> {
    product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct StatusRequest {
    status: SavedItemStatus,
}

impl ApiClient {
    /// List the user's saved items.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip_all)]
    pub async fn list_saved_items(&self, token: &AccessToken) -> Result<Vec<SavedItem>, ApiError> {
        self.get("/api/saved-items", &[], Some(token)).await
    }

    /// Save a product, optionally in a size.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn save_item(
        &self,
        token: &AccessToken,
        product_id: ProductId,
        size: Option<&str>,
    ) -> Result<SavedItem, ApiError> {
        let body = SaveRequest { product_id, size };
        self.post("/api/saved-items", &body, Some(token)).await
    }

    /// Remove a saved item.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token), fields(saved_item_id = %id))]
    pub async fn remove_saved_item(&self, token: &AccessToken, id: SavedItemId) -> Result<(), ApiError> {
        self.delete(&format!("/api/saved-items/{id}"), Some(token)).await
    }

    /// Move a saved item to another status.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token), fields(saved_item_id = %id))]
    pub async fn set_saved_item_status(
        &self,
        token: &AccessToken,
        id: SavedItemId,
        status: SavedItemStatus,
    ) -> Result<SavedItem, ApiError> {
        self.patch(
            &format!("/api/saved-items/{id}/status"),
            &StatusRequest { status },
            Some(token),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::extract::Path;
    use axum::routing::patch;
    use axum::{Json, Router};

    use super::*;
    use crate::test_support::client_for;

    async fn set_status(
        Path(id): Path<i64>,
        Json(body): Json<serde_json::Value>,
    ) -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "id": id,
            "product": {
                "id": 3,
                "name": "Silk Scarf",
                "price": "420.00",
                "imageUrl": "/img/3.jpg",
                "category": "accessories"
            },
            "status": body["status"],
            "savedAt": "2026-08-01T10:00:00Z"
        }))
    }

    #[tokio::test]
    async fn test_status_patch_sends_snake_case() {
        let client =
            client_for(Router::new().route("/api/saved-items/{id}/status", patch(set_status))).await;
        let item = client
            .set_saved_item_status(
                &AccessToken::new("t"),
                SavedItemId::new(12),
                SavedItemStatus::Archived,
            )
            .await
            .unwrap();
        assert_eq!(item.id, SavedItemId::new(12));
        assert_eq!(item.status, SavedItemStatus::Archived);
    }
}
