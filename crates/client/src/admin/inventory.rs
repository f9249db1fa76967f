//! Inventory management endpoints.

use chrono::Utc;
use maison_core::AccessToken;
use maison_core::inventory::{
    ExportFormat, InventoryAlert, InventoryItem, InventoryPage, InventoryQuery, StockAdjustment,
    StockForecast,
};
use maison_core::types::{AlertId, ProductId};
use reqwest::Method;
use tracing::{info, instrument};

use crate::{ApiClient, ApiError, Download};

impl ApiClient {
    /// List inventory records.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn list_inventory(
        &self,
        token: &AccessToken,
        query: &InventoryQuery,
    ) -> Result<InventoryPage, ApiError> {
        self.get("/api/admin/inventory", &query.to_query(), Some(token))
            .await
    }

    /// Get one inventory record with its movement history.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn get_inventory_item(
        &self,
        token: &AccessToken,
        id: ProductId,
    ) -> Result<InventoryItem, ApiError> {
        self.get(&format!("/api/admin/inventory/{id}"), &[], Some(token))
            .await
    }

    /// Submit a stock adjustment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for a zero-unit add or remove, or
    /// error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn adjust_stock(
        &self,
        token: &AccessToken,
        id: ProductId,
        adjustment: &StockAdjustment,
    ) -> Result<InventoryItem, ApiError> {
        if adjustment.is_noop() {
            return Err(ApiError::InvalidRequest(
                "adjustment quantity must be positive".to_string(),
            ));
        }
        let item: InventoryItem = self
            .post(
                &format!("/api/admin/inventory/{id}/adjust"),
                adjustment,
                Some(token),
            )
            .await?;
        info!(current_stock = item.current_stock, "Stock adjusted");
        Ok(item)
    }

    /// Get the server-computed forecast for one item.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn stock_forecast(
        &self,
        token: &AccessToken,
        id: ProductId,
    ) -> Result<StockForecast, ApiError> {
        self.get(
            &format!("/api/admin/inventory/{id}/forecast"),
            &[],
            Some(token),
        )
        .await
    }

    /// List alerts. Resolved alerts are included only when asked for.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn list_alerts(
        &self,
        token: &AccessToken,
        include_resolved: bool,
    ) -> Result<Vec<InventoryAlert>, ApiError> {
        let query = [("includeResolved", include_resolved.to_string())];
        self.get("/api/admin/inventory/alerts", &query, Some(token))
            .await
    }

    /// Mark an alert resolved.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token), fields(alert_id = %id))]
    pub async fn resolve_alert(&self, token: &AccessToken, id: AlertId) -> Result<(), ApiError> {
        self.send_empty(
            Method::POST,
            &format!("/api/admin/inventory/alerts/{id}/resolve"),
            Some(token),
        )
        .await
    }

    /// Download the full inventory as CSV or XLSX.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn export_inventory(
        &self,
        token: &AccessToken,
        format: ExportFormat,
    ) -> Result<Download, ApiError> {
        let query = [("format", format.as_str().to_string())];
        let fallback = format.file_name(Utc::now().date_naive());
        let download = self
            .download("/api/admin/inventory/export", &query, Some(token), fallback)
            .await?;
        info!(
            filename = %download.filename,
            bytes = download.bytes.len(),
            "Inventory exported"
        );
        Ok(download)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use axum::extract::{Path, Query};
    use axum::http::header;
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use maison_core::inventory::AdjustmentReason;

    use super::*;

    fn item(id: i64, stock: i64) -> serde_json::Value {
        serde_json::json!({
            "productId": id,
            "sku": format!("SKU-{id}"),
            "currentStock": stock,
            "reservedStock": 0,
            "availableStock": stock,
            "thresholds": { "low": 10, "critical": 3, "reorderPoint": 12 },
            "costPrice": "100.00",
            "sellingPrice": "400.00",
            "status": "in_stock"
        })
    }

    async fn adjust(
        Path(id): Path<i64>,
        Json(body): Json<serde_json::Value>,
    ) -> Json<serde_json::Value> {
        assert_eq!(body["type"], "add");
        let quantity = body["quantity"].as_i64().unwrap();
        Json(item(id, 20 + quantity))
    }

    async fn export(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
        let format = params.get("format").cloned().unwrap_or_default();
        (
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"stock.{format}\""),
                ),
            ],
            "sku,stock\nSKU-1,20\n",
        )
    }

    fn router() -> Router {
        Router::new()
            .route("/api/admin/inventory/{id}/adjust", post(adjust))
            .route("/api/admin/inventory/export", get(export))
    }

    #[tokio::test]
    async fn test_adjust_stock() {
        let client = crate::test_support::client_for(router()).await;
        let adjustment = StockAdjustment::Add {
            quantity: 5,
            reason: AdjustmentReason::Restock,
            note: None,
        };
        let item = client
            .adjust_stock(&AccessToken::new("op"), ProductId::new(4), &adjustment)
            .await
            .unwrap();
        assert_eq!(item.current_stock, 25);
    }

    #[tokio::test]
    async fn test_zero_adjustment_never_reaches_backend() {
        let client = crate::test_support::client_for(Router::new()).await;
        let adjustment = StockAdjustment::Remove {
            quantity: 0,
            reason: AdjustmentReason::Damaged,
            note: None,
        };
        let err = client
            .adjust_stock(&AccessToken::new("op"), ProductId::new(4), &adjustment)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_export_uses_server_filename() {
        let client = crate::test_support::client_for(router()).await;
        let download = client
            .export_inventory(&AccessToken::new("op"), ExportFormat::Csv)
            .await
            .unwrap();
        assert_eq!(download.filename, "stock.csv");
        assert_eq!(download.content_type, "text/csv");
        assert!(download.bytes.starts_with(b"sku,stock"));
    }
}
