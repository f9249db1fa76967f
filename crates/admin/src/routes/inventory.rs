//! Inventory management route handlers.
//!
//! Stock levels, statuses, alerts and forecasts are computed by the backend;
//! these handlers only read them and forward adjustments. Every mutation is a
//! single backend call followed by a re-fetch of what the operator is looking
//! at. The success toast follows the mutation; a failed re-fetch only leaves
//! the view empty.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use maison_core::inventory::{
    ExportFormat, InventoryAlert, InventoryItem, InventoryQuery, StockAdjustment, StockForecast,
    StockMovement, StockThresholds,
};
use maison_core::{AccessToken, AlertId, AlertSeverity, ProductId, StockStatus, Toast};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::routes::after_mutation;
use crate::state::AppState;

/// Default page size for the inventory table.
const DEFAULT_PER_PAGE: u32 = 50;

/// Largest page the table asks for.
const MAX_PER_PAGE: u32 = 200;

// =============================================================================
// Request Types
// =============================================================================

/// Query parameters for the inventory table.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryParams {
    pub search: Option<String>,
    pub status: Option<StockStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl InventoryParams {
    fn into_query(self) -> InventoryQuery {
        InventoryQuery {
            search: self.search,
            status: self.status,
            page: Some(self.page.unwrap_or(1).max(1)),
            per_page: Some(
                self.per_page
                    .unwrap_or(DEFAULT_PER_PAGE)
                    .clamp(1, MAX_PER_PAGE),
            ),
        }
    }
}

/// Query parameters for the alert list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertParams {
    #[serde(default)]
    pub include_resolved: bool,
}

/// Query parameters for an export.
#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    #[serde(default)]
    pub format: ExportFormat,
}

// =============================================================================
// Views
// =============================================================================

/// Inventory table row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRow {
    pub product_id: ProductId,
    pub sku: String,
    pub product_name: Option<String>,
    pub current_stock: i64,
    pub reserved_stock: i64,
    pub available_stock: i64,
    pub status: StockStatus,
    pub cost_price: String,
    pub selling_price: String,
}

impl InventoryRow {
    fn new(state: &AppState, item: &InventoryItem) -> Self {
        Self {
            product_id: item.product_id,
            sku: item.sku.clone(),
            product_name: item.product_name.clone(),
            current_stock: item.current_stock,
            reserved_stock: item.reserved_stock,
            available_stock: item.available_stock,
            status: item.status,
            cost_price: state.format_price(item.cost_price),
            selling_price: state.format_price(item.selling_price),
        }
    }
}

/// Inventory table page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryListView {
    pub items: Vec<InventoryRow>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

/// One inventory record with thresholds and movement history.
#[derive(Debug, Serialize)]
pub struct InventoryDetailView {
    pub item: InventoryRow,
    pub thresholds: StockThresholds,
    pub movements: Vec<StockMovement>,
}

impl InventoryDetailView {
    fn new(state: &AppState, item: InventoryItem) -> Self {
        Self {
            item: InventoryRow::new(state, &item),
            thresholds: item.thresholds,
            movements: item.movements,
        }
    }
}

/// Answer to a stock adjustment. The record is left out when it could not be
/// re-read.
#[derive(Debug, Serialize)]
pub struct AdjustedView {
    #[serde(flatten)]
    pub record: Option<InventoryDetailView>,
    pub toast: Toast,
}

/// Alert row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertView {
    pub id: AlertId,
    pub product_id: ProductId,
    pub sku: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub resolved: bool,
}

impl From<InventoryAlert> for AlertView {
    fn from(alert: InventoryAlert) -> Self {
        Self {
            resolved: alert.is_resolved(),
            id: alert.id,
            product_id: alert.product_id,
            sku: alert.sku,
            severity: alert.severity,
            message: alert.message,
            created_at: alert.created_at,
        }
    }
}

/// Alert list with an optional toast.
#[derive(Debug, Serialize)]
pub struct AlertsView {
    pub alerts: Vec<AlertView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toast: Option<Toast>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Inventory table.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(params): Query<InventoryParams>,
) -> Result<Json<InventoryListView>> {
    let query = params.into_query();
    let page = state.api().list_inventory(&admin.token, &query).await?;

    Ok(Json(InventoryListView {
        items: page
            .items
            .iter()
            .map(|item| InventoryRow::new(&state, item))
            .collect(),
        total: page.total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(DEFAULT_PER_PAGE),
    }))
}

/// Inventory record detail.
#[instrument(skip_all, fields(admin_id = %admin.id, product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<ProductId>,
) -> Result<Json<InventoryDetailView>> {
    let item = fetch_item(&state, &admin.token, id).await?;
    Ok(Json(InventoryDetailView::new(&state, item)))
}

/// Submit a stock adjustment, then re-fetch the record.
#[instrument(skip_all, fields(admin_id = %admin.id, product_id = %id))]
pub async fn adjust(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<ProductId>,
    Json(adjustment): Json<StockAdjustment>,
) -> Result<Json<AdjustedView>> {
    if adjustment.is_noop() {
        return Err(AppError::BadRequest(
            "adjustment quantity must be positive".to_string(),
        ));
    }

    state.api().adjust_stock(&admin.token, id, &adjustment).await?;
    info!(quantity = adjustment.quantity(), "Stock adjustment submitted");

    let item = after_mutation(
        "inventory record",
        state.api().get_inventory_item(&admin.token, id).await,
    );
    Ok(Json(AdjustedView {
        record: item.map(|item| InventoryDetailView::new(&state, item)),
        toast: Toast::success("Stock updated"),
    }))
}

/// Server-computed forecast for one record.
#[instrument(skip_all, fields(admin_id = %admin.id, product_id = %id))]
pub async fn forecast(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<ProductId>,
) -> Result<Json<StockForecast>> {
    let forecast = state.api().stock_forecast(&admin.token, id).await?;
    Ok(Json(forecast))
}

/// Alert list. Open alerts only unless `includeResolved=true`.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn alerts(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(params): Query<AlertParams>,
) -> Result<Json<AlertsView>> {
    let alerts = state
        .api()
        .list_alerts(&admin.token, params.include_resolved)
        .await?;
    Ok(Json(AlertsView {
        alerts: alerts.into_iter().map(AlertView::from).collect(),
        toast: None,
    }))
}

/// Resolve an alert, then re-fetch the open alerts.
#[instrument(skip_all, fields(admin_id = %admin.id, alert_id = %id))]
pub async fn resolve_alert(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<AlertId>,
) -> Result<Json<AlertsView>> {
    state.api().resolve_alert(&admin.token, id).await?;
    info!("Alert resolved");

    let alerts = after_mutation("alerts", state.api().list_alerts(&admin.token, false).await)
        .unwrap_or_default();
    Ok(Json(AlertsView {
        alerts: alerts.into_iter().map(AlertView::from).collect(),
        toast: Some(Toast::success("Alert resolved")),
    }))
}

/// Download the inventory as a file.
#[instrument(skip_all, fields(admin_id = %admin.id, format = params.format.as_str()))]
pub async fn export(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(params): Query<ExportParams>,
) -> Result<Response> {
    let download = state
        .api()
        .export_inventory(&admin.token, params.format)
        .await?;

    let content_type = if download.content_type.is_empty() {
        params.format.mime_type().to_string()
    } else {
        download.content_type
    };
    let disposition = attachment_header(&download.filename);

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response())
}

// =============================================================================
// Helpers
// =============================================================================

async fn fetch_item(state: &AppState, token: &AccessToken, id: ProductId) -> Result<InventoryItem> {
    state
        .api()
        .get_inventory_item(token, id)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                AppError::NotFound(format!("inventory record {id}"))
            } else {
                AppError::Api(e)
            }
        })
}

/// `Content-Disposition` value that makes the browser save the file.
///
/// Quotes and control characters are dropped from the file name so the
/// header value stays valid.
fn attachment_header(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    format!("attachment; filename=\"{safe}\"")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_params_clamp_paging() {
        let query = InventoryParams {
            page: Some(0),
            per_page: Some(10_000),
            ..InventoryParams::default()
        }
        .into_query();
        assert_eq!(query.page, Some(1));
        assert_eq!(query.per_page, Some(MAX_PER_PAGE));

        let query = InventoryParams::default().into_query();
        assert_eq!(query.per_page, Some(DEFAULT_PER_PAGE));
    }

    #[test]
    fn test_attachment_header_strips_quotes() {
        assert_eq!(
            attachment_header("inventory-2026-10-19.csv"),
            "attachment; filename=\"inventory-2026-10-19.csv\""
        );
        assert_eq!(
            attachment_header("evil\"\r\nname.csv"),
            "attachment; filename=\"evilname.csv\""
        );
    }

    #[test]
    fn test_adjusted_view_without_record_keeps_toast() {
        let view = AdjustedView {
            record: None,
            toast: Toast::success("Stock updated"),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["toast"]["message"], "Stock updated");
        assert!(json.get("item").is_none());
    }

    #[test]
    fn test_params_deserialize_status() {
        let params: InventoryParams =
            serde_json::from_str(r#"{"status":"out_of_stock","perPage":25}"#).unwrap();
        assert_eq!(params.status, Some(StockStatus::OutOfStock));
        assert_eq!(params.per_page, Some(25));
    }
}
