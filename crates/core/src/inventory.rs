//! Admin inventory types.
//!
//! Stock levels, thresholds, alerts and forecasts are computed by the backend.
//! The dashboard only reads them and submits [`StockAdjustment`] requests.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{AlertId, AlertSeverity, MovementId, ProductId, StockStatus};

/// Per-item stock thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockThresholds {
    pub low: u32,
    pub critical: u32,
    pub reorder_point: u32,
}

/// Kind of a recorded stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Inbound,
    Outbound,
    Adjustment,
    Reservation,
    Release,
}

/// One entry of an item's stock history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: MovementId,
    pub kind: MovementKind,
    /// Signed change in units.
    pub quantity: i64,
    #[serde(default)]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An inventory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub product_id: ProductId,
    pub sku: String,
    #[serde(default)]
    pub product_name: Option<String>,
    pub current_stock: i64,
    pub reserved_stock: i64,
    pub available_stock: i64,
    pub thresholds: StockThresholds,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub status: StockStatus,
    #[serde(default)]
    pub movements: Vec<StockMovement>,
}

/// Why stock is being adjusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentReason {
    Restock,
    Sale,
    Return,
    Damaged,
    Lost,
    Recount,
    Other,
}

/// A stock adjustment request.
///
/// Serialized with a `type` tag so each variant carries exactly the fields it
/// needs:
///
/// ```json
/// { "type": "add", "quantity": 5, "reason": "restock" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StockAdjustment {
    /// Receive units into stock.
    Add {
        quantity: u32,
        reason: AdjustmentReason,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    /// Take units out of stock.
    Remove {
        quantity: u32,
        reason: AdjustmentReason,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    /// Overwrite the on-hand count, typically after a recount.
    Set {
        quantity: u32,
        reason: AdjustmentReason,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}

impl StockAdjustment {
    /// Units named by the adjustment.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        match self {
            Self::Add { quantity, .. }
            | Self::Remove { quantity, .. }
            | Self::Set { quantity, .. } => *quantity,
        }
    }

    /// Add and remove of zero units change nothing; the backend rejects them.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(
            self,
            Self::Add { quantity: 0, .. } | Self::Remove { quantity: 0, .. }
        )
    }
}

/// A low-stock or anomaly alert raised by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryAlert {
    pub id: AlertId,
    pub product_id: ProductId,
    pub sku: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl InventoryAlert {
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}

/// One point of a demand forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub expected_demand: u32,
    pub projected_stock: i64,
}

/// Server-computed stock forecast for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockForecast {
    pub product_id: ProductId,
    #[serde(default)]
    pub days_until_stockout: Option<u32>,
    #[serde(default)]
    pub recommended_reorder: Option<u32>,
    #[serde(default)]
    pub points: Vec<ForecastPoint>,
}

/// Inventory list criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryQuery {
    pub search: Option<String>,
    pub status: Option<StockStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl InventoryQuery {
    /// Backend query parameters. Blank search is omitted.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("search", search.to_string()));
        }
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            params.push(("perPage", per_page.to_string()));
        }
        params
    }
}

/// A page of inventory records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryPage {
    pub items: Vec<InventoryItem>,
    pub total: u64,
}

/// Inventory export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }

    /// File extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        self.as_str()
    }

    /// MIME type of the exported file.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    /// Default download file name for an export taken on `date`.
    #[must_use]
    pub fn file_name(self, date: NaiveDate) -> String {
        format!("inventory-{}.{}", date.format("%Y-%m-%d"), self.extension())
    }
}

impl core::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(format!("unsupported export format: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_adjustment_is_tagged() {
        let adjustment = StockAdjustment::Add {
            quantity: 5,
            reason: AdjustmentReason::Restock,
            note: None,
        };
        let json = serde_json::to_value(&adjustment).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "add", "quantity": 5, "reason": "restock" })
        );

        let set: StockAdjustment = serde_json::from_str(
            r#"{"type":"set","quantity":40,"reason":"recount","note":"cycle count"}"#,
        )
        .unwrap();
        assert_eq!(set.quantity(), 40);
        assert!(matches!(set, StockAdjustment::Set { note: Some(_), .. }));
    }

    #[test]
    fn test_adjustment_rejects_unknown_tag() {
        let result = serde_json::from_str::<StockAdjustment>(
            r#"{"type":"multiply","quantity":2,"reason":"other"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_adjustment_noop() {
        let remove_none = StockAdjustment::Remove {
            quantity: 0,
            reason: AdjustmentReason::Damaged,
            note: None,
        };
        let set_zero = StockAdjustment::Set {
            quantity: 0,
            reason: AdjustmentReason::Recount,
            note: None,
        };
        assert!(remove_none.is_noop());
        assert!(!set_zero.is_noop());
    }

    #[test]
    fn test_inventory_query_params() {
        let query = InventoryQuery {
            search: Some("  ".to_string()),
            status: Some(StockStatus::Low),
            page: Some(2),
            per_page: None,
        };
        assert_eq!(
            query.to_query(),
            vec![("status", "low".to_string()), ("page", "2".to_string())]
        );
    }

    #[test]
    fn test_export_format() {
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert!("pdf".parse::<ExportFormat>().is_err());
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(ExportFormat::Csv.file_name(date), "inventory-2026-03-09.csv");
        assert_eq!(ExportFormat::Csv.mime_type(), "text/csv");
    }

    #[test]
    fn test_item_deserializes_backend_shape() {
        let item: InventoryItem = serde_json::from_value(serde_json::json!({
            "productId": 11,
            "sku": "MS-TOTE-BLK",
            "currentStock": 8,
            "reservedStock": 2,
            "availableStock": 6,
            "thresholds": { "low": 10, "critical": 3, "reorderPoint": 12 },
            "costPrice": "310.00",
            "sellingPrice": "1250.00",
            "status": "low"
        }))
        .unwrap();
        assert_eq!(item.available_stock, 6);
        assert_eq!(item.status, StockStatus::Low);
        assert!(item.movements.is_empty());
    }
}
