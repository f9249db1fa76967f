//! Dashboard route handler.

use axum::{Json, extract::State};
use maison_core::inventory::InventoryQuery;
use maison_core::notifications::NotificationOverview;
use maison_core::{AlertSeverity, StockStatus};
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::routes::auth::AdminView;
use crate::state::AppState;

/// Dashboard overview.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub admin: AdminView,
    pub open_alerts: usize,
    pub critical_alerts: usize,
    pub out_of_stock: u64,
    pub notifications: NotificationOverview,
}

/// Dashboard overview.
///
/// GET /
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<Json<DashboardView>> {
    let out_of_stock = InventoryQuery {
        status: Some(StockStatus::OutOfStock),
        per_page: Some(1),
        ..InventoryQuery::default()
    };

    let (alerts, out_of_stock, notifications) = tokio::try_join!(
        state.api().list_alerts(&admin.token, false),
        state.api().list_inventory(&admin.token, &out_of_stock),
        state.api().notification_overview(&admin.token)
    )?;

    Ok(Json(DashboardView {
        admin: AdminView::from(&admin),
        open_alerts: alerts.len(),
        critical_alerts: alerts
            .iter()
            .filter(|a| a.severity == AlertSeverity::Critical)
            .count(),
        out_of_stock: out_of_stock.total,
        notifications,
    }))
}
