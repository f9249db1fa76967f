//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Liveness
//! GET    /health/ready                        - Readiness (backend reachable)
//!
//! # Dashboard
//! GET    /                                    - Alerts, stock-outs, notification totals
//!
//! # Auth
//! GET    /auth/login                          - Sign-in screen data
//! POST   /auth/login                          - Email and password
//! POST   /auth/logout                         - Logout
//! GET    /auth/me                             - Current operator
//!
//! # Inventory
//! GET    /inventory                           - Inventory table (?search&status&page&perPage)
//! GET    /inventory/export                    - Download (?format=csv|xlsx)
//! GET    /inventory/alerts                    - Alerts (?includeResolved)
//! POST   /inventory/alerts/{id}/resolve       - Resolve an alert
//! GET    /inventory/{id}                      - Record with movement history
//! POST   /inventory/{id}/adjust               - Stock adjustment
//! GET    /inventory/{id}/forecast             - Demand forecast
//!
//! # Notifications
//! GET    /notifications                       - Aggregates
//! GET    /notifications/campaigns             - Campaign list
//! POST   /notifications/campaigns             - Create campaign
//! GET    /notifications/campaigns/{id}        - Campaign with stats
//! DELETE /notifications/campaigns/{id}        - Delete campaign
//! POST   /notifications/campaigns/{id}/send   - Send now
//! GET    /notifications/campaigns/{id}/stats  - Delivery statistics
//! GET    /notifications/templates             - Template list
//! POST   /notifications/templates             - Create template
//! DELETE /notifications/templates/{id}        - Delete template
//! ```

pub mod auth;
pub mod dashboard;
pub mod inventory;
pub mod notifications;

use axum::{
    Router,
    routing::{delete, get, post},
};
use maison_client::ApiError;
use tracing::warn;

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the inventory routes router.
pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(inventory::index))
        .route("/export", get(inventory::export))
        .route("/alerts", get(inventory::alerts))
        .route("/alerts/{id}/resolve", post(inventory::resolve_alert))
        .route("/{id}", get(inventory::show))
        .route("/{id}/adjust", post(inventory::adjust))
        .route("/{id}/forecast", get(inventory::forecast))
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::overview))
        .route(
            "/campaigns",
            get(notifications::campaigns).post(notifications::create_campaign),
        )
        .route(
            "/campaigns/{id}",
            get(notifications::show_campaign).delete(notifications::delete_campaign),
        )
        .route("/campaigns/{id}/send", post(notifications::send_campaign))
        .route("/campaigns/{id}/stats", get(notifications::campaign_stats))
        .route(
            "/templates",
            get(notifications::templates).post(notifications::create_template),
        )
        .route("/templates/{id}", delete(notifications::delete_template))
}

/// Create all routes for admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .nest("/auth", auth_routes())
        .nest("/inventory", inventory_routes())
        .nest("/notifications", notification_routes())
}

/// Result of the re-fetch that follows a mutation.
///
/// The mutation has already been applied by the time this runs, so a failed
/// read is logged and the view degrades instead of turning into an error toast.
pub(crate) fn after_mutation<T>(view: &'static str, result: Result<T, ApiError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(view, error = %e, "Re-fetch after mutation failed");
            None
        }
    }
}
