//! Integration test harness for Maison.
//!
//! Starts an in-memory stand-in for the Maison REST backend and both BFFs
//! (storefront and admin) on ephemeral ports, with in-memory session stores.
//! Tests then drive the BFFs over real HTTP with cookie-keeping clients, the
//! way the rendering shell does.
//!
//! # Usage
//!
//! ```rust,ignore
//! use maison_integration_tests::TestContext;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let ctx = TestContext::start().await;
//!     let bag: serde_json::Value = ctx
//!         .shopper
//!         .get(ctx.storefront("/bag"))
//!         .send()
//!         .await
//!         .unwrap()
//!         .json()
//!         .await
//!         .unwrap();
//!     assert_eq!(bag["itemCount"], 0);
//! }
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use maison_core::inventory::{
    InventoryAlert, InventoryItem, InventoryPage, MovementKind, StockAdjustment, StockForecast,
    StockMovement, StockThresholds,
};
use maison_core::notifications::{
    CampaignSchedule, CampaignStats, NewCampaign, NewTemplate, NotificationCampaign,
    NotificationOverview, NotificationTemplate,
};
use maison_core::{
    AlertId, AlertSeverity, CampaignId, CampaignStatus, CurrencyCode, MovementId, ProductId,
    StockStatus, TemplateId,
};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_sessions::MemoryStore;
use url::Url;

/// Password the stub backend accepts for every account.
pub const STUB_PASSWORD: &str = "correct horse battery staple";

/// Customer the stub backend signs in.
pub const CUSTOMER_EMAIL: &str = "camille@maison.test";

/// Operator the stub backend signs in.
pub const OPERATOR_EMAIL: &str = "ops@maison.test";

/// Product id of the seeded tote (price 100.00, sizes S/M/L).
pub const TOTE_ID: i64 = 1;

/// Product id of the seeded scarf, out of stock with an open alert.
pub const SCARF_ID: i64 = 3;

// =============================================================================
// Test Context
// =============================================================================

/// Running backend stub plus both BFFs.
pub struct TestContext {
    pub backend: StubBackend,
    pub storefront_url: String,
    pub admin_url: String,
    /// Cookie-keeping client for the storefront.
    pub shopper: reqwest::Client,
    /// Cookie-keeping client for the admin dashboard.
    pub operator: reqwest::Client,
}

impl TestContext {
    /// Start the stub backend, the storefront and the admin dashboard.
    pub async fn start() -> Self {
        let backend = StubBackend::spawn().await;

        let storefront_state =
            maison_storefront::state::AppState::new(storefront_config(backend.url()))
                .expect("storefront state");
        let storefront = maison_storefront::app(
            storefront_state,
            maison_storefront::middleware::session_layer(MemoryStore::default(), false),
        );
        let (listener, storefront_url) = bind().await;
        tokio::spawn(async move {
            // The rate limiter keys on the peer address
            axum::serve(
                listener,
                storefront.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("storefront server");
        });

        let admin_state = maison_admin::state::AppState::new(admin_config(backend.url()))
            .expect("admin state");
        let admin = maison_admin::app(
            admin_state,
            maison_admin::middleware::session_layer(MemoryStore::default(), false),
        );
        let (listener, admin_url) = bind().await;
        tokio::spawn(async move {
            axum::serve(listener, admin).await.expect("admin server");
        });

        Self {
            backend,
            storefront_url,
            admin_url,
            shopper: cookie_client(),
            operator: cookie_client(),
        }
    }

    /// Absolute storefront URL for `path`.
    #[must_use]
    pub fn storefront(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// Absolute admin URL for `path`.
    #[must_use]
    pub fn admin(&self, path: &str) -> String {
        format!("{}{path}", self.admin_url)
    }

    /// Sign the shopper in through the storefront.
    pub async fn sign_in_customer(&self) -> reqwest::Response {
        self.shopper
            .post(self.storefront("/auth/login"))
            .json(&json!({ "email": CUSTOMER_EMAIL, "password": STUB_PASSWORD }))
            .send()
            .await
            .expect("storefront login request")
    }

    /// Sign the operator in through the admin dashboard.
    pub async fn sign_in_operator(&self) -> reqwest::Response {
        self.operator
            .post(self.admin("/auth/login"))
            .json(&json!({ "email": OPERATOR_EMAIL, "password": STUB_PASSWORD }))
            .send()
            .await
            .expect("admin login request")
    }
}

fn cookie_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Bind an ephemeral local port.
async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener address");
    (listener, format!("http://{addr}"))
}

fn storefront_config(api_url: &Url) -> maison_storefront::config::StorefrontConfig {
    maison_storefront::config::StorefrontConfig {
        database_url: SecretString::from("postgres://unused@localhost/storefront".to_string()),
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        backend: maison_storefront::config::BackendConfig {
            url: api_url.clone(),
            timeout: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(60),
        },
        currency: CurrencyCode::USD,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

fn admin_config(api_url: &Url) -> maison_admin::config::AdminConfig {
    maison_admin::config::AdminConfig {
        database_url: SecretString::from("postgres://unused@localhost/admin".to_string()),
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        api_url: api_url.clone(),
        api_timeout: Duration::from_secs(5),
        currency: CurrencyCode::USD,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

// =============================================================================
// Stub Backend
// =============================================================================

/// In-memory stand-in for the Maison REST backend.
///
/// Issues bearer tokens on sign-in and answers `401` for any token it did not
/// issue or has since revoked.
#[derive(Clone)]
pub struct StubBackend {
    url: Url,
    state: Shared,
}

type Shared = Arc<Mutex<StubState>>;

struct StubState {
    next_id: i64,
    tokens: HashSet<String>,
    inventory: Vec<InventoryItem>,
    alerts: Vec<InventoryAlert>,
    campaigns: Vec<NotificationCampaign>,
    templates: Vec<NotificationTemplate>,
    checkouts: Vec<Value>,
    reads_unavailable: bool,
}

impl StubState {
    fn seeded() -> Self {
        let now = Utc::now();
        Self {
            next_id: 100,
            tokens: HashSet::new(),
            inventory: vec![
                inventory_item(TOTE_ID, "MS-TOTE-BLK", "Sac Tote", 8, 2, 100),
                inventory_item(SCARF_ID, "MS-SCARF-SLK", "Silk Scarf", 0, 0, 80),
            ],
            alerts: vec![InventoryAlert {
                id: AlertId::new(1),
                product_id: ProductId::new(SCARF_ID),
                sku: "MS-SCARF-SLK".to_string(),
                severity: AlertSeverity::Critical,
                message: "Silk Scarf is out of stock".to_string(),
                created_at: now,
                resolved_at: None,
            }],
            campaigns: Vec::new(),
            templates: Vec::new(),
            checkouts: Vec::new(),
            reads_unavailable: false,
        }
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

fn inventory_item(
    id: i64,
    sku: &str,
    name: &str,
    current: i64,
    reserved: i64,
    price: i64,
) -> InventoryItem {
    let thresholds = StockThresholds {
        low: 10,
        critical: 3,
        reorder_point: 12,
    };
    InventoryItem {
        product_id: ProductId::new(id),
        sku: sku.to_string(),
        product_name: Some(name.to_string()),
        current_stock: current,
        reserved_stock: reserved,
        available_stock: current - reserved,
        thresholds,
        cost_price: Decimal::new(price * 40, 2),
        selling_price: Decimal::new(price * 100, 2),
        status: status_for(current - reserved, &thresholds),
        movements: Vec::new(),
    }
}

fn status_for(available: i64, thresholds: &StockThresholds) -> StockStatus {
    if available <= 0 {
        StockStatus::OutOfStock
    } else if available <= i64::from(thresholds.critical) {
        StockStatus::Critical
    } else if available <= i64::from(thresholds.low) {
        StockStatus::Low
    } else {
        StockStatus::InStock
    }
}

fn lock(state: &Shared) -> MutexGuard<'_, StubState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reject requests without a live bearer token.
fn authorize(state: &Shared, headers: &HeaderMap) -> Result<(), StatusCode> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match token {
        Some(token) if lock(state).tokens.contains(token) => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

/// Answer `503` on admin reads while the outage switch is on.
fn readable(state: &Shared) -> Result<(), StatusCode> {
    if lock(state).reads_unavailable {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    } else {
        Ok(())
    }
}

impl StubBackend {
    /// Serve the stub on an ephemeral port.
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(StubState::seeded()));
        let (listener, url) = bind().await;
        let router = router(Arc::clone(&state));
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("stub backend");
        });

        Self {
            url: Url::parse(&url).expect("stub backend URL"),
            state,
        }
    }

    /// Origin the BFFs are pointed at.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Invalidate every issued token, as an expired session would.
    pub fn revoke_tokens(&self) {
        lock(&self.state).tokens.clear();
    }

    /// Make record and list reads fail with `503` while writes keep working.
    pub fn fail_reads(&self) {
        lock(&self.state).reads_unavailable = true;
    }

    /// Checkout requests received so far.
    #[must_use]
    pub fn checkouts(&self) -> Vec<Value> {
        lock(&self.state).checkouts.clone()
    }

    /// On-hand stock for a product.
    #[must_use]
    pub fn stock(&self, product_id: i64) -> Option<i64> {
        lock(&self.state)
            .inventory
            .iter()
            .find(|item| item.product_id == ProductId::new(product_id))
            .map(|item| item.current_stock)
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        // Catalog
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(product_detail))
        .route("/api/products/{id}/related", get(related_products))
        // Auth and account
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(login))
        .route("/api/user/profile", get(profile))
        .route("/api/checkout", post(checkout))
        // Inventory
        .route("/api/admin/inventory", get(list_inventory))
        .route("/api/admin/inventory/export", get(export_inventory))
        .route("/api/admin/inventory/alerts", get(list_alerts))
        .route("/api/admin/inventory/alerts/{id}/resolve", post(resolve_alert))
        .route("/api/admin/inventory/{id}", get(inventory_item_detail))
        .route("/api/admin/inventory/{id}/adjust", post(adjust_stock))
        .route("/api/admin/inventory/{id}/forecast", get(forecast))
        // Notifications
        .route("/api/admin/notifications/stats", get(overview))
        .route(
            "/api/admin/notifications/campaigns",
            get(list_campaigns).post(create_campaign),
        )
        .route(
            "/api/admin/notifications/campaigns/{id}",
            get(campaign_detail).delete(delete_campaign),
        )
        .route("/api/admin/notifications/campaigns/{id}/send", post(send_campaign))
        .route("/api/admin/notifications/campaigns/{id}/stats", get(campaign_stats))
        .route(
            "/api/admin/notifications/templates",
            get(list_templates).post(create_template),
        )
        .route("/api/admin/notifications/templates/{id}", delete(delete_template))
        .with_state(state)
}

// -----------------------------------------------------------------------------
// Catalog
// -----------------------------------------------------------------------------

fn catalog() -> Vec<Value> {
    vec![
        json!({
            "id": TOTE_ID, "name": "Sac Tote", "price": "100.00",
            "imageUrl": "/img/tote.jpg", "category": "bags", "line": "atelier",
            "colors": ["black"], "materials": ["leather"], "sku": "MS-TOTE-BLK"
        }),
        json!({
            "id": 2, "name": "Mini Tote", "price": "250.00",
            "imageUrl": "/img/mini-tote.jpg", "category": "bags",
            "colors": ["tan"], "materials": ["leather"], "sku": "MS-MINI-TAN"
        }),
        json!({
            "id": SCARF_ID, "name": "Silk Scarf", "price": "80.00",
            "imageUrl": "/img/scarf.jpg", "category": "accessories",
            "colors": ["ivory"], "materials": ["silk"], "sku": "MS-SCARF-SLK"
        }),
    ]
}

async fn list_products(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let search = params.get("search").map(|s| s.to_lowercase());
    let products: Vec<Value> = catalog()
        .into_iter()
        .filter(|p| {
            params
                .get("category")
                .is_none_or(|category| p["category"] == category.as_str())
        })
        .filter(|p| {
            search.as_deref().is_none_or(|search| {
                p["name"]
                    .as_str()
                    .is_some_and(|name| name.to_lowercase().contains(search))
            })
        })
        .collect();
    Json(json!({ "total": products.len(), "products": products }))
}

async fn product_detail(Path(id): Path<i64>) -> Result<Json<Value>, StatusCode> {
    let mut product = catalog()
        .into_iter()
        .find(|p| p["id"] == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    product["description"] = "Made in the Maison atelier.".into();
    product["sizes"] = json!(["S", "M", "L"]);
    product["styleCode"] = format!("STYLE-{id}").into();
    Ok(Json(product))
}

async fn related_products(Path(id): Path<i64>) -> Json<Vec<Value>> {
    Json(catalog().into_iter().filter(|p| p["id"] != id).take(2).collect())
}

// -----------------------------------------------------------------------------
// Auth, account, checkout
// -----------------------------------------------------------------------------

async fn login(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if body["password"] != STUB_PASSWORD {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let mut state = lock(&state);
    let id = state.next_id();
    let token = format!("tok-{id}");
    state.tokens.insert(token.clone());

    Ok(Json(json!({
        "token": token,
        "user": { "id": 7, "email": body["email"], "displayName": "Camille" }
    })))
}

async fn profile(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    authorize(&state, &headers)?;
    Ok(Json(json!({
        "id": 7,
        "email": CUSTOMER_EMAIL,
        "displayName": "Camille",
        "marketingOptIn": false
    })))
}

async fn checkout(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut state = lock(&state);
    state.checkouts.push(body);
    let n = state.checkouts.len();
    Json(json!({ "redirectUrl": format!("https://pay.maison.test/session/{n}") }))
}

// -----------------------------------------------------------------------------
// Inventory
// -----------------------------------------------------------------------------

async fn list_inventory(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<InventoryPage>, StatusCode> {
    authorize(&state, &headers)?;
    let items: Vec<InventoryItem> = lock(&state)
        .inventory
        .iter()
        .filter(|item| {
            params
                .get("status")
                .is_none_or(|status| item.status.as_str() == status)
        })
        .cloned()
        .collect();
    let total = items.len() as u64;
    Ok(Json(InventoryPage { items, total }))
}

async fn inventory_item_detail(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<InventoryItem>, StatusCode> {
    authorize(&state, &headers)?;
    readable(&state)?;
    lock(&state)
        .inventory
        .iter()
        .find(|item| item.product_id == ProductId::new(id))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn adjust_stock(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(adjustment): Json<StockAdjustment>,
) -> Result<Json<InventoryItem>, StatusCode> {
    authorize(&state, &headers)?;
    if adjustment.is_noop() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let mut state = lock(&state);
    let movement_id = state.next_id();
    let item = state
        .inventory
        .iter_mut()
        .find(|item| item.product_id == ProductId::new(id))
        .ok_or(StatusCode::NOT_FOUND)?;

    let quantity = i64::from(adjustment.quantity());
    let delta = match adjustment {
        StockAdjustment::Add { .. } => quantity,
        StockAdjustment::Remove { .. } => -quantity,
        StockAdjustment::Set { .. } => quantity - item.current_stock,
    };
    item.current_stock += delta;
    item.available_stock = item.current_stock - item.reserved_stock;
    item.status = status_for(item.available_stock, &item.thresholds);
    item.movements.insert(
        0,
        StockMovement {
            id: MovementId::new(movement_id),
            kind: MovementKind::Adjustment,
            quantity: delta,
            reason: None,
            created_at: Utc::now(),
        },
    );
    Ok(Json(item.clone()))
}

async fn forecast(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<StockForecast>, StatusCode> {
    authorize(&state, &headers)?;
    Ok(Json(StockForecast {
        product_id: ProductId::new(id),
        days_until_stockout: Some(12),
        recommended_reorder: Some(20),
        points: Vec::new(),
    }))
}

async fn list_alerts(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<InventoryAlert>>, StatusCode> {
    authorize(&state, &headers)?;
    readable(&state)?;
    let include_resolved = params.get("includeResolved").is_some_and(|v| v == "true");
    Ok(Json(
        lock(&state)
            .alerts
            .iter()
            .filter(|alert| include_resolved || alert.resolved_at.is_none())
            .cloned()
            .collect(),
    ))
}

async fn resolve_alert(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    authorize(&state, &headers)?;
    let mut state = lock(&state);
    let alert = state
        .alerts
        .iter_mut()
        .find(|alert| alert.id == AlertId::new(id))
        .ok_or(StatusCode::NOT_FOUND)?;
    alert.resolved_at = Some(Utc::now());
    Ok(StatusCode::NO_CONTENT)
}

async fn export_inventory(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, StatusCode> {
    authorize(&state, &headers)?;
    if params.get("format").is_some_and(|f| f == "xlsx") {
        return Ok((
            [
                (
                    header::CONTENT_TYPE,
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                ),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"inventory-2026-10-19.xlsx\"",
                ),
            ],
            b"PK\x03\x04".to_vec(),
        )
            .into_response());
    }

    let mut csv = String::from("sku,current_stock,status\n");
    for item in &lock(&state).inventory {
        csv.push_str(&format!(
            "{},{},{}\n",
            item.sku,
            item.current_stock,
            item.status.as_str()
        ));
    }
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"inventory-2026-10-19.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

// -----------------------------------------------------------------------------
// Notifications
// -----------------------------------------------------------------------------

async fn overview(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<NotificationOverview>, StatusCode> {
    authorize(&state, &headers)?;
    let state = lock(&state);
    let sent = state
        .campaigns
        .iter()
        .filter(|c| c.status == CampaignStatus::Sent)
        .count() as u64;
    Ok(Json(NotificationOverview {
        total_campaigns: state.campaigns.len() as u64,
        sent_last_30_days: sent,
        subscribers: 1200,
        delivered: sent * 1150,
        opened: sent * 400,
    }))
}

async fn list_campaigns(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Vec<NotificationCampaign>>, StatusCode> {
    authorize(&state, &headers)?;
    readable(&state)?;
    Ok(Json(lock(&state).campaigns.clone()))
}

async fn create_campaign(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(campaign): Json<NewCampaign>,
) -> Result<(StatusCode, Json<NotificationCampaign>), StatusCode> {
    authorize(&state, &headers)?;
    let mut state = lock(&state);
    let id = state.next_id();
    let created = NotificationCampaign {
        id: CampaignId::new(id),
        name: campaign.name,
        content: campaign.content,
        audience: campaign.audience,
        status: match campaign.schedule {
            CampaignSchedule::Immediate => CampaignStatus::Draft,
            CampaignSchedule::At { .. } => CampaignStatus::Scheduled,
        },
        schedule: campaign.schedule,
        template_id: campaign.template_id,
        created_at: Utc::now(),
        sent_at: None,
    };
    state.campaigns.push(created.clone());
    Ok((StatusCode::CREATED, Json(created)))
}

async fn campaign_detail(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<NotificationCampaign>, StatusCode> {
    authorize(&state, &headers)?;
    lock(&state)
        .campaigns
        .iter()
        .find(|c| c.id == CampaignId::new(id))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn campaign_stats(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<CampaignStats>, StatusCode> {
    authorize(&state, &headers)?;
    let state = lock(&state);
    let campaign = state
        .campaigns
        .iter()
        .find(|c| c.id == CampaignId::new(id))
        .ok_or(StatusCode::NOT_FOUND)?;
    if campaign.status != CampaignStatus::Sent {
        return Ok(Json(CampaignStats::default()));
    }
    Ok(Json(CampaignStats {
        targeted: 1200,
        sent: 1200,
        delivered: 1150,
        opened: 400,
        clicked: 90,
        failed: 50,
    }))
}

async fn send_campaign(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    authorize(&state, &headers)?;
    let mut state = lock(&state);
    let campaign = state
        .campaigns
        .iter_mut()
        .find(|c| c.id == CampaignId::new(id))
        .ok_or(StatusCode::NOT_FOUND)?;
    if !campaign.status.is_sendable() {
        return Err(StatusCode::CONFLICT);
    }
    campaign.status = CampaignStatus::Sent;
    campaign.sent_at = Some(Utc::now());
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_campaign(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    authorize(&state, &headers)?;
    let mut state = lock(&state);
    let before = state.campaigns.len();
    state.campaigns.retain(|c| c.id != CampaignId::new(id));
    if state.campaigns.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_templates(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Vec<NotificationTemplate>>, StatusCode> {
    authorize(&state, &headers)?;
    readable(&state)?;
    Ok(Json(lock(&state).templates.clone()))
}

async fn create_template(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(template): Json<NewTemplate>,
) -> Result<(StatusCode, Json<NotificationTemplate>), StatusCode> {
    authorize(&state, &headers)?;
    let mut state = lock(&state);
    let id = state.next_id();
    let created = NotificationTemplate {
        id: TemplateId::new(id),
        name: template.name,
        content: template.content,
        created_at: Utc::now(),
    };
    state.templates.push(created.clone());
    Ok((StatusCode::CREATED, Json(created)))
}

async fn delete_template(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    authorize(&state, &headers)?;
    let mut state = lock(&state);
    let before = state.templates.len();
    state.templates.retain(|t| t.id != TemplateId::new(id));
    if state.templates.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(StatusCode::NO_CONTENT)
}
