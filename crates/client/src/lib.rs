//! Maison Client - Typed REST client for the Maison backend.
//!
//! All backend traffic from the storefront, admin and CLI goes through
//! [`ApiClient`]. Requests carry JSON bodies and an optional bearer token;
//! responses are mapped to [`ApiError`] by status:
//!
//! - `401` becomes [`ApiError::Unauthorized`], which callers turn into a
//!   forced logout.
//! - `404` and `429` get their own variants.
//! - Every other non-2xx status is [`ApiError::Status`].
//!
//! Public catalog reads are cached in a [`QueryCache`] that coalesces
//! concurrent identical requests.
//!
//! # Modules
//!
//! - [`catalog`] - Product listing, detail, related products (cached)
//! - [`auth`] - Sign-in with local credentials, Google or Apple; registration
//! - [`account`] - Profile, address book, order history
//! - [`saved_items`] - Wishlist
//! - [`checkout`] - Hand the bag off to the payment processor
//! - `admin` - Inventory and notification campaigns (feature `admin`)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
#[cfg(feature = "admin")]
pub mod admin;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod checkout;
pub mod saved_items;

use std::sync::Arc;
use std::time::Duration;

use maison_core::AccessToken;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub use auth::{Credentials, Registration};
pub use cache::{CacheKey, CacheValue, QueryCache};
pub use checkout::CheckoutSession;

/// Default retry hint when a 429 carries no `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Longest error body kept in [`ApiError::Status`].
const MAX_ERROR_BODY: usize = 500;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Backend returned another non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Request rejected before it was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Error produced by a coalesced request and shared between its waiters.
    #[error(transparent)]
    Shared(Arc<Self>),
}

impl ApiError {
    /// Whether this error means the session's token is no longer valid.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Unauthorized => true,
            Self::Shared(inner) => inner.is_unauthorized(),
            _ => false,
        }
    }

    /// Whether the backend answered 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Shared(inner) => inner.is_not_found(),
            _ => false,
        }
    }

    /// Whether the failure was on the backend side rather than in the request.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Shared(inner) => inner.is_server_error(),
            _ => false,
        }
    }
}

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Backend origin, e.g. `https://api.maison.shop`.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// How long cached catalog reads stay fresh.
    pub cache_ttl: Duration,
    /// Maximum number of cached catalog entries.
    pub cache_capacity: u64,
}

impl ApiConfig {
    /// Settings with default timeout and cache bounds.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(15),
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 1000,
        }
    }
}

/// A downloaded file (e.g. an inventory export).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Maison backend client.
///
/// Cheap to clone; clones share the connection pool and query cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: QueryCache,
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("maison/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                cache: QueryCache::new(config.cache_ttl, config.cache_capacity),
            }),
        })
    }

    /// Backend origin, without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The shared catalog cache.
    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    /// Check that the backend is reachable.
    ///
    /// Any HTTP answer counts; only transport failures are errors.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the backend cannot be reached.
    pub async fn ping(&self) -> Result<(), ApiError> {
        let response = self.inner.client.get(&self.inner.base_url).send().await?;
        debug!(status = %response.status(), "Backend ping");
        Ok(())
    }

    fn request(&self, method: Method, path: &str, token: Option<&AccessToken>) -> RequestBuilder {
        let url = format!("{}{path}", self.inner.base_url);
        let builder = self.inner.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    /// Execute a GET request with query parameters.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&AccessToken>,
    ) -> Result<T, ApiError> {
        let response = self
            .request(Method::GET, path, token)
            .query(query)
            .send()
            .await?;
        handle_response(response).await
    }

    /// Execute a POST request.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
        token: Option<&AccessToken>,
    ) -> Result<T, ApiError> {
        let response = self
            .request(Method::POST, path, token)
            .json(body)
            .send()
            .await?;
        handle_response(response).await
    }

    /// Execute a PATCH request.
    pub(crate) async fn patch<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
        token: Option<&AccessToken>,
    ) -> Result<T, ApiError> {
        let response = self
            .request(Method::PATCH, path, token)
            .json(body)
            .send()
            .await?;
        handle_response(response).await
    }

    /// Execute a PUT request.
    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
        token: Option<&AccessToken>,
    ) -> Result<T, ApiError> {
        let response = self
            .request(Method::PUT, path, token)
            .json(body)
            .send()
            .await?;
        handle_response(response).await
    }

    /// Execute a request whose response body is ignored.
    pub(crate) async fn send_empty(
        &self,
        method: Method,
        path: &str,
        token: Option<&AccessToken>,
    ) -> Result<(), ApiError> {
        let response = self.request(method, path, token).send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(parse_error(response).await)
    }

    /// Execute a DELETE request.
    pub(crate) async fn delete(&self, path: &str, token: Option<&AccessToken>) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, path, token).await
    }

    /// Fetch a binary body.
    #[cfg_attr(not(feature = "admin"), allow(dead_code))]
    pub(crate) async fn download(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&AccessToken>,
        fallback_filename: String,
    ) -> Result<Download, ApiError> {
        let response = self
            .request(Method::GET, path, token)
            .query(query)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(parse_error(response).await);
        }

        let headers = response.headers();
        let filename = headers
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(attachment_filename)
            .unwrap_or(fallback_filename);
        let content_type = headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response.bytes().await?.to_vec();

        Ok(Download {
            filename,
            content_type,
            bytes,
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

/// Handle API response and parse JSON.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    if response.status().is_success() {
        return response
            .json()
            .await
            .map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")));
    }

    Err(parse_error(response).await)
}

/// Map a non-success response to an [`ApiError`].
async fn parse_error(response: reqwest::Response) -> ApiError {
    let status = response.status();

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound(response.url().path().to_string()),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            ApiError::RateLimited(retry_after)
        }
        _ => {
            let message = response
                .text()
                .await
                .map(|body| body.chars().take(MAX_ERROR_BODY).collect())
                .unwrap_or_else(|_| "Unknown error".to_string());

            if status.is_server_error() {
                warn!(status = %status, body = %message, "Backend returned server error");
            }

            ApiError::Status {
                status: status.as_u16(),
                message,
            }
        }
    }
}

/// Extract the file name from a `Content-Disposition: attachment` header.
#[cfg_attr(not(feature = "admin"), allow(dead_code))]
fn attachment_filename(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty() && !name.contains(['/', '\\']))
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;
    use tokio::net::TcpListener;

    use super::{ApiClient, ApiConfig};

    /// Serve `router` on an ephemeral port and return a client pointed at it.
    #[allow(clippy::unwrap_used)]
    pub async fn client_for(router: Router) -> ApiClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let base_url = format!("http://{addr}").parse().unwrap();
        ApiClient::new(&ApiConfig::new(base_url)).unwrap()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode as AxumStatus, header};
    use axum::routing::get;

    use super::*;
    use crate::test_support::client_for;

    #[tokio::test]
    async fn test_status_mapping() {
        let router = Router::new()
            .route("/401", get(|| async { AxumStatus::UNAUTHORIZED }))
            .route("/403", get(|| async { AxumStatus::FORBIDDEN }))
            .route("/404", get(|| async { AxumStatus::NOT_FOUND }))
            .route(
                "/429",
                get(|| async { (AxumStatus::TOO_MANY_REQUESTS, [(header::RETRY_AFTER, "7")]) }),
            )
            .route(
                "/500",
                get(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route("/bad-json", get(|| async { "not json" }));
        let client = client_for(router).await;

        let err = client.get::<serde_json::Value>("/401", &[], None).await.unwrap_err();
        assert!(err.is_unauthorized());

        let err = client.get::<serde_json::Value>("/403", &[], None).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 403, .. }));
        assert!(!err.is_unauthorized());

        let err = client.get::<serde_json::Value>("/404", &[], None).await.unwrap_err();
        assert!(err.is_not_found());

        let err = client.get::<serde_json::Value>("/429", &[], None).await.unwrap_err();
        assert!(matches!(err, ApiError::RateLimited(7)));

        let err = client.get::<serde_json::Value>("/500", &[], None).await.unwrap_err();
        assert!(matches!(&err, ApiError::Status { status: 500, message } if message == "boom"));
        assert!(err.is_server_error());

        let err = client.get::<serde_json::Value>("/bad-json", &[], None).await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[tokio::test]
    async fn test_bearer_token_is_forwarded() {
        async fn echo_auth(headers: HeaderMap) -> axum::Json<serde_json::Value> {
            let auth = headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            axum::Json(serde_json::json!({ "auth": auth }))
        }
        let client = client_for(Router::new().route("/echo", get(echo_auth))).await;

        let token = AccessToken::new("abc");
        let value: serde_json::Value = client.get("/echo", &[], Some(&token)).await.unwrap();
        assert_eq!(value["auth"], "Bearer abc");

        let value: serde_json::Value = client.get("/echo", &[], None).await.unwrap();
        assert_eq!(value["auth"], "");
    }

    #[tokio::test]
    async fn test_ping_accepts_any_status() {
        let client = client_for(Router::new()).await;
        client.ping().await.unwrap();
    }

    #[test]
    fn test_attachment_filename() {
        assert_eq!(
            attachment_filename(r#"attachment; filename="inventory.csv""#).as_deref(),
            Some("inventory.csv")
        );
        assert_eq!(
            attachment_filename("attachment; filename=stock.xlsx").as_deref(),
            Some("stock.xlsx")
        );
        assert_eq!(attachment_filename("attachment"), None);
        assert_eq!(attachment_filename(r#"attachment; filename="../etc/passwd""#), None);
    }

    #[test]
    fn test_shared_error_keeps_kind() {
        let err = ApiError::Shared(Arc::new(ApiError::Unauthorized));
        assert!(err.is_unauthorized());
        assert!(!err.is_server_error());
    }
}
