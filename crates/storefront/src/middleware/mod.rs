//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions)
//! 5. Forced logout (drops the user session on backend 401)
//! 6. Rate limiting (governor, per route group)

pub mod auth;
pub mod client_store;
pub mod forced_logout;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use auth::{OptionalSession, RequireSession};
pub use client_store::ClientStore;
pub use forced_logout::forced_logout_middleware;
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::request_id_middleware;
pub use session::{create_session_layer, session_layer};
