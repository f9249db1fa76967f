//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added by the binary)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with `PostgreSQL` store, `SameSite=Strict`)
//! 5. Forced logout (clears the operator after a backend `401`)

pub mod auth;
pub mod forced_logout;
pub mod request_id;
pub mod session;

pub use auth::{OptionalAdminAuth, RequireAdminAuth, clear_current_admin, set_current_admin};
pub use forced_logout::forced_logout_middleware;
pub use request_id::request_id_middleware;
pub use session::{admin_session_store, create_session_layer, session_layer};
