//! Forced logout.
//!
//! When a handler's backend call comes back `401`, the error response is
//! tagged with [`ForcedLogout`]. This middleware sits inside the session
//! layer, sees the tag on the way out, and drops the visitor's user session
//! before the response leaves. The bag survives.

use axum::{extract::Request, middleware::Next, response::Response};
use tower_sessions::Session;
use tracing::{error, info};

use crate::error::{ForcedLogout, clear_sentry_user};
use crate::middleware::ClientStore;

/// Sign the visitor out when a response carries [`ForcedLogout`].
pub async fn forced_logout_middleware(session: Session, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    if response.extensions_mut().remove::<ForcedLogout>().is_none() {
        return response;
    }

    let result = match ClientStore::load(session).await {
        Ok(mut store) => store.sign_out().await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => info!("Session rejected by backend, signed out"),
        Err(e) => error!(error = %e, "Failed to clear rejected session"),
    }
    clear_sentry_user();

    response
}
