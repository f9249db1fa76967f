//! Forced logout.
//!
//! A backend `401` on any admin call means the operator's token is no longer
//! valid. The error response is tagged with [`ForcedLogout`]; this middleware
//! sits inside the session layer and clears the operator before the response
//! leaves.

use axum::{extract::Request, middleware::Next, response::Response};
use tower_sessions::Session;
use tracing::{error, info};

use crate::error::{ForcedLogout, clear_sentry_user};
use crate::middleware::auth::clear_current_admin;

/// Sign the operator out when a response carries [`ForcedLogout`].
pub async fn forced_logout_middleware(session: Session, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    if response.extensions_mut().remove::<ForcedLogout>().is_none() {
        return response;
    }

    match clear_current_admin(&session).await {
        Ok(()) => info!("Operator token rejected by backend, signed out"),
        Err(e) => error!(error = %e, "Failed to clear rejected operator session"),
    }
    clear_sentry_user();

    response
}
