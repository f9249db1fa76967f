//! Authentication extractors.
//!
//! The signed-in user lives in the session slice of the visitor's
//! [`ClientStore`]. These extractors read it for handlers that only need the
//! user, not the whole store.

use axum::{extract::FromRequestParts, http::request::Parts};
use maison_core::UserSession;

use crate::error::AppError;
use crate::middleware::ClientStore;

/// Extractor that requires a signed-in visitor.
///
/// Anonymous visitors get `401 {"redirect": "/auth/login"}`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireSession(user): RequireSession,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.display_name)
/// }
/// ```
pub struct RequireSession(pub UserSession);

impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = ClientStore::from_request_parts(parts, state).await?;
        store
            .user()
            .cloned()
            .map(Self)
            .ok_or(AppError::SignInRequired)
    }
}

/// Extractor that optionally gets the signed-in visitor.
pub struct OptionalSession(pub Option<UserSession>);

impl<S> FromRequestParts<S> for OptionalSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = ClientStore::from_request_parts(parts, state).await?;
        Ok(Self(store.user().cloned()))
    }
}
