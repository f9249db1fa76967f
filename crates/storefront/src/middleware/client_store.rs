//! Per-visitor client state.
//!
//! Each visitor's [`Store`] is backed by a [`MemoryStorage`] kept in their
//! HTTP session under [`session_keys::CLIENT_STORAGE`]. The extractor
//! rehydrates it once per request; [`ClientStore::dispatch`] applies an
//! action and writes the storage back to the session in the same step, so
//! the session is the single persistence boundary.

use axum::{extract::FromRequestParts, http::request::Parts};
use maison_core::catalog::CatalogCache;
use maison_core::{Action, Bag, MemoryStorage, SessionAction, Store, UserSession};
use tower_sessions::Session;
use tracing::warn;

use crate::error::AppError;
use crate::models::session_keys;

/// The visitor's client state store.
///
/// # Example
///
/// ```rust,ignore
/// async fn count(store: ClientStore) -> Json<u64> {
///     Json(store.bag().total_items())
/// }
/// ```
#[derive(Debug)]
pub struct ClientStore {
    session: Session,
    store: Store<MemoryStorage>,
}

impl ClientStore {
    /// Rehydrate the store from `session`.
    ///
    /// Malformed slices are logged, reset and written back.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    pub async fn load(session: Session) -> Result<Self, AppError> {
        let storage: MemoryStorage = session
            .get(session_keys::CLIENT_STORAGE)
            .await?
            .unwrap_or_default();

        let (store, errors) = Store::open_lossy(storage);
        let this = Self { session, store };
        if !errors.is_empty() {
            for error in &errors {
                warn!(error = %error, "Resetting malformed client state");
            }
            this.persist().await?;
        }
        Ok(this)
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&UserSession> {
        self.store.session()
    }

    /// The bag.
    #[must_use]
    pub const fn bag(&self) -> &Bag {
        self.store.bag()
    }

    /// The catalog slice.
    #[must_use]
    pub const fn catalog(&self) -> &CatalogCache {
        self.store.catalog()
    }

    /// The underlying HTTP session.
    #[must_use]
    pub const fn http_session(&self) -> &Session {
        &self.session
    }

    /// Apply `action` and persist the visitor's storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice cannot be serialized or the session
    /// cannot be written.
    pub async fn dispatch(&mut self, action: impl Into<Action>) -> Result<(), AppError> {
        self.store.dispatch(action)?;
        self.persist().await
    }

    /// Sign the visitor out, keeping their bag, and rotate the session id.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn sign_out(&mut self) -> Result<(), AppError> {
        self.dispatch(SessionAction::SignOut).await?;
        self.session.cycle_id().await?;
        Ok(())
    }

    async fn persist(&self) -> Result<(), AppError> {
        self.session
            .insert(session_keys::CLIENT_STORAGE, self.store.storage())
            .await?;
        Ok(())
    }
}

impl<S> FromRequestParts<S> for ClientStore
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))?;

        Self::load(session).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use maison_core::store::keys;
    use maison_core::{BagAction, BagItem, ProductId, Storage};
    use rust_decimal::Decimal;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn item() -> BagItem {
        BagItem {
            product_id: ProductId::new(1),
            size: "M".to_string(),
            unit_price: Decimal::from(100),
            display_name: "Scarf".to_string(),
            image_url: None,
            style_code: None,
        }
    }

    #[tokio::test]
    async fn test_dispatch_writes_through_to_session() {
        let session = session();
        let mut store = ClientStore::load(session.clone()).await.unwrap();
        store
            .dispatch(BagAction::Add {
                item: item(),
                quantity: 2,
            })
            .await
            .unwrap();

        let reloaded = ClientStore::load(session).await.unwrap();
        assert_eq!(reloaded.bag().total_items(), 2);
    }

    #[tokio::test]
    async fn test_malformed_slice_is_reset() {
        let session = session();
        let mut storage = MemoryStorage::new();
        storage.set_item(keys::BAG, "[{\"broken\"".to_string());
        session
            .insert(session_keys::CLIENT_STORAGE, &storage)
            .await
            .unwrap();

        let store = ClientStore::load(session.clone()).await.unwrap();
        assert!(store.bag().is_empty());

        let persisted: MemoryStorage = session
            .get(session_keys::CLIENT_STORAGE)
            .await
            .unwrap()
            .unwrap();
        assert!(persisted.get_item(keys::BAG).is_none());
    }
}
