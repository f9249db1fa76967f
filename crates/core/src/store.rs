//! Client state store.
//!
//! Holds the three slices of client state (signed-in session, bag, catalog
//! cache) and is the only place that reads or writes them to durable storage:
//!
//! - [`Store::open`] deserializes every slice once (deserialize-on-init).
//! - [`Store::dispatch`] applies an [`Action`] to one slice and writes that
//!   slice back immediately (serialize-on-write).
//!
//! Storage is anything that looks like the browser's `localStorage`; see
//! [`Storage`]. Writes are unconditional and last-write-wins.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bag::{Bag, BagAction};
use crate::catalog::{CatalogCache, ProductFilter, ProductListing};
use crate::session::UserSession;

/// Storage keys, one per slice.
pub mod keys {
    /// Signed-in user session.
    pub const SESSION: &str = "maison.session";
    /// Bag lines.
    pub const BAG: &str = "maison.bag";
    /// Last catalog listing.
    pub const CATALOG: &str = "maison.catalog";
}

/// Synchronous string key/value storage.
pub trait Storage {
    /// Read the value stored under `key`.
    fn get_item(&self, key: &str) -> Option<String>;
    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, value: String);
    /// Delete `key`. Missing keys are ignored.
    fn remove_item(&mut self, key: &str);
}

/// In-memory [`Storage`]. Itself serializable, so a whole storage area can be
/// kept inside another store (e.g. an HTTP session).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStorage(BTreeMap<String, String>);

impl MemoryStorage {
    /// Empty storage.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) {
        self.0.insert(key.to_string(), value);
    }

    fn remove_item(&mut self, key: &str) {
        self.0.remove(key);
    }
}

/// Errors raised at the persistence boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A stored slice could not be parsed.
    #[error("stored {key} slice is malformed: {source}")]
    Malformed {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// A slice could not be serialized.
    #[error("failed to serialize {key} slice: {source}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Session slice mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    SignIn(UserSession),
    SignOut,
}

/// Catalog slice mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogAction {
    /// A listing arrived from the backend; it replaces the previous one.
    Loaded {
        filter: ProductFilter,
        listing: ProductListing,
    },
    Invalidate,
}

/// Every mutation the store accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Session(SessionAction),
    Bag(BagAction),
    Catalog(CatalogAction),
}

impl From<BagAction> for Action {
    fn from(action: BagAction) -> Self {
        Self::Bag(action)
    }
}

impl From<SessionAction> for Action {
    fn from(action: SessionAction) -> Self {
        Self::Session(action)
    }
}

impl From<CatalogAction> for Action {
    fn from(action: CatalogAction) -> Self {
        Self::Catalog(action)
    }
}

/// The client state store.
#[derive(Debug)]
pub struct Store<S: Storage> {
    storage: S,
    session: Option<UserSession>,
    bag: Bag,
    catalog: CatalogCache,
}

impl<S: Storage> Store<S> {
    /// Rehydrate every slice from `storage`. Missing slices start empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Malformed`] for the first slice that fails to parse.
    pub fn open(storage: S) -> Result<Self, StoreError> {
        let session = read_slice(&storage, keys::SESSION)?;
        let bag = read_slice(&storage, keys::BAG)?.unwrap_or_default();
        let catalog = read_slice(&storage, keys::CATALOG)?.unwrap_or_default();
        Ok(Self {
            storage,
            session,
            bag,
            catalog,
        })
    }

    /// Rehydrate like [`Store::open`], but reset malformed slices instead of
    /// failing. The malformed keys are removed from storage and their errors
    /// returned so the caller can report them.
    pub fn open_lossy(mut storage: S) -> (Self, Vec<StoreError>) {
        let mut errors = Vec::new();
        let session = read_or_reset(&mut storage, keys::SESSION, &mut errors);
        let bag = read_or_reset(&mut storage, keys::BAG, &mut errors).unwrap_or_default();
        let catalog = read_or_reset(&mut storage, keys::CATALOG, &mut errors).unwrap_or_default();
        (
            Self {
                storage,
                session,
                bag,
                catalog,
            },
            errors,
        )
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&UserSession> {
        self.session.as_ref()
    }

    /// The bag.
    #[must_use]
    pub const fn bag(&self) -> &Bag {
        &self.bag
    }

    /// The catalog slice.
    #[must_use]
    pub const fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    /// The underlying storage.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Give back the underlying storage.
    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Apply `action` and persist the slice it touched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialize`] if the slice cannot be serialized.
    /// The in-memory state is already updated when that happens.
    pub fn dispatch(&mut self, action: impl Into<Action>) -> Result<(), StoreError> {
        match action.into() {
            Action::Session(SessionAction::SignIn(session)) => {
                self.session = Some(session);
                self.persist_session()
            }
            Action::Session(SessionAction::SignOut) => {
                self.session = None;
                self.persist_session()
            }
            Action::Bag(action) => {
                self.bag.apply(action);
                write_slice(&mut self.storage, keys::BAG, &self.bag)
            }
            Action::Catalog(CatalogAction::Loaded { filter, listing }) => {
                self.catalog = CatalogCache {
                    filter: Some(filter),
                    listing: Some(listing),
                };
                write_slice(&mut self.storage, keys::CATALOG, &self.catalog)
            }
            Action::Catalog(CatalogAction::Invalidate) => {
                self.catalog = CatalogCache::default();
                self.storage.remove_item(keys::CATALOG);
                Ok(())
            }
        }
    }

    fn persist_session(&mut self) -> Result<(), StoreError> {
        match &self.session {
            Some(session) => write_slice(&mut self.storage, keys::SESSION, session),
            None => {
                self.storage.remove_item(keys::SESSION);
                Ok(())
            }
        }
    }
}

fn read_slice<T: DeserializeOwned>(
    storage: &impl Storage,
    key: &'static str,
) -> Result<Option<T>, StoreError> {
    storage
        .get_item(key)
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(|source| StoreError::Malformed { key, source })
}

fn read_or_reset<T: DeserializeOwned>(
    storage: &mut impl Storage,
    key: &'static str,
    errors: &mut Vec<StoreError>,
) -> Option<T> {
    match read_slice(storage, key) {
        Ok(value) => value,
        Err(err) => {
            storage.remove_item(key);
            errors.push(err);
            None
        }
    }
}

fn write_slice<T: Serialize>(
    storage: &mut impl Storage,
    key: &'static str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize { key, source })?;
    storage.set_item(key, raw);
    Ok(())
}
