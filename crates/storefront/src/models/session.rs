//! Session-related types.
//!
//! The storefront keeps one value per visitor in the HTTP session: the
//! serialized client storage that backs [`maison_core::Store`].

/// Session keys.
pub mod keys {
    /// Key for the visitor's client storage (session, bag, catalog slices).
    pub const CLIENT_STORAGE: &str = "client_storage";
}
