//! Maison Core - Shared types and client-state logic.
//!
//! This crate provides the types used across all Maison components:
//! - `client` - Typed REST client for the Maison backend
//! - `storefront` - Customer-facing storefront service
//! - `admin` - Inventory and notification dashboard service
//! - `cli` - Operator tools (migrations, exports)
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure state transitions - no
//! network access, no database access. Persistence goes through the
//! [`store::Storage`] trait so callers decide where the bytes live.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`bag`] - The shopping bag and its reducer
//! - [`store`] - Client state store (session, bag, catalog slices) with persistence
//! - [`catalog`] - Product summaries, filter criteria, client-side search
//! - [`session`] - Signed-in user session
//! - [`account`] - Profile, addresses, orders, saved items
//! - [`inventory`] - Admin inventory types and stock adjustment requests
//! - [`notifications`] - Admin push-notification campaigns and templates
//! - [`toast`] - User-facing notification messages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod bag;
pub mod catalog;
pub mod inventory;
pub mod notifications;
pub mod session;
pub mod store;
pub mod toast;
pub mod types;

pub use bag::{Bag, BagAction, BagItem, CartLine};
pub use catalog::{PageWindow, ProductFilter, ProductListing, ProductSummary, SortOrder};
pub use session::{AccessToken, AuthProvider, UserSession};
pub use store::{Action, CatalogAction, MemoryStorage, SessionAction, Storage, Store, StoreError};
pub use toast::{Toast, ToastKind};
pub use types::*;
