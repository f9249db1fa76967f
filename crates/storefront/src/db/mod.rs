//! Database connection for the storefront session store.
//!
//! # Database: `maison_storefront`
//!
//! The storefront keeps no domain data of its own; the backend owns products,
//! accounts and orders. `PostgreSQL` only backs `tower-sessions`, which is
//! where each visitor's client state (session, bag, catalog slices) lives.
//!
//! ## Tables
//!
//! - `tower_sessions.session` - Created by the session store migration
//!
//! # Migrations
//!
//! Run explicitly via:
//! ```bash
//! cargo run -p maison-cli -- migrate storefront
//! ```

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
