//! Database connection for the admin session store.
//!
//! # Database: `maison_admin`
//!
//! Inventory and campaigns belong to the backend. `PostgreSQL` only holds
//! operator sessions, in the `admin.session` table.
//!
//! # Migrations
//!
//! Run explicitly via:
//! ```bash
//! cargo run -p maison-cli -- migrate admin
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
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
