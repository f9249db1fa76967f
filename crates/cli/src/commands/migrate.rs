//! Session store migration commands.
//!
//! # Usage
//!
//! ```bash
//! # Create the storefront session table
//! maison-cli migrate storefront
//!
//! # Create the admin session table
//! maison-cli migrate admin
//!
//! # Both
//! maison-cli migrate all
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for storefront
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for admin
//!
//! Either falls back to `DATABASE_URL`.
//!
//! Neither service keeps domain data, so the only schema is the one
//! `tower-sessions-sqlx-store` owns: `tower_sessions.session` for the
//! storefront and `admin.session` for the dashboard.

use sqlx::PgPool;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection or migration error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create the storefront session table.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the migration fails.
pub async fn storefront() -> Result<(), MigrationError> {
    let pool = connect("STOREFRONT_DATABASE_URL").await?;

    tracing::info!("Running storefront session store migration...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Storefront migrations complete");
    Ok(())
}

/// Create the admin session table.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the migration fails.
pub async fn admin() -> Result<(), MigrationError> {
    let pool = connect("ADMIN_DATABASE_URL").await?;

    tracing::info!("Running admin session store migration...");
    maison_admin::middleware::admin_session_store(&pool)
        .migrate()
        .await?;

    tracing::info!("Admin migrations complete");
    Ok(())
}

async fn connect(key: &'static str) -> Result<PgPool, MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var(key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar(key))?;

    tracing::info!("Connecting to database ({key})...");
    Ok(PgPool::connect(&database_url).await?)
}
