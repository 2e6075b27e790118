//! # Mart database access
//!
//! Low-level queries are plain functions that accept a `&mut PgConnection`,
//! so callers can run them on a pooled connection or inside a transaction
//! without any other changes. [`postgres::PgMartStore`] stitches them into the
//! [`MartStore`](crate::traits::MartStore) contract.

use log::info;
use sqlx::{migrate::MigrateError, postgres::PgPoolOptions, Error as SqlxError, PgPool};

pub mod postgres;

pub async fn new_pool(url: &str, max_connections: u32) -> Result<PgPool, SqlxError> {
    let pool = PgPoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}

/// Apply the embedded schema migrations, including the `new_orders` trigger.
/// Idempotent; a failure here is fatal for the service. Both services may
/// share one database, so versions applied by the accrual side are ignored
/// rather than treated as history corruption.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    let mut migrator = sqlx::migrate!("./migrations");
    migrator.set_ignore_missing(true);
    migrator.run(pool).await?;
    info!("🗃️ Mart migrations complete");
    Ok(())
}
