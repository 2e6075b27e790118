//! # Accrual database access
//!
//! Same shape as the mart store: plain async functions over a
//! `&mut PgConnection`, composed by [`PgAccrualStore`]. Mutating operations
//! run inside a transaction; dropping the transaction on an early return
//! rolls it back.

use log::info;
use sqlx::{migrate::MigrateError, postgres::PgPoolOptions, Error as SqlxError, PgPool};
use thiserror::Error;

pub mod orders;
pub mod products;

mod store;

pub use store::PgAccrualStore;

#[derive(Debug, Error)]
pub enum AccrualStoreError {
    #[error("A database error occurred. {0}")]
    Database(#[from] sqlx::Error),
    #[error("key already exists")]
    KeyExists,
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<PgPool, SqlxError> {
    let pool = PgPoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}

/// Both services may share one database; versions applied by the mart side
/// are ignored rather than treated as history corruption.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    let mut migrator = sqlx::migrate!("./migrations");
    migrator.set_ignore_missing(true);
    migrator.run(pool).await?;
    info!("🗃️ Accrual migrations complete");
    Ok(())
}
