//! Mart Engine
//!
//! The engine behind the user-facing half of the loyalty platform. It owns
//! three things:
//! 1. The Postgres store: users, the mirrored order table, and the append-only
//!    withdrawals ledger. Low-level queries live in [`db`] as plain functions
//!    over a connection; [`PgMartStore`] composes them into the [`MartStore`]
//!    contract, including the single-transaction withdraw flow.
//! 2. The service layer, [`MartApi`], which validates input and translates
//!    store outcomes into the sentinel errors the HTTP surface maps onto
//!    status codes.
//! 3. The order pipeline in [`pipeline`]: a replayer for unfinished orders, a
//!    `LISTEN new_orders` notifier, and one polling task per order that drives
//!    the row to its terminal status from the accrual service.

pub mod db;
pub mod db_types;
pub mod helpers;
pub mod mart_api;
pub mod pipeline;
pub mod traits;

pub use db::postgres::PgMartStore;
pub use mart_api::{MartApi, MartApiError};
pub use traits::{MartStore, MartStoreError};
