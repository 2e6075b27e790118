//! The order pipeline.
//!
//! A durable single-consumer queue built on the primary store: the order
//! insert fires a `new_orders` notification from its trigger, a dedicated
//! listener connection turns each notification into a processing task, and a
//! startup replay of `status = 'NEW'` rows closes the gap for notifications
//! missed while the service was down. Notifications are hints; the rows are
//! the source of truth.
//!
//! Each order gets its own task that polls the accrual service until the
//! mirrored row reaches a terminal status. There is no worker-pool cap:
//! backpressure comes from the accrual side's rate limiting and the fixed
//! retry sleep.

pub mod client;
pub mod listener;
pub mod processor;

use std::time::Duration;

use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use client::{AccrualClient, AccrualClientError, AccrualReply, AccrualStatus};

/// Delay between poll attempts for a single order.
pub const RETRY_DELAY: Duration = Duration::from_secs(2);
/// Delay before re-opening the notification connection after a wait error.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Launch the replayer and the notification listener. Do not await the
/// returned handles for progress; they run until `shutdown` fires.
pub fn start_order_pipeline(
    db_url: String,
    pool: PgPool,
    client: AccrualClient,
    shutdown: CancellationToken,
) -> (JoinHandle<()>, JoinHandle<()>) {
    let replayer = {
        let (pool, client, shutdown) = (pool.clone(), client.clone(), shutdown.clone());
        tokio::spawn(async move {
            if let Err(e) = listener::replay_pending(&pool, &client, &shutdown).await {
                log::error!("📦️ Replay of unfinished orders failed: {e}");
            }
        })
    };
    let notifier = tokio::spawn(listener::listen_notifications(db_url, pool, client, shutdown));
    (replayer, notifier)
}
