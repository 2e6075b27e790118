//! Replayer and notification listener.
//!
//! The replayer runs once at startup and launches a processing task for every
//! order still in `NEW`, oldest first. The listener holds a dedicated
//! connection on `LISTEN new_orders` and launches a task per decoded payload.
//! A payload that does not decode is logged and skipped; a failed wait tears
//! the connection down, sleeps, and reconnects: the replay has already made
//! the rows the source of truth, so a dropped notification is only a delay.

use log::{info, warn};
use sqlx::{postgres::PgListener, PgPool};
use tokio_util::sync::CancellationToken;

use super::{processor, AccrualClient, RECONNECT_DELAY};
use crate::{db::postgres::orders, db_types::Job, traits::MartStoreError};

/// Launch a processing task for every unfinished order. Returns how many were
/// replayed.
pub async fn replay_pending(
    pool: &PgPool,
    client: &AccrualClient,
    shutdown: &CancellationToken,
) -> Result<usize, MartStoreError> {
    let mut conn = pool.acquire().await?;
    let jobs = orders::fetch_pending_jobs(&mut conn).await?;
    drop(conn);
    let mut count = 0;
    for job in jobs {
        if shutdown.is_cancelled() {
            break;
        }
        processor::spawn(pool.clone(), client.clone(), job, shutdown.clone());
        count += 1;
    }
    info!("📦️ Replayed {count} unfinished orders");
    Ok(count)
}

/// Listen on `new_orders` until cancelled, spawning a processing task per
/// notification.
pub async fn listen_notifications(db_url: String, pool: PgPool, client: AccrualClient, shutdown: CancellationToken) {
    loop {
        if shutdown.is_cancelled() {
            info!("📦️ Notification listener stopping");
            return;
        }
        let mut listener = match connect(&db_url).await {
            Ok(l) => l,
            Err(e) => {
                warn!("📦️ Could not open the notification connection, retrying in {RECONNECT_DELAY:?}: {e}");
                tokio::time::sleep(RECONNECT_DELAY).await;
                continue;
            },
        };
        info!("📦️ Listening for new_orders notifications");

        loop {
            let notification = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("📦️ Notification listener stopping");
                    return;
                },
                n = listener.recv() => n,
            };
            match notification {
                Ok(n) => match serde_json::from_str::<Job>(n.payload()) {
                    Ok(job) => {
                        info!("📦️ New order notification received: [{}]", job.number);
                        processor::spawn(pool.clone(), client.clone(), job, shutdown.clone());
                    },
                    Err(e) => warn!("📦️ Could not decode notification payload: {e}"),
                },
                Err(e) => {
                    if shutdown.is_cancelled() {
                        info!("📦️ Notification listener stopping");
                        return;
                    }
                    warn!("📦️ Notification wait failed, reconnecting in {RECONNECT_DELAY:?}: {e}");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                    break;
                },
            }
        }
    }
}

async fn connect(db_url: &str) -> Result<PgListener, sqlx::Error> {
    let mut listener = PgListener::connect(db_url).await?;
    listener.listen("new_orders").await?;
    Ok(listener)
}
