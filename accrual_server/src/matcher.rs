//! Background matching worker.
//!
//! Runs one [`process_orders`](crate::service::AccrualApi::process_orders)
//! pass per polling interval until the shutdown token fires. A failed pass is
//! logged and the next tick simply tries again; orders stay non-terminal
//! until a pass succeeds for them.

use std::time::Duration;

use log::{error, info};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{db::PgAccrualStore, service::AccrualApi};

/// Starts the matcher. Do not await the returned handle for progress; it
/// only resolves once `shutdown` fires.
pub fn start_matcher(
    api: AccrualApi<PgAccrualStore>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        // The first tick of an interval fires immediately; consume it so the
        // first pass happens one full interval after startup.
        timer.tick().await;
        info!("🎯 Matcher started, polling every {interval:?}");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("🎯 Matcher stopped");
                    return;
                },
                _ = timer.tick() => {},
            }
            match api.process_orders(&shutdown).await {
                Ok(summary) => {
                    if summary.rewarded + summary.invalid + summary.zeroed > 0 {
                        info!(
                            "🎯 Matching pass complete: {} rewarded, {} invalid, {} zeroed",
                            summary.rewarded, summary.invalid, summary.zeroed
                        );
                    }
                },
                Err(e) => error!("🎯 Matching pass failed: {e}"),
            }
        }
    })
}
