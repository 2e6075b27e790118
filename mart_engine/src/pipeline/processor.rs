//! Per-order processing task.
//!
//! One task drives one order from `NEW` to a terminal status. Transient
//! accrual failures, 429 backoffs and not-yet-registered replies all land in
//! the same retry sleep; only a successful terminal update, a vanished row or
//! cancellation end the loop.

use log::{error, info, warn};
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use lp_common::Points;

use super::{AccrualClient, RETRY_DELAY};
use crate::{
    db::postgres::orders,
    db_types::{Job, OrderStatus},
    traits::MartStoreError,
};

pub fn spawn(pool: PgPool, client: AccrualClient, job: Job, shutdown: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(process_order(pool, client, job, shutdown))
}

pub async fn process_order(pool: PgPool, client: AccrualClient, job: Job, shutdown: CancellationToken) {
    info!("📦️ Processing order [{}] (uid={})", job.number, job.order_id);
    loop {
        if shutdown.is_cancelled() {
            info!("📦️ Processing cancelled for order [{}]", job.number);
            return;
        }

        match client.order_status(&job.number).await {
            Err(e) => {
                warn!("📦️ Accrual service error for order [{}]: {e}", job.number);
            },
            Ok(None) => {},
            Ok(Some(reply)) => {
                let status = reply.status.as_order_status();
                let accrual = reply.accrual.unwrap_or_default();
                if let Err(e) = persist_outcome(&pool, job.order_id, status, accrual).await {
                    error!("📦️ Failed to update order [{}]: {e}", job.number);
                    return;
                }
                if status.is_terminal() {
                    info!("📦️ Order [{}] reached final status {status}", job.number);
                    return;
                }
            },
        }

        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("📦️ Processing cancelled for order [{}]", job.number);
                return;
            },
            _ = tokio::time::sleep(RETRY_DELAY) => {},
        }
    }
}

async fn persist_outcome(pool: &PgPool, uid: i64, status: OrderStatus, accrual: Points) -> Result<(), MartStoreError> {
    let mut conn = pool.acquire().await?;
    orders::record_accrual_outcome(uid, status, accrual, &mut conn).await
}
