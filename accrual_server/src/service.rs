//! Service layer of the accrual engine.
//!
//! [`AccrualApi`] validates ingest input and owns the matching pass the
//! background worker runs each tick. The store behind it is abstract so the
//! matching semantics can be tested without a database.

use std::collections::HashMap;

use log::{debug, error, info};
use lp_common::{luhn, Points};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    db::AccrualStoreError,
    db_types::{AccrualInfo, AccrualOrderStatus, GoodsLine, MatchLine, NewAccrualOrder, ProductReward},
};

#[allow(async_fn_in_trait)]
pub trait AccrualStore: Send + Sync + 'static {
    /// Insert a reward rule; a duplicate match substring is
    /// [`AccrualStoreError::KeyExists`].
    async fn create_product_reward(&self, rule: &ProductReward) -> Result<(), AccrualStoreError>;
    /// Insert an order as `REGISTERED`; an existing id is
    /// [`AccrualStoreError::KeyExists`].
    async fn register_order(&self, order_id: i64, goods: &[GoodsLine]) -> Result<(), AccrualStoreError>;
    async fn order_exists(&self, order_id: i64) -> Result<bool, AccrualStoreError>;
    async fn accrual_info(&self, order_id: i64) -> Result<Option<AccrualInfo>, AccrualStoreError>;
    async fn products(&self) -> Result<Vec<ProductReward>, AccrualStoreError>;
    /// `(order_id, price)` pairs of non-terminal orders whose goods match the
    /// substring.
    async fn match_lines(&self, pattern: &str) -> Result<Vec<MatchLine>, AccrualStoreError>;
    async fn unfinished_orders(&self) -> Result<Vec<i64>, AccrualStoreError>;
    async fn record_accrual(
        &self,
        order_id: i64,
        accrual: Points,
        status: AccrualOrderStatus,
    ) -> Result<(), AccrualStoreError>;
    async fn set_status(&self, order_id: i64, status: AccrualOrderStatus) -> Result<(), AccrualStoreError>;
}

#[derive(Debug, Error)]
pub enum AccrualApiError {
    #[error("invalid order number: {0}")]
    BadOrderNumber(String),
    #[error(transparent)]
    Store(#[from] AccrualStoreError),
}

/// What one matching pass did. Purely informational.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Orders finalized with a rule-derived award.
    pub rewarded: usize,
    /// Orders parked as INVALID on a failed check digit.
    pub invalid: usize,
    /// Untouched orders closed out with a zero award.
    pub zeroed: usize,
}

pub struct AccrualApi<B> {
    store: B,
}

impl<B> std::fmt::Debug for AccrualApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccrualApi")
    }
}

impl<B> AccrualApi<B>
where B: AccrualStore
{
    pub fn new(store: B) -> Self {
        Self { store }
    }

    pub async fn create_product_reward(&self, rule: &ProductReward) -> Result<(), AccrualApiError> {
        Ok(self.store.create_product_reward(rule).await?)
    }

    /// Register an order for processing. Returns `true` when the id is
    /// already known, which the HTTP surface reports as a conflict.
    pub async fn register_order(&self, order: &NewAccrualOrder) -> Result<bool, AccrualApiError> {
        let order_id: i64 =
            order.order.parse().map_err(|_| AccrualApiError::BadOrderNumber(order.order.clone()))?;
        if self.store.order_exists(order_id).await? {
            return Ok(true);
        }
        match self.store.register_order(order_id, &order.goods).await {
            Ok(()) => Ok(false),
            // Lost the race against a concurrent registration of the same id.
            Err(AccrualStoreError::KeyExists) => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn accrual_info(&self, order_id: i64) -> Result<Option<AccrualInfo>, AccrualApiError> {
        Ok(self.store.accrual_info(order_id).await?)
    }

    /// One matching pass:
    /// 1. every rule collects its `(order, price)` hits, contributions summed
    ///    per order: a line matched by several rules earns under each;
    /// 2. each collected order is finalized: a failed check digit parks it as
    ///    INVALID, otherwise it becomes PROCESSED with the summed award;
    /// 3. any remaining non-terminal order becomes PROCESSED with zero.
    ///
    /// Per-order write failures are logged and skipped so one bad row cannot
    /// stall the rest of the tick. Cancellation is checked before each store
    /// round-trip.
    pub async fn process_orders(&self, shutdown: &CancellationToken) -> Result<TickSummary, AccrualApiError> {
        let rules = self.store.products().await?;
        let mut totals: HashMap<i64, Points> = HashMap::new();

        for rule in &rules {
            if shutdown.is_cancelled() {
                return Ok(TickSummary::default());
            }
            let lines = match self.store.match_lines(&rule.matcher).await {
                Ok(lines) => lines,
                Err(e) => {
                    error!("🎯 Match query failed for rule [{}]: {e}", rule.matcher);
                    continue;
                },
            };
            for line in lines {
                *totals.entry(line.order_id).or_default() += rule.contribution(line.price);
            }
        }

        let mut summary = TickSummary::default();
        for (&order_id, &total) in &totals {
            if shutdown.is_cancelled() {
                return Ok(summary);
            }
            if !luhn::valid(&order_id.to_string()) {
                if let Err(e) = self.store.set_status(order_id, AccrualOrderStatus::Invalid).await {
                    error!("🎯 Failed to invalidate order [{order_id}]: {e}");
                } else {
                    summary.invalid += 1;
                }
                continue;
            }
            match self.store.record_accrual(order_id, total, AccrualOrderStatus::Processed).await {
                Ok(()) => {
                    info!("🎯 Order [{order_id}] processed with accrual {total}");
                    summary.rewarded += 1;
                },
                Err(e) => error!("🎯 Failed to record accrual for order [{order_id}]: {e}"),
            }
        }

        if shutdown.is_cancelled() {
            return Ok(summary);
        }
        let unfinished = self.store.unfinished_orders().await?;
        for order_id in unfinished {
            if shutdown.is_cancelled() {
                return Ok(summary);
            }
            if totals.contains_key(&order_id) {
                continue;
            }
            match self.store.record_accrual(order_id, Points::default(), AccrualOrderStatus::Processed).await {
                Ok(()) => {
                    debug!("🎯 Order [{order_id}] processed with zero accrual (no matching rule)");
                    summary.zeroed += 1;
                },
                Err(e) => error!("🎯 Failed to zero out order [{order_id}]: {e}"),
            }
        }
        Ok(summary)
    }
}
