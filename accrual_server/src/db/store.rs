use std::fmt::Debug;

use lp_common::Points;
use sqlx::PgPool;

use super::{orders, products, AccrualStoreError};
use crate::{
    db_types::{AccrualInfo, AccrualOrderStatus, GoodsLine, MatchLine, ProductReward},
    service::AccrualStore,
};

#[derive(Clone)]
pub struct PgAccrualStore {
    pool: PgPool,
}

impl Debug for PgAccrualStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PgAccrualStore ({:?})", self.pool)
    }
}

impl PgAccrualStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl AccrualStore for PgAccrualStore {
    async fn create_product_reward(&self, rule: &ProductReward) -> Result<(), AccrualStoreError> {
        let mut tx = self.pool.begin().await?;
        products::insert_product_reward(rule, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn register_order(&self, order_id: i64, goods: &[GoodsLine]) -> Result<(), AccrualStoreError> {
        let mut tx = self.pool.begin().await?;
        orders::insert_order(order_id, goods, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn order_exists(&self, order_id: i64) -> Result<bool, AccrualStoreError> {
        let mut conn = self.pool.acquire().await?;
        let exists = orders::order_exists(order_id, &mut conn).await?;
        Ok(exists)
    }

    async fn accrual_info(&self, order_id: i64) -> Result<Option<AccrualInfo>, AccrualStoreError> {
        let mut conn = self.pool.acquire().await?;
        let info = orders::fetch_accrual_info(order_id, &mut conn).await?;
        Ok(info)
    }

    async fn products(&self) -> Result<Vec<ProductReward>, AccrualStoreError> {
        let mut conn = self.pool.acquire().await?;
        let rules = products::fetch_products(&mut conn).await?;
        Ok(rules)
    }

    async fn match_lines(&self, pattern: &str) -> Result<Vec<MatchLine>, AccrualStoreError> {
        let mut conn = self.pool.acquire().await?;
        let lines = orders::match_lines(pattern, &mut conn).await?;
        Ok(lines)
    }

    async fn unfinished_orders(&self) -> Result<Vec<i64>, AccrualStoreError> {
        let mut conn = self.pool.acquire().await?;
        let ids = orders::fetch_unfinished(&mut conn).await?;
        Ok(ids)
    }

    async fn record_accrual(
        &self,
        order_id: i64,
        accrual: Points,
        status: AccrualOrderStatus,
    ) -> Result<(), AccrualStoreError> {
        let mut tx = self.pool.begin().await?;
        orders::record_accrual(order_id, accrual, status, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn set_status(&self, order_id: i64, status: AccrualOrderStatus) -> Result<(), AccrualStoreError> {
        let mut tx = self.pool.begin().await?;
        orders::set_status(order_id, status, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }
}
