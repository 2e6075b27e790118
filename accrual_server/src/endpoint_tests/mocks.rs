use lp_common::Points;
use mockall::mock;

use crate::{
    db::AccrualStoreError,
    db_types::{AccrualInfo, AccrualOrderStatus, GoodsLine, MatchLine, ProductReward},
    service::AccrualStore,
};

mock! {
    pub Store {}
    impl AccrualStore for Store {
        async fn create_product_reward(&self, rule: &ProductReward) -> Result<(), AccrualStoreError>;
        async fn register_order(&self, order_id: i64, goods: &[GoodsLine]) -> Result<(), AccrualStoreError>;
        async fn order_exists(&self, order_id: i64) -> Result<bool, AccrualStoreError>;
        async fn accrual_info(&self, order_id: i64) -> Result<Option<AccrualInfo>, AccrualStoreError>;
        async fn products(&self) -> Result<Vec<ProductReward>, AccrualStoreError>;
        async fn match_lines(&self, pattern: &str) -> Result<Vec<MatchLine>, AccrualStoreError>;
        async fn unfinished_orders(&self) -> Result<Vec<i64>, AccrualStoreError>;
        async fn record_accrual(&self, order_id: i64, accrual: Points, status: AccrualOrderStatus) -> Result<(), AccrualStoreError>;
        async fn set_status(&self, order_id: i64, status: AccrualOrderStatus) -> Result<(), AccrualStoreError>;
    }
}
