//! `PgMartStore` is the production [`MartStore`] backend.
//!
//! It owns the connection pool and composes the low-level query functions,
//! opening a transaction only where an operation genuinely needs one: the
//! withdraw flow, whose balance check and ledger insert must not be split.

use std::fmt::Debug;

use log::debug;
use sqlx::PgPool;

use super::{orders, users, withdrawals};
use crate::{
    db_types::{Balance, CreateOrderOutcome, MartOrder, NewWithdrawal, User, Withdrawal},
    helpers::passwords,
    traits::{MartStore, MartStoreError},
};

#[derive(Clone)]
pub struct PgMartStore {
    pool: PgPool,
}

impl Debug for PgMartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PgMartStore ({:?})", self.pool)
    }
}

impl PgMartStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl MartStore for PgMartStore {
    async fn create_user(&self, login: &str, password: &str) -> Result<User, MartStoreError> {
        let hash = passwords::hash(password)?;
        let mut conn = self.pool.acquire().await?;
        users::insert_user(login, &hash, &mut conn).await
    }

    async fn fetch_user_by_credentials(&self, login: &str, password: &str) -> Result<Option<User>, MartStoreError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user_by_login(login, &mut conn).await?;
        Ok(user.filter(|u| passwords::verify(password, &u.password_hash)))
    }

    async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, MartStoreError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user_by_id(id, &mut conn).await?;
        Ok(user)
    }

    async fn create_order(&self, user_id: i64, number: &str) -> Result<(), MartStoreError> {
        let mut conn = self.pool.acquire().await?;
        match orders::create_order(user_id, number, &mut conn).await? {
            // The trigger has already sent the notify for the new row.
            CreateOrderOutcome::Inserted => {
                debug!("🗃️ Order [{number}] accepted for user #{user_id}");
                Ok(())
            },
            CreateOrderOutcome::Duplicate => Err(MartStoreError::DuplicateOrder),
            CreateOrderOutcome::Conflict => Err(MartStoreError::OtherUserOrder),
            CreateOrderOutcome::NotFound => {
                Err(MartStoreError::UnexpectedOutcome(format!("order [{number}] vanished during insert")))
            },
        }
    }

    async fn fetch_orders(&self, user_id: i64) -> Result<Vec<MartOrder>, MartStoreError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_balance(&self, user_id: i64) -> Result<Balance, MartStoreError> {
        let mut conn = self.pool.acquire().await?;
        let balance = withdrawals::fetch_balance(user_id, &mut conn).await?;
        Ok(balance)
    }

    async fn withdraw(&self, user_id: i64, withdrawal: &NewWithdrawal) -> Result<(), MartStoreError> {
        let mut tx = self.pool.begin().await?;
        let balance = withdrawals::fetch_balance(user_id, &mut tx).await?;
        if balance.current - withdrawal.sum < lp_common::Points::default() {
            // Dropping the transaction rolls it back.
            return Err(MartStoreError::LackOfFunds);
        }
        withdrawals::insert_withdrawal(user_id, withdrawal, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ User #{user_id} withdrew {} against order [{}]", withdrawal.sum, withdrawal.order);
        Ok(())
    }

    async fn fetch_withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, MartStoreError> {
        let mut conn = self.pool.acquire().await?;
        let rows = withdrawals::fetch_withdrawals(user_id, &mut conn).await?;
        Ok(rows)
    }
}
