//! The service layer between the HTTP surface and the store.
//!
//! `MartApi` validates what the handlers hand it, delegates to the backend,
//! and translates store outcomes into the sentinel errors of
//! [`MartApiError`]. Order-number syntax (digits, Luhn) is checked at the HTTP
//! boundary; this layer only guards against structurally impossible input.

pub mod errors;

use log::debug;

pub use crate::mart_api::errors::MartApiError;

use crate::{
    db_types::{Balance, MartOrder, NewWithdrawal, User, Withdrawal},
    traits::{MartStore, MartStoreError},
};

pub struct MartApi<B> {
    store: B,
}

impl<B> std::fmt::Debug for MartApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MartApi")
    }
}

impl<B> MartApi<B>
where B: MartStore
{
    pub fn new(store: B) -> Self {
        Self { store }
    }

    /// Register a new user. The store's unique-login check is authoritative;
    /// there is no pre-flight lookup that could race it.
    pub async fn register_user(&self, login: &str, password: &str) -> Result<User, MartApiError> {
        if login.is_empty() || password.is_empty() {
            return Err(MartApiError::MissingCredentials);
        }
        let user = self.store.create_user(login, password).await.map_err(|e| match e {
            MartStoreError::LoginExists => MartApiError::LoginInUse,
            other => other.into(),
        })?;
        debug!("🛍️ Registered user [{}] as #{}", user.login, user.id);
        Ok(user)
    }

    pub async fn login_user(&self, login: &str, password: &str) -> Result<User, MartApiError> {
        if login.is_empty() || password.is_empty() {
            return Err(MartApiError::MissingCredentials);
        }
        let user = self.store.fetch_user_by_credentials(login, password).await?;
        user.ok_or(MartApiError::InvalidCredentials)
    }

    pub async fn user_by_id(&self, user_id: i64) -> Result<Option<User>, MartApiError> {
        if user_id <= 0 {
            return Err(MartApiError::InvalidUserId);
        }
        Ok(self.store.fetch_user_by_id(user_id).await?)
    }

    /// Submit an order number. Duplicate and ownership conflicts come back as
    /// store sentinels for the handler to map.
    pub async fn create_order(&self, user_id: i64, number: &str) -> Result<(), MartApiError> {
        if user_id <= 0 {
            return Err(MartApiError::InvalidUserId);
        }
        if number.is_empty() {
            return Err(MartApiError::MissingOrderNumber);
        }
        Ok(self.store.create_order(user_id, number).await?)
    }

    pub async fn orders(&self, user_id: i64) -> Result<Vec<MartOrder>, MartApiError> {
        if user_id <= 0 {
            return Err(MartApiError::InvalidUserId);
        }
        Ok(self.store.fetch_orders(user_id).await?)
    }

    pub async fn balance(&self, user_id: i64) -> Result<Balance, MartApiError> {
        if user_id <= 0 {
            return Err(MartApiError::InvalidUserId);
        }
        Ok(self.store.fetch_balance(user_id).await?)
    }

    pub async fn withdraw(&self, user_id: i64, withdrawal: &NewWithdrawal) -> Result<(), MartApiError> {
        Ok(self.store.withdraw(user_id, withdrawal).await?)
    }

    pub async fn withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, MartApiError> {
        Ok(self.store.fetch_withdrawals(user_id).await?)
    }
}
