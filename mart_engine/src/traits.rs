//! The store contract the service layer is written against.
//!
//! [`PgMartStore`](crate::PgMartStore) is the production implementation; tests
//! mock this trait to drive the service layer and the HTTP surface without a
//! database.

use thiserror::Error;

use crate::db_types::{Balance, MartOrder, NewWithdrawal, User, Withdrawal};

#[derive(Debug, Error)]
pub enum MartStoreError {
    #[error("A database error occurred. {0}")]
    Database(#[from] sqlx::Error),
    #[error("Credential hashing failed. {0}")]
    Credential(String),
    #[error("login already exists")]
    LoginExists,
    #[error("the number has already been uploaded by this user")]
    DuplicateOrder,
    #[error("number uploaded by another user")]
    OtherUserOrder,
    #[error("lack of funds")]
    LackOfFunds,
    #[error("Unexpected order insert outcome: {0}")]
    UnexpectedOutcome(String),
}

#[allow(async_fn_in_trait)]
pub trait MartStore: Send + Sync + 'static {
    /// Create a new user with a freshly salted credential verifier.
    /// A taken login surfaces as [`MartStoreError::LoginExists`].
    async fn create_user(&self, login: &str, password: &str) -> Result<User, MartStoreError>;

    /// Fetch the user matching both login and password. `None` covers unknown
    /// logins and wrong passwords alike.
    async fn fetch_user_by_credentials(&self, login: &str, password: &str) -> Result<Option<User>, MartStoreError>;

    async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, MartStoreError>;

    /// Insert the order number for the user. The first submitter owns the
    /// number; re-submission by the owner is [`MartStoreError::DuplicateOrder`]
    /// and by anyone else [`MartStoreError::OtherUserOrder`]. A successful
    /// insert fires the `new_orders` notification from the attached trigger.
    async fn create_order(&self, user_id: i64, number: &str) -> Result<(), MartStoreError>;

    /// All orders of the user, newest first.
    async fn fetch_orders(&self, user_id: i64) -> Result<Vec<MartOrder>, MartStoreError>;

    /// Current and withdrawn totals, derived in one snapshot.
    async fn fetch_balance(&self, user_id: i64) -> Result<Balance, MartStoreError>;

    /// Check the balance and append a ledger row inside one transaction.
    /// Overdrafts surface as [`MartStoreError::LackOfFunds`] and leave the
    /// ledger untouched.
    async fn withdraw(&self, user_id: i64, withdrawal: &NewWithdrawal) -> Result<(), MartStoreError>;

    /// The user's withdrawal ledger, newest first.
    async fn fetch_withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, MartStoreError>;
}
