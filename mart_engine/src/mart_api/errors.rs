use thiserror::Error;

use crate::traits::MartStoreError;

/// Service-layer errors. The HTTP surface maps each variant onto a status
/// code; everything it does not recognize falls through as a 500.
#[derive(Debug, Error)]
pub enum MartApiError {
    #[error("login and password are required")]
    MissingCredentials,
    #[error("invalid login or password")]
    InvalidCredentials,
    #[error("login already taken")]
    LoginInUse,
    #[error("invalid user ID")]
    InvalidUserId,
    #[error("order number is required")]
    MissingOrderNumber,
    #[error(transparent)]
    Store(#[from] MartStoreError),
}
