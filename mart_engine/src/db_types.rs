use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use lp_common::Points;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------        User        ----------------------------------------------------------
/// A registered Mart user. Immutable after creation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub login: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

//--------------------------------------     OrderStatus     ---------------------------------------------------------
/// Processing state of a mirrored order. Transitions run `New` →
/// `Processing`? → terminal and never leave a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "order_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    New,
    Processing,
    Invalid,
    Processed,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Invalid | OrderStatus::Processed)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::New => write!(f, "NEW"),
            OrderStatus::Processing => write!(f, "PROCESSING"),
            OrderStatus::Invalid => write!(f, "INVALID"),
            OrderStatus::Processed => write!(f, "PROCESSED"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct InvalidOrderStatus(String);

impl FromStr for OrderStatus {
    type Err = InvalidOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(OrderStatus::New),
            "PROCESSING" => Ok(OrderStatus::Processing),
            "INVALID" => Ok(OrderStatus::Invalid),
            "PROCESSED" => Ok(OrderStatus::Processed),
            other => Err(InvalidOrderStatus(other.to_string())),
        }
    }
}

//--------------------------------------      MartOrder      ---------------------------------------------------------
/// A user's submitted order number and the engine's view of its progress
/// through the accrual service.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MartOrder {
    #[serde(skip_serializing)]
    pub uid: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub number: String,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Points::is_none_or_zero")]
    pub accrual: Option<Points>,
    pub uploaded_at: DateTime<Utc>,
}

//--------------------------------------  CreateOrderOutcome  --------------------------------------------------------
/// Discriminator returned by the single-statement order insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOrderOutcome {
    /// A new row was inserted; the trigger has fired the `new_orders` notify.
    Inserted,
    /// The same user already submitted this number.
    Duplicate,
    /// The number belongs to another user.
    Conflict,
    /// The insert raced a delete; never expected in normal operation.
    NotFound,
}

impl FromStr for CreateOrderOutcome {
    type Err = InvalidOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inserted" => Ok(CreateOrderOutcome::Inserted),
            "duplicate" => Ok(CreateOrderOutcome::Duplicate),
            "conflict" => Ok(CreateOrderOutcome::Conflict),
            "not_found" => Ok(CreateOrderOutcome::NotFound),
            other => Err(InvalidOrderStatus(other.to_string())),
        }
    }
}

//--------------------------------------       Balance       ---------------------------------------------------------
/// Point balance derived from the two ledgers in a single snapshot, so that
/// `current + withdrawn` always equals the sum of processed accruals.
#[derive(Debug, Clone, Copy, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Balance {
    pub current: Points,
    pub withdrawn: Points,
}

//--------------------------------------     Withdrawal      ---------------------------------------------------------
/// One row of the append-only withdrawals ledger.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Withdrawal {
    #[serde(rename = "order")]
    pub order_number: String,
    pub sum: Points,
    pub processed_at: DateTime<Utc>,
}

/// A withdrawal request as it arrives from the user: the order the points pay
/// for (which need not exist in the orders table) and the amount to debit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWithdrawal {
    pub order: String,
    pub sum: Points,
}

//--------------------------------------         Job         ---------------------------------------------------------
/// The `new_orders` notification payload, and equally one row of the startup
/// replay query. Everything a processing task needs to drive one order.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Job {
    pub order_id: i64,
    pub user_id: i64,
    pub number: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}
