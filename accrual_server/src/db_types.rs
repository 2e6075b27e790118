use std::fmt::Display;

use lp_common::Points;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

//--------------------------------------    ProductReward    ---------------------------------------------------------
/// A reward rule. `matcher` selects goods lines by substring; `reward_type`
/// is `"%"` for a percentage of the line price, anything else means a fixed
/// award per matching line.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProductReward {
    #[serde(rename = "match")]
    #[sqlx(rename = "match")]
    pub matcher: String,
    pub reward: f64,
    pub reward_type: String,
}

impl ProductReward {
    pub fn is_percent(&self) -> bool {
        self.reward_type == "%"
    }

    /// Points one matching goods line contributes under this rule.
    pub fn contribution(&self, price: f64) -> Points {
        if self.is_percent() {
            Points::percent_of(price, self.reward)
        } else {
            Points::from(self.reward)
        }
    }
}

//--------------------------------------      GoodsLine      ---------------------------------------------------------
/// One goods line of a submitted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoodsLine {
    pub description: String,
    pub price: f64,
}

/// Body of `POST /api/orders`. The order number arrives as a string and must
/// parse as a non-negative integer before anything touches the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccrualOrder {
    pub order: String,
    pub goods: Vec<GoodsLine>,
}

//--------------------------------------  AccrualOrderStatus  --------------------------------------------------------
/// Lifecycle of an order on the accrual side. `Invalid` and `Processed` are
/// terminal; the matcher never revisits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "accrual_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AccrualOrderStatus {
    Registered,
    Processing,
    Invalid,
    Processed,
}

impl AccrualOrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AccrualOrderStatus::Invalid | AccrualOrderStatus::Processed)
    }
}

impl Display for AccrualOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccrualOrderStatus::Registered => write!(f, "REGISTERED"),
            AccrualOrderStatus::Processing => write!(f, "PROCESSING"),
            AccrualOrderStatus::Invalid => write!(f, "INVALID"),
            AccrualOrderStatus::Processed => write!(f, "PROCESSED"),
        }
    }
}

//--------------------------------------     AccrualInfo     ---------------------------------------------------------
/// Body of a 200 from `GET /api/orders/{number}`. The accrual field is
/// omitted until the order has earned something.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AccrualInfo {
    #[sqlx(rename = "order_id")]
    pub order: i64,
    pub status: AccrualOrderStatus,
    #[serde(skip_serializing_if = "Points::is_none_or_zero")]
    pub accrual: Option<Points>,
}

//--------------------------------------      MatchLine      ---------------------------------------------------------
/// One `(order, price)` hit of a rule's substring against a goods line.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct MatchLine {
    pub order_id: i64,
    pub price: f64,
}
