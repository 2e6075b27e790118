use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;

//--------------------------------------      Points       -----------------------------------------------------------
/// A quantity of loyalty points.
///
/// Points travel as plain JSON numbers and live in `DOUBLE PRECISION` columns,
/// so the wrapper is transparent on both the wire and the database. Negative
/// values only ever appear as intermediate results of balance arithmetic.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Points(f64);

impl Points {
    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// serde `skip_serializing_if` helper: both services omit accruals that
    /// were never set or came out as zero.
    pub fn is_none_or_zero(points: &Option<Points>) -> bool {
        points.map(|p| p.is_zero()).unwrap_or(true)
    }

    /// Percentage reward for a line price: `price * reward / 100`.
    pub fn percent_of(price: f64, reward: f64) -> Self {
        Self(price * reward / 100.0)
    }
}

impl From<f64> for Points {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl Add for Points {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Points {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Points {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Points {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl Display for Points {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
