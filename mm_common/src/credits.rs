use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

//--------------------------------------       Credits       ---------------------------------------------------------
/// A count of consumable interest credits. Balances are stored as signed integers so that deltas (charges and
/// refunds) share the same type, but a persisted balance is never negative.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Credits(i64);

op!(binary Credits, Add, add);
op!(binary Credits, Sub, sub);
op!(inplace Credits, AddAssign, add_assign);
op!(inplace Credits, SubAssign, sub_assign);
op!(unary Credits, Neg, neg);

impl Sum for Credits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as credits: {0}")]
pub struct CreditsConversionError(String);

impl From<i64> for Credits {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<u32> for Credits {
    fn from(value: u32) -> Self {
        Self(i64::from(value))
    }
}

impl PartialEq for Credits {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Credits {}

impl TryFrom<u64> for Credits {
    type Error = CreditsConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(CreditsConversionError(format!("Value {} is too large to convert to Credits", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Credits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            1 | -1 => write!(f, "{} credit", self.0),
            v => write!(f, "{v} credits"),
        }
    }
}

impl Credits {
    pub const ZERO: Credits = Credits(0);

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}
