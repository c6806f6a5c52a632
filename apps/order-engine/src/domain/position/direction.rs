//! Direction of a position.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way a position is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionDirection {
    /// Positive quantity.
    Long,
    /// Negative quantity.
    Short,
    /// No open quantity.
    Flat,
}

impl PositionDirection {
    /// Direction of a signed quantity.
    #[must_use]
    pub fn of(quantity: Decimal) -> Self {
        if quantity > Decimal::ZERO {
            Self::Long
        } else if quantity < Decimal::ZERO {
            Self::Short
        } else {
            Self::Flat
        }
    }
}

impl fmt::Display for PositionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
            Self::Flat => write!(f, "FLAT"),
        }
    }
}
