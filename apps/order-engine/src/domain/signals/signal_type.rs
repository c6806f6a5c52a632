//! Direction a signal recommends.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::order_execution::OrderSide;

/// Recommendation carried by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalType {
    /// Open or add to a long.
    Buy,
    /// Reduce a long or open a short.
    Sell,
    /// No action.
    Hold,
}

impl SignalType {
    /// Order side that would act on the signal, if any.
    #[must_use]
    pub const fn side(&self) -> Option<OrderSide> {
        match self {
            Self::Buy => Some(OrderSide::Buy),
            Self::Sell => Some(OrderSide::Sell),
            Self::Hold => None,
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}
