//! Order type (market, limit, stop, stop-limit).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order type specifying execution behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Market order - execute at best available price.
    Market,
    /// Limit order - execute at specified price or better.
    Limit,
    /// Stop order - becomes market order when stop price is reached.
    Stop,
    /// Stop-limit order - becomes limit order when stop price is reached.
    StopLimit,
}

impl OrderType {
    /// Returns true if this order type requires a limit price.
    #[must_use]
    pub const fn requires_limit_price(&self) -> bool {
        matches!(self, Self::Limit | Self::StopLimit)
    }

    /// Returns true if this order type requires a stop price.
    #[must_use]
    pub const fn requires_stop_price(&self) -> bool {
        matches!(self, Self::Stop | Self::StopLimit)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
            Self::Stop => write!(f, "STOP"),
            Self::StopLimit => write!(f, "STOP_LIMIT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(OrderType::Market, false, false ; "market")]
    #[test_case(OrderType::Limit, true, false ; "limit")]
    #[test_case(OrderType::Stop, false, true ; "stop")]
    #[test_case(OrderType::StopLimit, true, true ; "stop limit")]
    fn required_prices(order_type: OrderType, limit: bool, stop: bool) {
        assert_eq!(order_type.requires_limit_price(), limit);
        assert_eq!(order_type.requires_stop_price(), stop);
    }

    #[test]
    fn order_type_serde() {
        let json = serde_json::to_string(&OrderType::StopLimit).unwrap();
        assert_eq!(json, "\"STOP_LIMIT\"");
        assert_eq!(OrderType::StopLimit.to_string(), "STOP_LIMIT");
    }
}
