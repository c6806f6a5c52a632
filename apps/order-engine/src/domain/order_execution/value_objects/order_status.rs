//! Order status in the lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status.
///
/// ```text
/// PENDING ──submit──▶ SUBMITTED ──fill──▶ PARTIALLY_FILLED ──fill──▶ FILLED
///    │                    │                       │
///    ├──reject──▶ REJECTED◀┘                       │
///    └──────────────cancel──▶ CANCELLED ◀──────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order created, not yet acknowledged by the venue.
    Pending,
    /// Order acknowledged, awaiting executions.
    Submitted,
    /// Some but not all of the quantity has executed.
    PartiallyFilled,
    /// The full quantity has executed.
    Filled,
    /// Order cancelled; any earlier fills are kept.
    Cancelled,
    /// Order rejected by the venue.
    Rejected,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Submitted,
        Self::PartiallyFilled,
        Self::Filled,
        Self::Cancelled,
        Self::Rejected,
    ];

    /// Returns true if the order is in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled | Self::Rejected)
    }

    /// Returns true if the order is still working.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the order can be cancelled.
    #[must_use]
    pub const fn is_cancelable(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the order can receive fills.
    ///
    /// `Pending` is included: a fill before the ack acts as the ack.
    #[must_use]
    pub const fn can_fill(&self) -> bool {
        matches!(self, Self::Pending | Self::Submitted | Self::PartiallyFilled)
    }

    /// Returns true if the venue can still reject the order.
    #[must_use]
    pub const fn can_reject(&self) -> bool {
        matches!(self, Self::Pending | Self::Submitted)
    }

    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Submitted => "SUBMITTED",
            Self::PartiallyFilled => "PARTIALLY_FILLED",
            Self::Filled => "FILLED",
            Self::Cancelled => "CANCELLED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_is_terminal() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Submitted.is_terminal());
        assert!(!OrderStatus::PartiallyFilled.is_terminal());
        assert!(OrderStatus::Filled.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Rejected.is_terminal());
    }

    #[test]
    fn order_status_can_fill() {
        assert!(OrderStatus::Pending.can_fill());
        assert!(OrderStatus::Submitted.can_fill());
        assert!(OrderStatus::PartiallyFilled.can_fill());
        assert!(!OrderStatus::Filled.can_fill());
        assert!(!OrderStatus::Cancelled.can_fill());
    }

    #[test]
    fn order_status_can_reject() {
        assert!(OrderStatus::Pending.can_reject());
        assert!(OrderStatus::Submitted.can_reject());
        assert!(!OrderStatus::PartiallyFilled.can_reject());
        assert!(!OrderStatus::Rejected.can_reject());
    }

    #[test]
    fn active_is_complement_of_terminal() {
        for status in OrderStatus::ALL {
            assert_eq!(status.is_active(), !status.is_terminal());
            assert_eq!(status.is_cancelable(), status.is_active());
        }
    }

    #[test]
    fn order_status_display_matches_serde() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn order_status_serde() {
        let parsed: OrderStatus = serde_json::from_str("\"PARTIALLY_FILLED\"").unwrap();
        assert_eq!(parsed, OrderStatus::PartiallyFilled);
        assert!(serde_json::from_str::<OrderStatus>("\"CANCELED\"").is_err());
    }
}
