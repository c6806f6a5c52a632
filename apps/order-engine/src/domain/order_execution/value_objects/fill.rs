//! Execution fill reported by the venue.

use serde::{Deserialize, Serialize};

use crate::domain::shared::{DomainError, Money, Quantity, Timestamp};

/// A single execution against an order.
///
/// Commission is carried as reported; rebates arrive as negative amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    /// Venue execution id, when the venue supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_id: Option<String>,
    /// Quantity executed.
    pub quantity: Quantity,
    /// Execution price.
    pub price: Money,
    /// Commission charged for this execution.
    #[serde(default)]
    pub commission: Money,
    /// Execution time.
    #[serde(default = "Timestamp::now")]
    pub timestamp: Timestamp,
}

impl Fill {
    /// Create a fill with zero commission, stamped now.
    #[must_use]
    pub fn new(quantity: Quantity, price: Money) -> Self {
        Self {
            fill_id: None,
            quantity,
            price,
            commission: Money::ZERO,
            timestamp: Timestamp::now(),
        }
    }

    /// Set the commission.
    #[must_use]
    pub fn with_commission(mut self, commission: Money) -> Self {
        self.commission = commission;
        self
    }

    /// Set the venue execution id.
    #[must_use]
    pub fn with_id(mut self, fill_id: impl Into<String>) -> Self {
        self.fill_id = Some(fill_id.into());
        self
    }

    /// Set the execution time.
    #[must_use]
    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Notional value of this fill, `None` if it overflows.
    #[must_use]
    pub fn notional(&self) -> Option<Money> {
        self.price
            .amount()
            .checked_mul(self.quantity.amount())
            .map(Money::new)
    }

    /// Check quantity and price are positive.
    ///
    /// # Errors
    ///
    /// Returns error naming the offending field.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.quantity.validate_positive("fill_quantity")?;
        self.price.validate_price("fill_price")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn make_fill() -> Fill {
        Fill::new(Quantity::from_i64(100), Money::new(dec!(150.25)))
    }

    #[test]
    fn fill_defaults() {
        let fill = make_fill();
        assert!(fill.fill_id.is_none());
        assert_eq!(fill.commission, Money::ZERO);
    }

    #[test]
    fn fill_builders() {
        let ts = Timestamp::parse("2026-01-19T12:00:00Z").unwrap();
        let fill = make_fill()
            .with_commission(Money::new(dec!(-0.35)))
            .with_id("exec-1")
            .at(ts);
        assert_eq!(fill.commission.amount(), dec!(-0.35));
        assert_eq!(fill.fill_id.as_deref(), Some("exec-1"));
        assert_eq!(fill.timestamp, ts);
    }

    #[test]
    fn fill_notional() {
        assert_eq!(make_fill().notional(), Some(Money::new(dec!(15025.00))));

        let huge = Fill::new(Quantity::from_i64(100), Money::new(Decimal::MAX));
        assert_eq!(huge.notional(), None);
    }

    #[test]
    fn fill_validation_names_field() {
        let zero_qty = Fill::new(Quantity::ZERO, Money::new(dec!(1)));
        assert_eq!(zero_qty.validate().unwrap_err().field(), "fill_quantity");

        let bad_price = Fill::new(Quantity::from_i64(1), Money::new(dec!(-1)));
        assert_eq!(bad_price.validate().unwrap_err().field(), "fill_price");

        assert!(make_fill().validate().is_ok());
    }

    #[test]
    fn fill_deserializes_with_defaults() {
        let fill: Fill = serde_json::from_str(r#"{"quantity":"5","price":"10.5"}"#).unwrap();
        assert_eq!(fill.quantity, Quantity::from_i64(5));
        assert_eq!(fill.commission, Money::ZERO);
        assert!(fill.fill_id.is_none());
    }
}
