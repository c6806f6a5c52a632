//! Cumulative fill state of an order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Fill;
use crate::domain::shared::{DomainError, Money, Quantity};

/// Running totals over every fill applied to an order.
///
/// Keeps `order_qty = filled_qty + remaining_qty` and the
/// quantity-weighted average of fill prices. Values are immutable;
/// [`FillAccumulator::apply`] returns the next state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillAccumulator {
    order_qty: Quantity,
    filled_qty: Quantity,
    average_price: Money,
    total_commission: Money,
}

impl FillAccumulator {
    /// Empty accumulator for an order of `order_qty`.
    #[must_use]
    pub const fn new(order_qty: Quantity) -> Self {
        Self {
            order_qty,
            filled_qty: Quantity::ZERO,
            average_price: Money::ZERO,
            total_commission: Money::ZERO,
        }
    }

    /// Rebuild from persisted totals.
    ///
    /// # Errors
    ///
    /// Returns error if the totals are inconsistent: filled outside
    /// `[0, order_qty]`, a negative average, or a non-zero average with
    /// nothing filled.
    pub fn restore(
        order_qty: Quantity,
        filled_qty: Quantity,
        average_price: Money,
        total_commission: Money,
    ) -> Result<Self, DomainError> {
        if filled_qty.amount() < Decimal::ZERO || filled_qty > order_qty {
            return Err(DomainError::invalid(
                "filled_quantity",
                format!("filled quantity {filled_qty} outside [0, {order_qty}]"),
            ));
        }
        if average_price.is_negative() {
            return Err(DomainError::invalid(
                "average_fill_price",
                "average fill price cannot be negative",
            ));
        }
        if filled_qty.is_zero() && !average_price.is_zero() {
            return Err(DomainError::invalid(
                "average_fill_price",
                "average fill price must be zero when nothing is filled",
            ));
        }
        if filled_qty.is_positive() && !average_price.is_positive() {
            return Err(DomainError::invalid(
                "average_fill_price",
                "average fill price must be positive once filled",
            ));
        }
        if average_price
            .amount()
            .checked_mul(filled_qty.amount())
            .is_none()
        {
            return Err(out_of_range("average_fill_price"));
        }
        Ok(Self {
            order_qty,
            filled_qty,
            average_price,
            total_commission,
        })
    }

    /// Ordered quantity.
    #[must_use]
    pub const fn order_qty(&self) -> Quantity {
        self.order_qty
    }

    /// Quantity filled so far.
    #[must_use]
    pub const fn filled_qty(&self) -> Quantity {
        self.filled_qty
    }

    /// Quantity still open.
    #[must_use]
    pub fn remaining_qty(&self) -> Quantity {
        self.order_qty - self.filled_qty
    }

    /// Weighted-average fill price, zero when nothing is filled.
    #[must_use]
    pub const fn average_price(&self) -> Money {
        self.average_price
    }

    /// Sum of fill commissions.
    #[must_use]
    pub const fn total_commission(&self) -> Money {
        self.total_commission
    }

    /// True once the full quantity has executed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.filled_qty == self.order_qty
    }

    /// True if some but not all of the quantity has executed.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.filled_qty.is_positive() && !self.is_complete()
    }

    /// Filled fraction of the order, in `[0, 1]`.
    #[must_use]
    pub fn fill_ratio(&self) -> Decimal {
        if self.order_qty.is_positive() {
            self.filled_qty.amount() / self.order_qty.amount()
        } else {
            Decimal::ZERO
        }
    }

    /// `average_price * filled_qty`.
    ///
    /// Always representable: [`FillAccumulator::apply`] and
    /// [`FillAccumulator::restore`] refuse totals whose notional overflows.
    #[must_use]
    pub fn filled_notional(&self) -> Money {
        self.average_price * self.filled_qty.amount()
    }

    /// True if `qty` more would exceed the ordered quantity.
    #[must_use]
    pub fn would_overfill(&self, qty: Quantity) -> bool {
        qty > self.remaining_qty()
    }

    /// State after applying `fill`.
    ///
    /// `new_avg = (avg * filled + price * qty) / (filled + qty)`.
    ///
    /// # Errors
    ///
    /// Returns error if the fill is not positive, would overfill, or its
    /// notional or the new totals fall outside the `Decimal` range. `self`
    /// is never modified.
    pub fn apply(&self, fill: &Fill) -> Result<Self, DomainError> {
        fill.validate()?;
        if self.would_overfill(fill.quantity) {
            return Err(DomainError::InvariantViolation {
                aggregate: "FillAccumulator".to_string(),
                invariant: "filled_qty <= order_qty".to_string(),
                state: format!(
                    "filled={}, fill={}, order={}",
                    self.filled_qty, fill.quantity, self.order_qty
                ),
            });
        }

        // Cannot overflow: fill.quantity <= remaining_qty.
        let new_filled = self.filled_qty + fill.quantity;
        let old_value = self
            .average_price
            .amount()
            .checked_mul(self.filled_qty.amount())
            .ok_or_else(|| out_of_range("average_fill_price"))?;
        let fill_value = fill
            .price
            .amount()
            .checked_mul(fill.quantity.amount())
            .ok_or_else(|| out_of_range("fill_price"))?;
        let new_avg = old_value
            .checked_add(fill_value)
            .and_then(|total| total.checked_div(new_filled.amount()))
            .ok_or_else(|| out_of_range("fill_price"))?;
        new_avg
            .checked_mul(new_filled.amount())
            .ok_or_else(|| out_of_range("fill_price"))?;
        let total_commission = self
            .total_commission
            .amount()
            .checked_add(fill.commission.amount())
            .ok_or_else(|| out_of_range("commission"))?;

        let next = Self {
            order_qty: self.order_qty,
            filled_qty: new_filled,
            average_price: Money::new(new_avg),
            total_commission: Money::new(total_commission),
        };
        debug_assert!(next.filled_qty <= next.order_qty);
        Ok(next)
    }
}

fn out_of_range(field: &str) -> DomainError {
    DomainError::invalid(field, "value exceeds the representable decimal range")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_fill(qty: i64, price: Decimal) -> Fill {
        Fill::new(Quantity::from_i64(qty), Money::new(price))
    }

    #[test]
    fn new_accumulator_is_empty() {
        let acc = FillAccumulator::new(Quantity::from_i64(100));
        assert_eq!(acc.filled_qty(), Quantity::ZERO);
        assert_eq!(acc.remaining_qty(), Quantity::from_i64(100));
        assert_eq!(acc.average_price(), Money::ZERO);
        assert!(!acc.is_partial());
        assert!(!acc.is_complete());
    }

    #[test]
    fn weighted_average_over_fills() {
        let acc = FillAccumulator::new(Quantity::from_i64(100));
        let acc = acc.apply(&make_fill(40, dec!(150.00))).unwrap();
        assert_eq!(acc.average_price().amount(), dec!(150.00));
        assert!(acc.is_partial());

        let acc = acc.apply(&make_fill(60, dec!(151.00))).unwrap();
        assert_eq!(acc.average_price().amount(), dec!(150.60));
        assert!(acc.is_complete());
        assert_eq!(acc.remaining_qty(), Quantity::ZERO);
        assert_eq!(acc.filled_notional().amount(), dec!(15060.00));
    }

    #[test]
    fn commission_accumulates_including_rebates() {
        let acc = FillAccumulator::new(Quantity::from_i64(10));
        let acc = acc
            .apply(&make_fill(5, dec!(10)).with_commission(Money::new(dec!(1.00))))
            .unwrap();
        let acc = acc
            .apply(&make_fill(5, dec!(10)).with_commission(Money::new(dec!(-0.25))))
            .unwrap();
        assert_eq!(acc.total_commission().amount(), dec!(0.75));
    }

    #[test]
    fn overfill_is_rejected_and_state_kept() {
        let acc = FillAccumulator::new(Quantity::from_i64(100))
            .apply(&make_fill(80, dec!(10)))
            .unwrap();
        let before = acc;
        assert!(acc.would_overfill(Quantity::from_i64(21)));
        assert!(acc.apply(&make_fill(21, dec!(10))).is_err());
        assert_eq!(acc, before);
    }

    #[test]
    fn huge_quantity_is_overfill_not_overflow() {
        let acc = FillAccumulator::new(Quantity::from_i64(1000))
            .apply(&make_fill(1, dec!(10)))
            .unwrap();
        assert!(acc.would_overfill(Quantity::new(Decimal::MAX)));
        let err = acc
            .apply(&Fill::new(Quantity::new(Decimal::MAX), Money::new(dec!(1))))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation { .. }));
    }

    #[test]
    fn notional_overflow_is_rejected() {
        let acc = FillAccumulator::new(Quantity::from_i64(1000));
        let price = Decimal::from_i128_with_scale(10_i128.pow(28), 0);
        let err = acc.apply(&make_fill(100, price)).unwrap_err();
        assert_eq!(err.field(), "fill_price");
        assert_eq!(acc, FillAccumulator::new(Quantity::from_i64(1000)));

        let acc = acc.apply(&make_fill(1, Decimal::MAX)).unwrap();
        assert!(acc.apply(&make_fill(1, Decimal::MAX)).is_err());
        assert_eq!(acc.filled_notional().amount(), Decimal::MAX);
    }

    #[test]
    fn restore_rejects_unrepresentable_notional() {
        let err = FillAccumulator::restore(
            Quantity::from_i64(100),
            Quantity::from_i64(10),
            Money::new(Decimal::MAX),
            Money::ZERO,
        )
        .unwrap_err();
        assert_eq!(err.field(), "average_fill_price");
    }

    #[test]
    fn invalid_fill_is_rejected() {
        let acc = FillAccumulator::new(Quantity::from_i64(100));
        let err = acc.apply(&make_fill(0, dec!(10))).unwrap_err();
        assert_eq!(err.field(), "fill_quantity");
    }

    #[test]
    fn fill_ratio() {
        let acc = FillAccumulator::new(Quantity::from_i64(100))
            .apply(&make_fill(25, dec!(10)))
            .unwrap();
        assert_eq!(acc.fill_ratio(), dec!(0.25));
    }

    #[test]
    fn restore_validates_totals() {
        let qty = Quantity::from_i64(100);
        assert!(
            FillAccumulator::restore(qty, Quantity::from_i64(50), Money::new(dec!(10)), Money::ZERO)
                .is_ok()
        );
        assert!(
            FillAccumulator::restore(qty, Quantity::from_i64(101), Money::new(dec!(10)), Money::ZERO)
                .is_err()
        );
        assert!(
            FillAccumulator::restore(qty, Quantity::ZERO, Money::new(dec!(10)), Money::ZERO)
                .is_err()
        );
        assert!(
            FillAccumulator::restore(qty, Quantity::from_i64(1), Money::ZERO, Money::ZERO).is_err()
        );
    }
}
