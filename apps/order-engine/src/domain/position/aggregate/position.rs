//! Position Aggregate Root
//!
//! Signed exposure in one symbol for one user, fed by order fills and
//! marked to market externally.

use rust_decimal::Decimal;

use super::PositionSnapshot;
use crate::domain::order_execution::{Fill, OrderSide};
use crate::domain::position::PositionDirection;
use crate::domain::position::errors::PositionError;
use crate::domain::shared::{Money, PositionId, Symbol, Timestamp, UserId};

/// Position Aggregate Root.
///
/// Invariant: `unrealized_pnl = (current_price - average_price) * quantity`
/// with signed quantity, so a short gains when the price falls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    id: PositionId,
    user_id: UserId,
    symbol: Symbol,
    quantity: Decimal,
    average_price: Money,
    current_price: Money,
    unrealized_pnl: Money,
    realized_pnl: Money,
    total_commission: Money,
    opened_at: Timestamp,
    updated_at: Timestamp,
    version: u64,
}

impl Position {
    /// Open a position with a signed quantity at an entry price.
    ///
    /// The position is marked at its entry price.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the user id is blank, the symbol is invalid,
    /// the quantity is zero or the price is not positive.
    pub fn new(
        user_id: UserId,
        symbol: Symbol,
        quantity: Decimal,
        average_price: Money,
    ) -> Result<Self, PositionError> {
        if user_id.is_blank() {
            return Err(PositionError::validation(
                "user_id",
                "user id cannot be empty",
            ));
        }
        symbol.validate()?;
        if quantity.is_zero() {
            return Err(PositionError::validation(
                "quantity",
                "opening quantity cannot be zero",
            ));
        }
        average_price.validate_price("average_price")?;
        unrealized_at(average_price, average_price, quantity)?;

        let now = Timestamp::now();
        Ok(Self {
            id: PositionId::generate(),
            user_id,
            symbol,
            quantity,
            average_price,
            current_price: average_price,
            unrealized_pnl: Money::ZERO,
            realized_pnl: Money::ZERO,
            total_commission: Money::ZERO,
            opened_at: now,
            updated_at: now,
            version: 0,
        })
    }

    /// Open a position from the first fill of an order.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the fill or identifiers are invalid.
    pub fn open(
        user_id: UserId,
        symbol: Symbol,
        side: OrderSide,
        fill: &Fill,
    ) -> Result<Self, PositionError> {
        fill.validate()?;
        let mut position = Self::new(
            user_id,
            symbol,
            side.signed(fill.quantity.amount()),
            fill.price,
        )?;
        position.total_commission = fill.commission;
        Ok(position)
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Get the position ID.
    #[must_use]
    pub const fn id(&self) -> &PositionId {
        &self.id
    }

    /// Get the owner.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Get the symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Signed quantity: positive long, negative short.
    #[must_use]
    pub const fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Get the weighted-average entry price.
    #[must_use]
    pub const fn average_price(&self) -> Money {
        self.average_price
    }

    /// Get the last mark.
    #[must_use]
    pub const fn current_price(&self) -> Money {
        self.current_price
    }

    /// Get the unrealized P&L at the last mark.
    #[must_use]
    pub const fn unrealized_pnl(&self) -> Money {
        self.unrealized_pnl
    }

    /// Get the P&L realized by closing fills (before commission).
    #[must_use]
    pub const fn realized_pnl(&self) -> Money {
        self.realized_pnl
    }

    /// Get the commission across all fills.
    #[must_use]
    pub const fn total_commission(&self) -> Money {
        self.total_commission
    }

    /// Get the direction.
    #[must_use]
    pub fn direction(&self) -> PositionDirection {
        PositionDirection::of(self.quantity)
    }

    /// True when no quantity is open.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.quantity.is_zero()
    }

    /// `|quantity| * current_price`.
    ///
    /// Always representable: every mutation refuses a mark or quantity
    /// whose market value overflows.
    #[must_use]
    pub fn market_value(&self) -> Money {
        self.current_price * self.quantity.abs()
    }

    /// Get the opening timestamp.
    #[must_use]
    pub const fn opened_at(&self) -> Timestamp {
        self.opened_at
    }

    /// Get the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Get the optimistic concurrency version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Mark the position to a new market price.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `new_price` is not positive or the P&L it
    /// implies is out of range.
    pub fn update_price(&mut self, new_price: Money) -> Result<(), PositionError> {
        new_price.validate_price("price")?;
        let unrealized = unrealized_at(new_price, self.average_price, self.quantity)?;

        self.current_price = new_price;
        self.unrealized_pnl = unrealized;
        self.touch();
        Ok(())
    }

    /// Apply an order fill and return the P&L it realized.
    ///
    /// Same-direction fills re-weight the average price. Opposing fills
    /// realize `(fill_price - average_price) * closed_qty * sign(quantity)`
    /// on the closed part; any excess flips the position and opens at the
    /// fill price. A fill that exactly closes leaves the position flat with
    /// a zero average price. The fill price becomes the new mark.
    ///
    /// # Errors
    ///
    /// Returns `SymbolMismatch` if `symbol` is not this position's symbol and
    /// `Validation` if the fill is invalid or the resulting totals are out of
    /// range. On error nothing changes.
    pub fn apply_fill(
        &mut self,
        symbol: &Symbol,
        side: OrderSide,
        fill: &Fill,
    ) -> Result<Money, PositionError> {
        if symbol != &self.symbol {
            return Err(PositionError::SymbolMismatch {
                expected: self.symbol.clone(),
                actual: symbol.clone(),
            });
        }
        fill.validate()?;

        let price = fill.price.amount();
        let average = self.average_price.amount();
        let qty_change = side.signed(fill.quantity.amount());
        let old_qty = self.quantity;
        let new_qty = old_qty
            .checked_add(qty_change)
            .ok_or_else(|| out_of_range("quantity"))?;

        let (average_price, realized) =
            if old_qty.is_zero() || old_qty.is_sign_positive() == qty_change.is_sign_positive() {
                let old_value = old_qty.abs().checked_mul(average);
                let new_value = qty_change.abs().checked_mul(price);
                let reweighted = old_value
                    .zip(new_value)
                    .and_then(|(a, b)| a.checked_add(b))
                    .and_then(|total| total.checked_div(new_qty.abs()))
                    .ok_or_else(|| out_of_range("fill_price"))?;
                (Money::new(reweighted), Decimal::ZERO)
            } else {
                let closed_qty = qty_change.abs().min(old_qty.abs());
                let gain = price
                    .checked_sub(average)
                    .and_then(|diff| diff.checked_mul(closed_qty))
                    .ok_or_else(|| out_of_range("fill_price"))?;
                let realized = if old_qty.is_sign_negative() { -gain } else { gain };

                let average_price = if new_qty.is_zero() {
                    Money::ZERO
                } else if new_qty.is_sign_positive() != old_qty.is_sign_positive() {
                    fill.price
                } else {
                    self.average_price
                };
                (average_price, realized)
            };

        let realized_pnl = self
            .realized_pnl
            .amount()
            .checked_add(realized)
            .ok_or_else(|| out_of_range("realized_pnl"))?;
        let total_commission = self
            .total_commission
            .amount()
            .checked_add(fill.commission.amount())
            .ok_or_else(|| out_of_range("commission"))?;
        let unrealized = unrealized_at(fill.price, average_price, new_qty)?;

        if old_qty.is_zero() {
            self.opened_at = fill.timestamp;
        }
        self.quantity = new_qty;
        self.average_price = average_price;
        self.realized_pnl = Money::new(realized_pnl);
        self.total_commission = Money::new(total_commission);
        self.current_price = fill.price;
        self.unrealized_pnl = unrealized;
        self.touch();

        Ok(Money::new(realized))
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Flat copy of every attribute.
    #[must_use]
    pub fn to_snapshot(&self) -> PositionSnapshot {
        PositionSnapshot {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            symbol: self.symbol.clone(),
            quantity: self.quantity,
            average_price: self.average_price,
            current_price: self.current_price,
            unrealized_pnl: self.unrealized_pnl,
            realized_pnl: self.realized_pnl,
            total_commission: self.total_commission,
            opened_at: self.opened_at,
            updated_at: self.updated_at,
            version: self.version,
        }
    }

    /// Rebuild a position from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the snapshot is internally inconsistent.
    pub fn from_snapshot(snapshot: PositionSnapshot) -> Result<Self, PositionError> {
        if snapshot.id.is_blank() {
            return Err(PositionError::validation("id", "position id cannot be blank"));
        }
        if snapshot.user_id.is_blank() {
            return Err(PositionError::validation(
                "user_id",
                "user id cannot be empty",
            ));
        }
        snapshot.symbol.validate()?;
        if snapshot.current_price.is_negative() {
            return Err(PositionError::validation(
                "current_price",
                "current price cannot be negative",
            ));
        }
        if snapshot.quantity.is_zero() {
            if !snapshot.average_price.is_zero() {
                return Err(PositionError::validation(
                    "average_price",
                    "flat position must have a zero average price",
                ));
            }
        } else {
            snapshot.average_price.validate_price("average_price")?;
        }
        let expected = unrealized_at(
            snapshot.current_price,
            snapshot.average_price,
            snapshot.quantity,
        )?
        .amount();
        if snapshot.unrealized_pnl.amount() != expected {
            return Err(PositionError::validation(
                "unrealized_pnl",
                format!(
                    "unrealized P&L {} does not match {expected}",
                    snapshot.unrealized_pnl
                ),
            ));
        }

        Ok(Self {
            id: snapshot.id,
            user_id: snapshot.user_id,
            symbol: snapshot.symbol,
            quantity: snapshot.quantity,
            average_price: snapshot.average_price,
            current_price: snapshot.current_price,
            unrealized_pnl: snapshot.unrealized_pnl,
            realized_pnl: snapshot.realized_pnl,
            total_commission: snapshot.total_commission,
            opened_at: snapshot.opened_at,
            updated_at: snapshot.updated_at,
            version: snapshot.version,
        })
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
        self.version += 1;
    }
}

/// `(current - average) * quantity`, refusing marks whose P&L or market
/// value would overflow.
fn unrealized_at(
    current_price: Money,
    average_price: Money,
    quantity: Decimal,
) -> Result<Money, PositionError> {
    let current = current_price.amount();
    current
        .checked_mul(quantity.abs())
        .ok_or_else(|| out_of_range("current_price"))?;
    current
        .checked_sub(average_price.amount())
        .and_then(|diff| diff.checked_mul(quantity))
        .map(Money::new)
        .ok_or_else(|| out_of_range("current_price"))
}

fn out_of_range(field: &str) -> PositionError {
    PositionError::validation(field, "value exceeds the representable decimal range")
}
