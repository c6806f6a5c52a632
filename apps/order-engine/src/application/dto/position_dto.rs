//! Position DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::position::{Position, PositionDirection};
use crate::domain::shared::Timestamp;

/// DTO representing a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionDto {
    /// Position ID.
    pub position_id: String,
    /// Owner.
    pub user_id: String,
    /// Symbol.
    pub symbol: String,
    /// Direction.
    pub direction: PositionDirection,
    /// Signed quantity.
    pub quantity: Decimal,
    /// Average entry price.
    pub average_price: Decimal,
    /// Last mark.
    pub current_price: Decimal,
    /// Market value at the last mark.
    pub market_value: Decimal,
    /// Unrealized P&L.
    pub unrealized_pnl: Decimal,
    /// Realized P&L.
    pub realized_pnl: Decimal,
    /// Total commission.
    pub commission: Decimal,
    /// Opened at.
    pub opened_at: Timestamp,
    /// Updated at.
    pub updated_at: Timestamp,
}

impl PositionDto {
    /// Create from domain Position, rounding prices and P&L to
    /// `price_scale` decimal places.
    #[must_use]
    pub fn from_position(position: &Position, price_scale: u32) -> Self {
        Self {
            position_id: position.id().to_string(),
            user_id: position.user_id().to_string(),
            symbol: position.symbol().to_string(),
            direction: position.direction(),
            quantity: position.quantity(),
            average_price: position.average_price().round_dp(price_scale).amount(),
            current_price: position.current_price().amount(),
            market_value: position.market_value().round_dp(price_scale).amount(),
            unrealized_pnl: position.unrealized_pnl().round_dp(price_scale).amount(),
            realized_pnl: position.realized_pnl().round_dp(price_scale).amount(),
            commission: position.total_commission().amount(),
            opened_at: position.opened_at(),
            updated_at: position.updated_at(),
        }
    }
}
