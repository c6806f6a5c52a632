//! Flat, serializable image of a position.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{Money, PositionId, Symbol, Timestamp, UserId};

/// Every persisted attribute of a [`super::Position`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// Position ID.
    pub id: PositionId,
    /// Owner.
    pub user_id: UserId,
    /// Symbol.
    pub symbol: Symbol,
    /// Signed quantity: positive long, negative short.
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    /// Weighted-average entry price, zero when flat.
    pub average_price: Money,
    /// Last mark.
    pub current_price: Money,
    /// `(current_price - average_price) * quantity`.
    pub unrealized_pnl: Money,
    /// P&L locked in by closing fills.
    #[serde(default)]
    pub realized_pnl: Money,
    /// Commission across all fills.
    #[serde(default)]
    pub total_commission: Money,
    /// When the position was first opened.
    pub opened_at: Timestamp,
    /// Last change.
    pub updated_at: Timestamp,
    /// Optimistic concurrency version.
    #[serde(default)]
    pub version: u64,
}
