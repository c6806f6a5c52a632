//! Flat, serializable image of an order.

use serde::{Deserialize, Serialize};

use crate::domain::order_execution::value_objects::{OrderSide, OrderStatus, OrderType};
use crate::domain::shared::{
    BrokerId, Money, OrderId, Quantity, StrategyId, Symbol, Timestamp, UserId,
};

/// Every persisted attribute of an [`super::Order`].
///
/// Decimals serialize as strings, timestamps as RFC 3339 and enums in
/// `SCREAMING_SNAKE_CASE`. Produced by `Order::to_snapshot` and checked
/// by `Order::from_snapshot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    /// Order ID.
    pub id: OrderId,
    /// Owner.
    pub user_id: UserId,
    /// Symbol.
    pub symbol: Symbol,
    /// Order type.
    pub order_type: OrderType,
    /// Side.
    pub side: OrderSide,
    /// Ordered quantity.
    pub quantity: Quantity,
    /// Limit price.
    #[serde(default)]
    pub price: Option<Money>,
    /// Stop trigger price.
    #[serde(default)]
    pub stop_price: Option<Money>,
    /// Quantity filled so far.
    pub filled_quantity: Quantity,
    /// Weighted-average fill price, zero when unfilled.
    pub average_fill_price: Money,
    /// Commission across all fills.
    #[serde(default)]
    pub total_commission: Money,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// When the order was placed.
    pub submitted_at: Timestamp,
    /// Last change.
    pub updated_at: Timestamp,
    /// Correlation key of the originating strategy.
    #[serde(default)]
    pub strategy_id: Option<StrategyId>,
    /// Venue reference from the ack.
    #[serde(default)]
    pub broker_order_id: Option<BrokerId>,
    /// Rejection message.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Optimistic concurrency version.
    #[serde(default)]
    pub version: u64,
}
