//! Order DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::aggregate::{CreateOrderCommand, Order};
use crate::domain::order_execution::value_objects::{OrderSide, OrderStatus, OrderType};
use crate::domain::shared::{Money, OrderId, Quantity, StrategyId, Symbol, Timestamp, UserId};

/// DTO for placing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderDto {
    /// Caller-chosen order ID.
    #[serde(default)]
    pub order_id: Option<String>,
    /// Owner.
    pub user_id: String,
    /// Symbol.
    pub symbol: String,
    /// Side.
    pub side: OrderSide,
    /// Type.
    pub order_type: OrderType,
    /// Quantity.
    pub quantity: Decimal,
    /// Limit price.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Stop price.
    #[serde(default)]
    pub stop_price: Option<Decimal>,
    /// Strategy correlation key.
    #[serde(default)]
    pub strategy_id: Option<String>,
}

impl PlaceOrderDto {
    /// Convert to the domain command. Validation happens in the aggregate.
    #[must_use]
    pub fn into_command(self) -> CreateOrderCommand {
        CreateOrderCommand {
            id: self.order_id.map(OrderId::new),
            user_id: UserId::new(self.user_id),
            symbol: Symbol::new(self.symbol),
            side: self.side,
            order_type: self.order_type,
            quantity: Quantity::new(self.quantity),
            price: self.price.map(Money::new),
            stop_price: self.stop_price.map(Money::new),
            strategy_id: self.strategy_id.map(StrategyId::new),
        }
    }
}

/// DTO representing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDto {
    /// Order ID.
    pub order_id: String,
    /// Owner.
    pub user_id: String,
    /// Broker ID.
    pub broker_id: Option<String>,
    /// Symbol.
    pub symbol: String,
    /// Side.
    pub side: OrderSide,
    /// Type.
    pub order_type: OrderType,
    /// Quantity.
    pub quantity: Decimal,
    /// Filled quantity.
    pub filled_qty: Decimal,
    /// Remaining quantity.
    pub remaining_qty: Decimal,
    /// Limit price.
    pub price: Option<Decimal>,
    /// Stop price.
    pub stop_price: Option<Decimal>,
    /// Average fill price, absent until the first fill.
    pub avg_fill_price: Option<Decimal>,
    /// Total commission.
    pub commission: Decimal,
    /// Status.
    pub status: OrderStatus,
    /// Strategy correlation key.
    pub strategy_id: Option<String>,
    /// Rejection message.
    pub error_message: Option<String>,
    /// Placed at.
    pub submitted_at: Timestamp,
    /// Updated at.
    pub updated_at: Timestamp,
}

impl OrderDto {
    /// Create from domain Order, rounding the average fill price to
    /// `price_scale` decimal places.
    #[must_use]
    pub fn from_order(order: &Order, price_scale: u32) -> Self {
        Self {
            order_id: order.id().to_string(),
            user_id: order.user_id().to_string(),
            broker_id: order.broker_order_id().map(|id| id.to_string()),
            symbol: order.symbol().to_string(),
            side: order.side(),
            order_type: order.order_type(),
            quantity: order.quantity().amount(),
            filled_qty: order.filled_quantity().amount(),
            remaining_qty: order.remaining_quantity().amount(),
            price: order.price().map(|m| m.amount()),
            stop_price: order.stop_price().map(|m| m.amount()),
            avg_fill_price: if order.filled_quantity().is_zero() {
                None
            } else {
                Some(order.average_fill_price().round_dp(price_scale).amount())
            },
            commission: order.total_commission().amount(),
            status: order.status(),
            strategy_id: order.strategy_id().map(|id| id.to_string()),
            error_message: order.error_message().map(str::to_string),
            submitted_at: order.submitted_at(),
            updated_at: order.updated_at(),
        }
    }
}
