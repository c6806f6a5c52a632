//! Domain events for order execution.
//!
//! The aggregate buffers events as it changes state; the application layer
//! drains and publishes them after a successful save.

use serde::{Deserialize, Serialize};

use super::value_objects::{OrderSide, OrderType};
use crate::domain::shared::{BrokerId, Money, OrderId, Quantity, Symbol, Timestamp, UserId};

/// All possible order events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEvent {
    /// Order created.
    Created(OrderCreated),
    /// Order acknowledged by the venue.
    Submitted(OrderSubmitted),
    /// A fill was applied (emitted for every fill).
    PartiallyFilled(OrderPartiallyFilled),
    /// The fill that completed the order.
    Filled(OrderFilled),
    /// Order cancelled.
    Cancelled(OrderCancelled),
    /// Order rejected.
    Rejected(OrderRejected),
}

impl OrderEvent {
    /// Get the order ID for this event.
    #[must_use]
    pub fn order_id(&self) -> &OrderId {
        match self {
            Self::Created(e) => &e.order_id,
            Self::Submitted(e) => &e.order_id,
            Self::PartiallyFilled(e) => &e.order_id,
            Self::Filled(e) => &e.order_id,
            Self::Cancelled(e) => &e.order_id,
            Self::Rejected(e) => &e.order_id,
        }
    }

    /// Get the timestamp when this event occurred.
    #[must_use]
    pub fn occurred_at(&self) -> Timestamp {
        match self {
            Self::Created(e) => e.occurred_at,
            Self::Submitted(e) => e.occurred_at,
            Self::PartiallyFilled(e) => e.occurred_at,
            Self::Filled(e) => e.occurred_at,
            Self::Cancelled(e) => e.occurred_at,
            Self::Rejected(e) => e.occurred_at,
        }
    }

    /// Get the event type name.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Created(_) => "ORDER_CREATED",
            Self::Submitted(_) => "ORDER_SUBMITTED",
            Self::PartiallyFilled(_) => "ORDER_PARTIALLY_FILLED",
            Self::Filled(_) => "ORDER_FILLED",
            Self::Cancelled(_) => "ORDER_CANCELLED",
            Self::Rejected(_) => "ORDER_REJECTED",
        }
    }
}

/// Event: Order created in `PENDING`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
    /// Order ID.
    pub order_id: OrderId,
    /// Owner.
    pub user_id: UserId,
    /// Symbol.
    pub symbol: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Quantity.
    pub quantity: Quantity,
    /// Limit price (if applicable).
    pub price: Option<Money>,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: Order acknowledged by the venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSubmitted {
    /// Order ID.
    pub order_id: OrderId,
    /// Venue reference, if the ack carried one.
    pub broker_order_id: Option<BrokerId>,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: Fill applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPartiallyFilled {
    /// Order ID.
    pub order_id: OrderId,
    /// Fill quantity for this execution.
    pub fill_quantity: Quantity,
    /// Fill price for this execution.
    pub fill_price: Money,
    /// Commission for this execution.
    pub commission: Money,
    /// Cumulative quantity filled.
    pub cumulative_quantity: Quantity,
    /// Remaining quantity to fill.
    pub remaining_quantity: Quantity,
    /// Weighted-average fill price after this execution.
    pub average_fill_price: Money,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: Order completely filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilled {
    /// Order ID.
    pub order_id: OrderId,
    /// Total quantity filled.
    pub total_quantity: Quantity,
    /// Weighted-average fill price.
    pub average_fill_price: Money,
    /// Commission across all fills.
    pub total_commission: Money,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: Order cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    /// Order ID.
    pub order_id: OrderId,
    /// Reason supplied by the caller.
    pub reason: Option<String>,
    /// Quantity that was filled before cancellation.
    pub filled_quantity: Quantity,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: Order rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRejected {
    /// Order ID.
    pub order_id: OrderId,
    /// Rejection message from the venue.
    pub reason: String,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}
