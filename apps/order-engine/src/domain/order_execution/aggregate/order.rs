//! Order Aggregate Root
//!
//! The Order aggregate manages the lifecycle of an order from placement to
//! a terminal state, accumulating partial fills along the way.

use rust_decimal::Decimal;

use super::OrderSnapshot;
use crate::domain::order_execution::errors::OrderError;
use crate::domain::order_execution::events::{
    OrderCancelled, OrderCreated, OrderEvent, OrderFilled, OrderPartiallyFilled, OrderRejected,
    OrderSubmitted,
};
use crate::domain::order_execution::services::OrderStateMachine;
use crate::domain::order_execution::value_objects::{
    Fill, FillAccumulator, OrderSide, OrderStatus, OrderType,
};
use crate::domain::shared::{
    BrokerId, Money, OrderId, Quantity, StrategyId, Symbol, Timestamp, UserId,
};

/// Upper bound on order quantity when no configuration overrides it.
pub const DEFAULT_MAX_ORDER_QUANTITY: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Command to create a new order.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    /// Caller-chosen id; generated when absent.
    pub id: Option<OrderId>,
    /// Owner of the order.
    pub user_id: UserId,
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Quantity to trade.
    pub quantity: Quantity,
    /// Limit price (required for Limit/StopLimit).
    pub price: Option<Money>,
    /// Stop price (required for Stop/StopLimit).
    pub stop_price: Option<Money>,
    /// Strategy correlation key.
    pub strategy_id: Option<StrategyId>,
}

impl CreateOrderCommand {
    /// Validate the command parameters.
    ///
    /// # Errors
    ///
    /// Returns `Validation` naming the first offending field.
    pub fn validate(&self, max_quantity: Decimal) -> Result<(), OrderError> {
        if self.id.as_ref().is_some_and(OrderId::is_blank) {
            return Err(OrderError::validation("id", "order id cannot be blank"));
        }
        if self.user_id.is_blank() {
            return Err(OrderError::validation("user_id", "user id cannot be empty"));
        }
        self.symbol.validate()?;
        self.quantity.validate_for_order(max_quantity)?;
        validate_prices(self.order_type, self.price, self.stop_price)
    }
}

fn validate_prices(
    order_type: OrderType,
    price: Option<Money>,
    stop_price: Option<Money>,
) -> Result<(), OrderError> {
    if order_type.requires_limit_price() && price.is_none() {
        return Err(OrderError::validation(
            "price",
            format!("price required for {order_type} orders"),
        ));
    }
    if order_type.requires_stop_price() && stop_price.is_none() {
        return Err(OrderError::validation(
            "stop_price",
            format!("stop price required for {order_type} orders"),
        ));
    }
    if let Some(price) = price {
        price.validate_price("price")?;
    }
    if let Some(stop) = stop_price {
        stop.validate_price("stop_price")?;
    }
    Ok(())
}

/// Order Aggregate Root.
///
/// Invariants held after every operation:
/// - `0 <= filled_quantity <= quantity`
/// - `average_fill_price` is the quantity-weighted mean of applied fills
/// - `FILLED` iff fully filled, `PARTIALLY_FILLED` iff partly filled
/// - terminal orders never change again
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    symbol: Symbol,
    side: OrderSide,
    order_type: OrderType,
    price: Option<Money>,
    stop_price: Option<Money>,
    fills: FillAccumulator,
    status: OrderStatus,
    strategy_id: Option<StrategyId>,
    broker_order_id: Option<BrokerId>,
    error_message: Option<String>,
    submitted_at: Timestamp,
    updated_at: Timestamp,
    version: u64,
    events: Vec<OrderEvent>,
}

impl Order {
    /// Create a new order in `PENDING` from a command.
    ///
    /// Generates an `OrderCreated` event.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the command is invalid.
    pub fn new(cmd: CreateOrderCommand, max_quantity: Decimal) -> Result<Self, OrderError> {
        cmd.validate(max_quantity)?;

        let id = cmd.id.unwrap_or_else(OrderId::generate);
        let now = Timestamp::now();

        let mut order = Self {
            id,
            user_id: cmd.user_id,
            symbol: cmd.symbol,
            side: cmd.side,
            order_type: cmd.order_type,
            price: cmd.price,
            stop_price: cmd.stop_price,
            fills: FillAccumulator::new(cmd.quantity),
            status: OrderStatus::Pending,
            strategy_id: cmd.strategy_id,
            broker_order_id: None,
            error_message: None,
            submitted_at: now,
            updated_at: now,
            version: 0,
            events: Vec::new(),
        };

        order.events.push(OrderEvent::Created(OrderCreated {
            order_id: order.id.clone(),
            user_id: order.user_id.clone(),
            symbol: order.symbol.clone(),
            side: order.side,
            order_type: order.order_type,
            quantity: cmd.quantity,
            price: order.price,
            occurred_at: now,
        }));

        Ok(order)
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Get the order ID.
    #[must_use]
    pub const fn id(&self) -> &OrderId {
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

    /// Get the order side.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Get the order type.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Get the ordered quantity.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.fills.order_qty()
    }

    /// Get the limit price.
    #[must_use]
    pub const fn price(&self) -> Option<Money> {
        self.price
    }

    /// Get the stop price.
    #[must_use]
    pub const fn stop_price(&self) -> Option<Money> {
        self.stop_price
    }

    /// Get the quantity filled so far.
    #[must_use]
    pub const fn filled_quantity(&self) -> Quantity {
        self.fills.filled_qty()
    }

    /// Get the weighted-average fill price (zero when unfilled).
    #[must_use]
    pub const fn average_fill_price(&self) -> Money {
        self.fills.average_price()
    }

    /// Get the commission accumulated across fills.
    #[must_use]
    pub const fn total_commission(&self) -> Money {
        self.fills.total_commission()
    }

    /// Get the quantity still open.
    #[must_use]
    pub fn remaining_quantity(&self) -> Quantity {
        self.fills.remaining_qty()
    }

    /// Filled fraction, in `[0, 1]`.
    #[must_use]
    pub fn fill_ratio(&self) -> Decimal {
        self.fills.fill_ratio()
    }

    /// Notional value filled so far.
    #[must_use]
    pub fn filled_notional(&self) -> Money {
        self.fills.filled_notional()
    }

    /// Get the current status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// True if the order is `FILLED`, `CANCELLED` or `REJECTED`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Get the strategy correlation key.
    #[must_use]
    pub const fn strategy_id(&self) -> Option<&StrategyId> {
        self.strategy_id.as_ref()
    }

    /// Get the broker order ID.
    #[must_use]
    pub const fn broker_order_id(&self) -> Option<&BrokerId> {
        self.broker_order_id.as_ref()
    }

    /// Get the rejection message.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Get the placement timestamp.
    #[must_use]
    pub const fn submitted_at(&self) -> Timestamp {
        self.submitted_at
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
    // State Transitions
    // ========================================================================

    /// Record the venue acknowledgement.
    ///
    /// Generates an `OrderSubmitted` event.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` unless the order is `PENDING`.
    pub fn submit(&mut self, broker_order_id: Option<BrokerId>) -> Result<(), OrderError> {
        OrderStateMachine::validate_transition(self.status, OrderStatus::Submitted)?;

        let now = Timestamp::now();
        self.mark_submitted(broker_order_id, now);
        self.touch(now);
        Ok(())
    }

    /// Apply a fill given as its parts.
    ///
    /// # Errors
    ///
    /// See [`Order::apply_fill`].
    pub fn add_fill(
        &mut self,
        fill_quantity: Quantity,
        fill_price: Money,
        commission: Money,
    ) -> Result<(), OrderError> {
        self.apply_fill(Fill::new(fill_quantity, fill_price).with_commission(commission))
    }

    /// Apply a fill to the order.
    ///
    /// A fill on a `PENDING` order acts as the acknowledgement: an
    /// `OrderSubmitted` event precedes the fill events. Every fill emits
    /// `OrderPartiallyFilled`; the completing fill also emits `OrderFilled`.
    ///
    /// # Errors
    ///
    /// - `Validation` if quantity or price is not positive
    /// - `InvalidStateTransition` if the order is terminal
    /// - `Overfill` if the fill exceeds the remaining quantity
    ///
    /// On error the order is unchanged.
    pub fn apply_fill(&mut self, fill: Fill) -> Result<(), OrderError> {
        fill.validate()?;

        let target = if fill.quantity >= self.remaining_quantity() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        if !self.status.can_fill() {
            return Err(OrderError::InvalidStateTransition {
                from: self.status,
                to: target,
            });
        }
        if self.fills.would_overfill(fill.quantity) {
            return Err(OrderError::Overfill {
                fill_quantity: fill.quantity,
                filled_quantity: self.filled_quantity(),
                quantity: self.quantity(),
            });
        }
        let acked_from = match self.status {
            OrderStatus::Pending => OrderStatus::Submitted,
            other => other,
        };
        OrderStateMachine::validate_transition(acked_from, target)?;
        let next = self.fills.apply(&fill)?;

        let now = Timestamp::now();
        if self.status == OrderStatus::Pending {
            self.mark_submitted(None, now);
        }
        self.fills = next;
        self.status = target;

        self.events
            .push(OrderEvent::PartiallyFilled(OrderPartiallyFilled {
                order_id: self.id.clone(),
                fill_quantity: fill.quantity,
                fill_price: fill.price,
                commission: fill.commission,
                cumulative_quantity: self.fills.filled_qty(),
                remaining_quantity: self.fills.remaining_qty(),
                average_fill_price: self.fills.average_price(),
                occurred_at: now,
            }));

        if self.status == OrderStatus::Filled {
            self.events.push(OrderEvent::Filled(OrderFilled {
                order_id: self.id.clone(),
                total_quantity: self.fills.filled_qty(),
                average_fill_price: self.fills.average_price(),
                total_commission: self.fills.total_commission(),
                occurred_at: now,
            }));
        }

        self.touch(now);
        Ok(())
    }

    /// Cancel the order. Fills already applied are kept.
    ///
    /// Generates an `OrderCancelled` event.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` if the order is terminal.
    pub fn cancel(&mut self, reason: Option<String>) -> Result<(), OrderError> {
        OrderStateMachine::validate_transition(self.status, OrderStatus::Cancelled)?;

        let now = Timestamp::now();
        self.status = OrderStatus::Cancelled;
        self.events.push(OrderEvent::Cancelled(OrderCancelled {
            order_id: self.id.clone(),
            reason,
            filled_quantity: self.fills.filled_qty(),
            occurred_at: now,
        }));
        self.touch(now);
        Ok(())
    }

    /// Reject the order, recording the venue's message.
    ///
    /// Generates an `OrderRejected` event.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` unless `PENDING` or `SUBMITTED`.
    pub fn reject(&mut self, reason: impl Into<String>) -> Result<(), OrderError> {
        OrderStateMachine::validate_transition(self.status, OrderStatus::Rejected)?;

        let reason = reason.into();
        let now = Timestamp::now();
        self.status = OrderStatus::Rejected;
        self.error_message = Some(reason.clone());
        self.events.push(OrderEvent::Rejected(OrderRejected {
            order_id: self.id.clone(),
            reason,
            occurred_at: now,
        }));
        self.touch(now);
        Ok(())
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Flat copy of every attribute, for persistence and API responses.
    #[must_use]
    pub fn to_snapshot(&self) -> OrderSnapshot {
        OrderSnapshot {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            symbol: self.symbol.clone(),
            order_type: self.order_type,
            side: self.side,
            quantity: self.quantity(),
            price: self.price,
            stop_price: self.stop_price,
            filled_quantity: self.filled_quantity(),
            average_fill_price: self.average_fill_price(),
            total_commission: self.total_commission(),
            status: self.status,
            submitted_at: self.submitted_at,
            updated_at: self.updated_at,
            strategy_id: self.strategy_id.clone(),
            broker_order_id: self.broker_order_id.clone(),
            error_message: self.error_message.clone(),
            version: self.version,
        }
    }

    /// Rebuild an order from a snapshot (no events generated).
    ///
    /// No quantity ceiling is applied: the order was accepted under
    /// whatever limit was in force when it was placed.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the snapshot breaks any order invariant.
    pub fn from_snapshot(snapshot: OrderSnapshot) -> Result<Self, OrderError> {
        if snapshot.id.is_blank() {
            return Err(OrderError::validation("id", "order id cannot be blank"));
        }
        if snapshot.user_id.is_blank() {
            return Err(OrderError::validation("user_id", "user id cannot be empty"));
        }
        snapshot.symbol.validate()?;
        snapshot.quantity.validate_positive("quantity")?;
        validate_prices(snapshot.order_type, snapshot.price, snapshot.stop_price)?;

        let fills = FillAccumulator::restore(
            snapshot.quantity,
            snapshot.filled_quantity,
            snapshot.average_fill_price,
            snapshot.total_commission,
        )?;

        let consistent = match snapshot.status {
            OrderStatus::Pending | OrderStatus::Submitted | OrderStatus::Rejected => {
                fills.filled_qty().is_zero()
            }
            OrderStatus::PartiallyFilled => fills.is_partial(),
            OrderStatus::Filled => fills.is_complete(),
            OrderStatus::Cancelled => !fills.is_complete(),
        };
        if !consistent {
            return Err(OrderError::validation(
                "status",
                format!(
                    "status {} inconsistent with filled quantity {} of {}",
                    snapshot.status, snapshot.filled_quantity, snapshot.quantity
                ),
            ));
        }
        Ok(Self {
            id: snapshot.id,
            user_id: snapshot.user_id,
            symbol: snapshot.symbol,
            side: snapshot.side,
            order_type: snapshot.order_type,
            price: snapshot.price,
            stop_price: snapshot.stop_price,
            fills,
            status: snapshot.status,
            strategy_id: snapshot.strategy_id,
            broker_order_id: snapshot.broker_order_id,
            error_message: snapshot.error_message,
            submitted_at: snapshot.submitted_at,
            updated_at: snapshot.updated_at,
            version: snapshot.version,
            events: Vec::new(),
        })
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Drain accumulated domain events.
    pub fn drain_events(&mut self) -> Vec<OrderEvent> {
        std::mem::take(&mut self.events)
    }

    /// Get pending events without draining.
    #[must_use]
    pub fn pending_events(&self) -> &[OrderEvent] {
        &self.events
    }

    // ========================================================================
    // Private Helpers
    // ========================================================================

    fn mark_submitted(&mut self, broker_order_id: Option<BrokerId>, now: Timestamp) {
        if broker_order_id.is_some() {
            self.broker_order_id.clone_from(&broker_order_id);
        }
        self.status = OrderStatus::Submitted;
        self.events.push(OrderEvent::Submitted(OrderSubmitted {
            order_id: self.id.clone(),
            broker_order_id,
            occurred_at: now,
        }));
    }

    fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
        self.version += 1;
    }
}
