//! Order Service
//!
//! Drives the order lifecycle: placement, venue acknowledgement, fills,
//! cancellation and rejection. Each mutation loads the order, applies the
//! domain operation, saves with the loaded version and then publishes the
//! order's events. Mutations of one order are serialized behind that
//! order's lock; different orders proceed in parallel.

use std::sync::Arc;

use rust_decimal::Decimal;

use super::locks::LockRegistry;
use super::position_service::{PositionService, PositionUpdate};
use crate::application::ports::EventPublisherPort;
use crate::domain::order_execution::{
    CreateOrderCommand, Fill, Order, OrderError, OrderEvent, OrderRepository, OrderStatus,
};
use crate::domain::position::PositionRepository;
use crate::domain::shared::{BrokerId, OrderId, UserId};
use crate::error::EngineError;

/// Result of recording a fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillOutcome {
    /// Order after the fill.
    pub order: Order,
    /// Position after the fill.
    pub position: PositionUpdate,
}

/// Use case for the order lifecycle.
pub struct OrderService<O, P, E>
where
    O: OrderRepository,
    P: PositionRepository,
    E: EventPublisherPort,
{
    order_repo: Arc<O>,
    positions: Arc<PositionService<P>>,
    event_publisher: Arc<E>,
    max_order_quantity: Decimal,
    locks: LockRegistry<OrderId>,
}

impl<O, P, E> OrderService<O, P, E>
where
    O: OrderRepository,
    P: PositionRepository,
    E: EventPublisherPort,
{
    /// Create a new `OrderService`.
    pub fn new(
        order_repo: Arc<O>,
        positions: Arc<PositionService<P>>,
        event_publisher: Arc<E>,
        max_order_quantity: Decimal,
    ) -> Self {
        Self {
            order_repo,
            positions,
            event_publisher,
            max_order_quantity,
            locks: LockRegistry::new(),
        }
    }

    /// Position service fed by this service's fills.
    pub const fn positions(&self) -> &Arc<PositionService<P>> {
        &self.positions
    }

    /// Validate and store a new order in `PENDING`.
    pub async fn place_order(&self, cmd: CreateOrderCommand) -> Result<Order, EngineError> {
        let mut order = Order::new(cmd, self.max_order_quantity)?;
        let events = order.drain_events();
        self.order_repo.insert(&order).await?;

        tracing::info!(
            order_id = %order.id(),
            user_id = %order.user_id(),
            symbol = %order.symbol(),
            side = %order.side(),
            quantity = %order.quantity(),
            "Order placed"
        );
        self.publish(order.id(), events).await;
        Ok(order)
    }

    /// Record the venue acknowledgement.
    pub async fn submit(
        &self,
        order_id: &OrderId,
        broker_order_id: Option<BrokerId>,
    ) -> Result<Order, EngineError> {
        self.mutate(order_id, |order| order.submit(broker_order_id))
            .await
    }

    /// Apply a fill to the order and to the owner's position.
    ///
    /// The fill is checked against the order first, then applied to the
    /// position, and only then is the order saved. A fill the position
    /// refuses therefore leaves the stored order untouched.
    ///
    /// A fill for an order that is already cancelled, rejected or filled is
    /// refused with `InvalidStateTransition` and logged at WARN so it can be
    /// reconciled.
    pub async fn record_fill(
        &self,
        order_id: &OrderId,
        fill: Fill,
    ) -> Result<FillOutcome, EngineError> {
        let guard = self.locks.acquire(order_id).await;

        let mut order = self.load(order_id).await?;
        let expected = order.version();
        if let Err(err) = order.apply_fill(fill.clone()) {
            if matches!(err, OrderError::InvalidStateTransition { from, .. } if from.is_terminal())
            {
                tracing::warn!(
                    order_id = %order_id,
                    status = %order.status(),
                    fill_quantity = %fill.quantity,
                    fill_price = %fill.price,
                    fill_id = fill.fill_id.as_deref().unwrap_or(""),
                    "Late fill for terminal order rejected"
                );
            }
            return Err(err.into());
        }

        let position = self
            .positions
            .apply_fill(order.user_id(), order.symbol(), order.side(), &fill)
            .await?;

        let events = order.drain_events();
        if let Err(err) = self.order_repo.save(&order, expected).await {
            tracing::error!(
                order_id = %order_id,
                user_id = %order.user_id(),
                symbol = %order.symbol(),
                error = %err,
                "Position updated but order save failed"
            );
            return Err(err.into());
        }

        tracing::info!(
            order_id = %order_id,
            status = %order.status(),
            filled_quantity = %order.filled_quantity(),
            average_fill_price = %order.average_fill_price(),
            "Fill recorded"
        );
        self.publish(order_id, events).await;

        if order.is_terminal() {
            drop(guard);
            self.locks.prune().await;
        }

        Ok(FillOutcome { order, position })
    }

    /// Cancel the order, keeping any fills already applied.
    pub async fn cancel(
        &self,
        order_id: &OrderId,
        reason: Option<String>,
    ) -> Result<Order, EngineError> {
        self.mutate(order_id, |order| order.cancel(reason)).await
    }

    /// Reject the order with the venue's message.
    pub async fn reject(&self, order_id: &OrderId, reason: String) -> Result<Order, EngineError> {
        self.mutate(order_id, |order| order.reject(reason)).await
    }

    /// Get an order by ID.
    pub async fn get_order(&self, order_id: &OrderId) -> Result<Order, EngineError> {
        Ok(self.load(order_id).await?)
    }

    /// Get an order by the venue's ID.
    pub async fn get_by_broker_id(&self, broker_id: &BrokerId) -> Result<Option<Order>, EngineError> {
        Ok(self.order_repo.find_by_broker_id(broker_id).await?)
    }

    /// All orders placed by a user.
    pub async fn orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, EngineError> {
        Ok(self.order_repo.find_by_user(user_id).await?)
    }

    /// Orders in a given status.
    pub async fn orders_with_status(&self, status: OrderStatus) -> Result<Vec<Order>, EngineError> {
        Ok(self.order_repo.find_by_status(status).await?)
    }

    /// Orders that can still change.
    pub async fn active_orders(&self) -> Result<Vec<Order>, EngineError> {
        Ok(self.order_repo.find_active().await?)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn load(&self, order_id: &OrderId) -> Result<Order, OrderError> {
        self.order_repo
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound {
                order_id: order_id.clone(),
            })
    }

    async fn mutate<F>(&self, order_id: &OrderId, op: F) -> Result<Order, EngineError>
    where
        F: FnOnce(&mut Order) -> Result<(), OrderError> + Send,
    {
        let guard = self.locks.acquire(order_id).await;

        let mut order = self.load(order_id).await?;
        let expected = order.version();
        let from = order.status();
        op(&mut order)?;

        let events = order.drain_events();
        self.order_repo.save(&order, expected).await?;

        tracing::info!(
            order_id = %order_id,
            from = %from,
            to = %order.status(),
            "Order status changed"
        );
        self.publish(order_id, events).await;

        if order.is_terminal() {
            drop(guard);
            self.locks.prune().await;
        }

        Ok(order)
    }

    async fn publish(
        &self,
        order_id: &OrderId,
        events: Vec<OrderEvent>,
    ) {
        if events.is_empty() {
            return;
        }
        if let Err(e) = self.event_publisher.publish_order_events(events).await {
            tracing::error!(order_id = %order_id, error = %e, "Failed to publish order events");
        }
    }
}
