//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use order_engine::application::ports::{EventPublishError, EventPublisherPort};
use order_engine::config::EngineConfig;
use order_engine::domain::order_execution::{CreateOrderCommand, OrderEvent, OrderSide, OrderType};
use order_engine::domain::shared::{Money, OrderId, Quantity, Symbol, UserId};
use order_engine::infrastructure::Container;

/// Publisher that keeps every event for inspection.
#[derive(Debug, Default)]
pub struct CollectingPublisher {
    events: Mutex<Vec<OrderEvent>>,
}

impl CollectingPublisher {
    /// Event type names in publish order.
    pub async fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().await.iter().map(OrderEvent::event_type).collect()
    }

    /// Event type names for one order.
    pub async fn event_types_for(&self, order_id: &OrderId) -> Vec<&'static str> {
        self.events
            .lock()
            .await
            .iter()
            .filter(|e| e.order_id() == order_id)
            .map(OrderEvent::event_type)
            .collect()
    }
}

#[async_trait]
impl EventPublisherPort for CollectingPublisher {
    async fn publish_order_events(&self, events: Vec<OrderEvent>) -> Result<(), EventPublishError> {
        self.events.lock().await.extend(events);
        Ok(())
    }
}

/// Container with a collecting publisher and default limits.
pub fn container() -> (Container<CollectingPublisher>, Arc<CollectingPublisher>) {
    let publisher = Arc::new(CollectingPublisher::default());
    let container = Container::new(&EngineConfig::default(), Arc::clone(&publisher));
    (container, publisher)
}

/// Limit order command.
pub fn limit_order(
    id: &str,
    user: &str,
    symbol: &str,
    side: OrderSide,
    quantity: i64,
    price: Decimal,
) -> CreateOrderCommand {
    CreateOrderCommand {
        id: Some(OrderId::new(id)),
        user_id: UserId::new(user),
        symbol: Symbol::new(symbol),
        side,
        order_type: OrderType::Limit,
        quantity: Quantity::from_i64(quantity),
        price: Some(Money::new(price)),
        stop_price: None,
        strategy_id: None,
    }
}
