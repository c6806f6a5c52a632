//! Dependency Injection Container
//!
//! Wires the in-memory repositories, the event publisher and the services.

use std::sync::Arc;

use crate::application::ports::EventPublisherPort;
use crate::application::use_cases::{OrderService, PositionService, SignalService};
use crate::config::EngineConfig;
use crate::infrastructure::persistence::{
    InMemoryOrderRepository, InMemoryPositionRepository, InMemorySignalRepository,
};

/// Order service over the in-memory repositories.
pub type InMemoryOrderService<E> =
    OrderService<InMemoryOrderRepository, InMemoryPositionRepository, E>;

/// Dependency injection container.
pub struct Container<E>
where
    E: EventPublisherPort + 'static,
{
    order_repo: Arc<InMemoryOrderRepository>,
    position_repo: Arc<InMemoryPositionRepository>,
    event_publisher: Arc<E>,
    orders: Arc<InMemoryOrderService<E>>,
    positions: Arc<PositionService<InMemoryPositionRepository>>,
    signals: Arc<SignalService<InMemorySignalRepository>>,
}

impl<E> Container<E>
where
    E: EventPublisherPort + 'static,
{
    /// Build every component for the given engine settings.
    pub fn new(config: &EngineConfig, event_publisher: Arc<E>) -> Self {
        let order_repo = Arc::new(InMemoryOrderRepository::new());
        let position_repo = Arc::new(InMemoryPositionRepository::new());
        let signal_repo = Arc::new(InMemorySignalRepository::new());

        let positions = Arc::new(PositionService::new(Arc::clone(&position_repo)));
        let orders = Arc::new(OrderService::new(
            Arc::clone(&order_repo),
            Arc::clone(&positions),
            Arc::clone(&event_publisher),
            config.max_order_quantity,
        ));
        let signals = Arc::new(SignalService::new(signal_repo));

        Self {
            order_repo,
            position_repo,
            event_publisher,
            orders,
            positions,
            signals,
        }
    }

    /// Get the order repository.
    pub fn order_repo(&self) -> Arc<InMemoryOrderRepository> {
        Arc::clone(&self.order_repo)
    }

    /// Get the position repository.
    pub fn position_repo(&self) -> Arc<InMemoryPositionRepository> {
        Arc::clone(&self.position_repo)
    }

    /// Get the event publisher.
    pub fn event_publisher(&self) -> Arc<E> {
        Arc::clone(&self.event_publisher)
    }

    /// Get the order service.
    pub fn orders(&self) -> Arc<InMemoryOrderService<E>> {
        Arc::clone(&self.orders)
    }

    /// Get the position service.
    pub fn positions(&self) -> Arc<PositionService<InMemoryPositionRepository>> {
        Arc::clone(&self.positions)
    }

    /// Get the signal service.
    pub fn signals(&self) -> Arc<SignalService<InMemorySignalRepository>> {
        Arc::clone(&self.signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::NoOpEventPublisher;
    use crate::domain::order_execution::{CreateOrderCommand, OrderSide, OrderType};
    use crate::domain::shared::{Quantity, Symbol, UserId};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn services_share_repositories() {
        let config = EngineConfig {
            max_order_quantity: dec!(10),
            price_scale: 2,
        };
        let container = Container::new(&config, Arc::new(NoOpEventPublisher));

        let cmd = CreateOrderCommand {
            id: None,
            user_id: UserId::new("u"),
            symbol: Symbol::new("TCS"),
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            quantity: Quantity::from_i64(5),
            price: None,
            stop_price: None,
            strategy_id: None,
        };
        container.orders().place_order(cmd.clone()).await.unwrap();
        assert_eq!(container.order_repo().len().await, 1);

        let mut too_big = cmd;
        too_big.quantity = Quantity::from_i64(11);
        assert!(container.orders().place_order(too_big).await.is_err());
        assert!(container.position_repo().is_empty().await);
    }
}
