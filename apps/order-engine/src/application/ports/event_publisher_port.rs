//! Event Publisher Port (Driven Port)
//!
//! Interface for publishing domain events to external systems.

use async_trait::async_trait;

use crate::domain::order_execution::events::OrderEvent;

/// Event publishing error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EventPublishError {
    /// Serialization error.
    #[error("Event serialization error: {message}")]
    SerializationError { message: String },

    /// Publishing failed.
    #[error("Event publish failed: {message}")]
    PublishFailed { message: String },
}

/// Port for publishing domain events.
///
/// Called after the aggregate has been saved; a publish failure is logged
/// and never rolls back the save.
#[async_trait]
pub trait EventPublisherPort: Send + Sync {
    /// Publish order events.
    async fn publish_order_events(&self, events: Vec<OrderEvent>) -> Result<(), EventPublishError>;

    /// Publish a single order event.
    async fn publish_order_event(&self, event: OrderEvent) -> Result<(), EventPublishError> {
        self.publish_order_events(vec![event]).await
    }
}

/// No-op event publisher.
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisherPort for NoOpEventPublisher {
    async fn publish_order_events(
        &self,
        _events: Vec<OrderEvent>,
    ) -> Result<(), EventPublishError> {
        Ok(())
    }
}

/// Publisher that writes every event to the log at INFO.
#[derive(Debug, Clone, Default)]
pub struct TracingEventPublisher;

#[async_trait]
impl EventPublisherPort for TracingEventPublisher {
    async fn publish_order_events(&self, events: Vec<OrderEvent>) -> Result<(), EventPublishError> {
        for event in events {
            let payload = serde_json::to_string(&event).map_err(|e| {
                EventPublishError::SerializationError {
                    message: e.to_string(),
                }
            })?;
            tracing::info!(
                order_id = %event.order_id(),
                event_type = event.event_type(),
                occurred_at = %event.occurred_at(),
                payload = %payload,
                "Order event"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_execution::events::{OrderCancelled, OrderSubmitted};
    use crate::domain::shared::{OrderId, Quantity, Timestamp};

    fn make_events() -> Vec<OrderEvent> {
        vec![
            OrderEvent::Submitted(OrderSubmitted {
                order_id: OrderId::new("order-1"),
                broker_order_id: None,
                occurred_at: Timestamp::now(),
            }),
            OrderEvent::Cancelled(OrderCancelled {
                order_id: OrderId::new("order-1"),
                reason: None,
                filled_quantity: Quantity::ZERO,
                occurred_at: Timestamp::now(),
            }),
        ]
    }

    #[test]
    fn no_op_publisher_succeeds() {
        let publisher = NoOpEventPublisher;
        tokio_test::assert_ok!(tokio_test::block_on(
            publisher.publish_order_events(make_events())
        ));
    }

    #[tokio::test]
    async fn tracing_publisher_succeeds() {
        let publisher = TracingEventPublisher;
        for event in make_events() {
            tokio_test::assert_ok!(publisher.publish_order_event(event).await);
        }
    }
}
