//! Application Ports
//!
//! Driven ports the use cases call out through.

mod event_publisher_port;

pub use event_publisher_port::{
    EventPublishError, EventPublisherPort, NoOpEventPublisher, TracingEventPublisher,
};
