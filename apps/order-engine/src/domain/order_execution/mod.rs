//! Order Execution Bounded Context
//!
//! Manages the order lifecycle from placement to a terminal state.
//!
//! # Key Concepts
//!
//! - **Order Aggregate**: The root entity managing order state transitions
//! - **Fill Accumulator**: `filled <= quantity` with a weighted-average fill price
//! - **Domain Events**: Capturing all state transitions

pub mod aggregate;
pub mod errors;
pub mod events;
pub mod repository;
pub mod services;
pub mod value_objects;

pub use aggregate::{CreateOrderCommand, DEFAULT_MAX_ORDER_QUANTITY, Order, OrderSnapshot};
pub use errors::OrderError;
pub use events::{
    OrderCancelled, OrderCreated, OrderEvent, OrderFilled, OrderPartiallyFilled, OrderRejected,
    OrderSubmitted,
};
pub use repository::OrderRepository;
pub use services::OrderStateMachine;
pub use value_objects::{Fill, FillAccumulator, OrderSide, OrderStatus, OrderType};
