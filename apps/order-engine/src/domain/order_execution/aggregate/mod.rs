//! Order Aggregate
//!
//! The aggregate root for order execution.

mod order;
mod snapshot;

pub use order::{CreateOrderCommand, DEFAULT_MAX_ORDER_QUANTITY, Order};
pub use snapshot::OrderSnapshot;
