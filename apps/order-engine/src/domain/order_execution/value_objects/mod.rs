//! Order Execution Value Objects
//!
//! Immutable types for order management.

mod fill;
mod fill_accumulator;
mod order_side;
mod order_status;
mod order_type;

pub use fill::Fill;
pub use fill_accumulator::FillAccumulator;
pub use order_side::OrderSide;
pub use order_status::OrderStatus;
pub use order_type::OrderType;
