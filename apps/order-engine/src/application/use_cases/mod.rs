//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.

mod locks;
mod order_service;
mod position_service;
mod signal_service;

pub use locks::LockRegistry;
pub use order_service::{FillOutcome, OrderService};
pub use position_service::{PositionService, PositionUpdate};
pub use signal_service::SignalService;
