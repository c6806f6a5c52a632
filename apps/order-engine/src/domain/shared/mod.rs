//! Shared Domain Types
//!
//! Value objects and errors shared across bounded contexts.

pub mod errors;
pub mod value_objects;

pub use errors::DomainError;
pub use value_objects::{
    BrokerId, Money, OrderId, PositionId, Quantity, SignalId, StrategyId, Symbol, Timestamp,
    UserId,
};
