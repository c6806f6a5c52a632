//! Domain Layer
//!
//! The innermost layer containing business logic with zero infrastructure dependencies.
//! This layer defines:
//!
//! - **Aggregates**: Consistency boundaries with invariants
//! - **Value Objects**: Immutable domain types with equality by value
//! - **Domain Events**: Records of state transitions
//! - **Domain Services**: Stateless business logic
//! - **Repository Traits**: Persistence abstractions (implemented in adapters)
//!
//! # Bounded Contexts
//!
//! - [`order_execution`]: Order lifecycle and fill accumulation
//! - [`position`]: Signed positions and P&L
//! - [`signals`]: Advisory trading signals

pub mod order_execution;
pub mod position;
pub mod shared;
pub mod signals;
