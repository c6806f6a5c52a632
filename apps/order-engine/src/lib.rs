// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Order Engine - Rust Core Library
//!
//! Order lifecycle and position bookkeeping: orders move from `PENDING` to a
//! terminal status while partial fills accumulate into a weighted-average
//! fill price, and every fill updates the owner's signed position.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic (aggregates, value objects, domain events)
//!   - `order_execution`: Order aggregate, status lifecycle, fill accumulation
//!   - `position`: Position aggregate, netting and mark-to-market P&L
//!   - `signals`: Advisory trading signals with expiry
//!   - `shared`: Money, Quantity, Symbol, Timestamp, identifiers
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: Interfaces for external systems (`EventPublisherPort`)
//!   - `use_cases`: `OrderService`, `PositionService`, `SignalService`
//!   - `dto`: Data transfer objects for API boundaries
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `persistence`: In-memory repositories with optimistic versioning
//!   - `journal`: JSON-lines command journal replay
//!   - `container`: Dependency injection container

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// Engine-level errors and error codes.
pub mod error;

/// Logging setup.
pub mod telemetry;

// =============================================================================
// Re-exports from Clean Architecture
// =============================================================================

// Domain re-exports
pub use domain::order_execution::{
    CreateOrderCommand, Fill, FillAccumulator, Order, OrderError, OrderEvent, OrderSide,
    OrderSnapshot, OrderStatus, OrderType,
};
pub use domain::position::{Position, PositionDirection, PositionError, PositionSnapshot};
pub use domain::shared::{
    BrokerId, Money, OrderId, PositionId, Quantity, SignalId, StrategyId, Symbol, Timestamp,
    UserId,
};
pub use domain::signals::{SignalError, SignalParams, SignalType, TradingSignal};

// Application re-exports
pub use application::dto::{OrderDto, PlaceOrderDto, PositionDto};
pub use application::ports::{EventPublisherPort, NoOpEventPublisher, TracingEventPublisher};
pub use application::use_cases::{
    FillOutcome, OrderService, PositionService, PositionUpdate, SignalService,
};

// Infrastructure re-exports
pub use infrastructure::Container;
pub use infrastructure::persistence::{
    InMemoryOrderRepository, InMemoryPositionRepository, InMemorySignalRepository,
};

// Cross-cutting re-exports
pub use error::{EngineError, ErrorCode};
