//! Position Bounded Context
//!
//! Signed per-symbol exposure built from order fills, with realized and
//! unrealized P&L.

pub mod aggregate;
mod direction;
pub mod errors;
pub mod repository;

pub use aggregate::{Position, PositionSnapshot};
pub use direction::PositionDirection;
pub use errors::PositionError;
pub use repository::PositionRepository;
