//! Position Aggregate

mod position;
mod snapshot;

pub use position::Position;
pub use snapshot::PositionSnapshot;
