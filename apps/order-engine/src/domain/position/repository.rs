//! Position Repository Trait

use async_trait::async_trait;

use super::aggregate::Position;
use super::errors::PositionError;
use crate::domain::shared::{Symbol, UserId};

/// Repository trait for Position persistence.
///
/// At most one position exists per `(user_id, symbol)`. Writes are
/// optimistic, as for orders.
#[async_trait]
pub trait PositionRepository: Send + Sync {
    /// Store a newly opened position.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if the user already holds the symbol.
    async fn insert(&self, position: &Position) -> Result<(), PositionError>;

    /// Replace a stored position if its version is still `expected_version`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `ConcurrentModification`; nothing is written.
    async fn save(&self, position: &Position, expected_version: u64) -> Result<(), PositionError>;

    /// Find the position a user holds in a symbol.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find(&self, user_id: &UserId, symbol: &Symbol)
    -> Result<Option<Position>, PositionError>;

    /// All positions of a user, flat ones included.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Position>, PositionError>;

    /// All positions with non-zero quantity.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_open(&self) -> Result<Vec<Position>, PositionError>;

    /// Every stored position.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_all(&self) -> Result<Vec<Position>, PositionError>;
}
