//! Order Repository Trait
//!
//! Defines the persistence abstraction for orders.
//! Implemented by adapters in the infrastructure layer.

use async_trait::async_trait;

use super::aggregate::Order;
use super::errors::OrderError;
use super::value_objects::OrderStatus;
use crate::domain::shared::{BrokerId, OrderId, UserId};

/// Repository trait for Order persistence.
///
/// Writes are optimistic: `save` succeeds only if the stored version still
/// equals the version the caller loaded.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Store a newly created order.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateOrderId` if an order with the same id exists.
    async fn insert(&self, order: &Order) -> Result<(), OrderError>;

    /// Replace a stored order.
    ///
    /// `expected_version` is the version the caller loaded before mutating.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order is not stored and
    /// `ConcurrentModification` if the stored version moved on. Nothing is
    /// written on error.
    async fn save(&self, order: &Order, expected_version: u64) -> Result<(), OrderError>;

    /// Find an order by its internal ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderError>;

    /// Find an order by broker's order ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_broker_id(&self, broker_id: &BrokerId) -> Result<Option<Order>, OrderError>;

    /// Find all orders with a given status.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, OrderError>;

    /// Find all orders belonging to a user.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderError>;

    /// Find all active (non-terminal) orders.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_active(&self) -> Result<Vec<Order>, OrderError>;

    /// Delete an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order is not stored.
    async fn delete(&self, id: &OrderId) -> Result<(), OrderError>;

    /// Check if an order exists.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn exists(&self, id: &OrderId) -> Result<bool, OrderError> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}
