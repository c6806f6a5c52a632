//! Signal Repository Trait

use async_trait::async_trait;

use super::errors::SignalError;
use super::signal::TradingSignal;
use crate::domain::shared::{SignalId, Timestamp, UserId};

/// Repository trait for trading signals.
#[async_trait]
pub trait SignalRepository: Send + Sync {
    /// Store a signal.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateSignalId` if the id is taken.
    async fn insert(&self, signal: &TradingSignal) -> Result<(), SignalError>;

    /// Find a signal by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_id(&self, id: &SignalId) -> Result<Option<TradingSignal>, SignalError>;

    /// All signals for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<TradingSignal>, SignalError>;

    /// Unexpired signals for a user at `now`, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_active(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Vec<TradingSignal>, SignalError>;

    /// Remove signals expired at `now`; returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns error if the deletion fails.
    async fn purge_expired(&self, now: Timestamp) -> Result<usize, SignalError>;
}
