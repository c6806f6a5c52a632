//! Signal Service
//!
//! Stores advisory trading signals and answers which ones are still live.

use std::sync::Arc;

use crate::domain::shared::{Timestamp, UserId};
use crate::domain::signals::{SignalParams, SignalRepository, TradingSignal};
use crate::error::EngineError;

/// Use case for trading signals.
pub struct SignalService<S>
where
    S: SignalRepository,
{
    signal_repo: Arc<S>,
}

impl<S> SignalService<S>
where
    S: SignalRepository,
{
    /// Create a new `SignalService`.
    pub const fn new(signal_repo: Arc<S>) -> Self {
        Self { signal_repo }
    }

    /// Validate and store a signal.
    pub async fn record(&self, params: SignalParams) -> Result<TradingSignal, EngineError> {
        let signal = TradingSignal::new(params)?;
        self.signal_repo.insert(&signal).await?;

        tracing::info!(
            signal_id = %signal.id(),
            user_id = %signal.user_id(),
            symbol = %signal.symbol(),
            signal_type = %signal.signal_type(),
            confidence = %signal.confidence_score(),
            "Signal recorded"
        );
        Ok(signal)
    }

    /// Unexpired signals for a user, newest first.
    pub async fn active_signals(&self, user_id: &UserId) -> Result<Vec<TradingSignal>, EngineError> {
        Ok(self.signal_repo.find_active(user_id, Timestamp::now()).await?)
    }

    /// Drop expired signals.
    pub async fn purge_expired(&self) -> Result<usize, EngineError> {
        let removed = self.signal_repo.purge_expired(Timestamp::now()).await?;
        if removed > 0 {
            tracing::debug!(removed, "Expired signals purged");
        }
        Ok(removed)
    }
}
