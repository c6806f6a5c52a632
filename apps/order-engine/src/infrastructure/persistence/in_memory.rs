//! In-memory repositories.
//!
//! Orders and positions are stored as snapshots and rebuilt on every read,
//! so callers always get an independent copy with an empty event buffer.
//! `save` checks the stored version against the one the caller loaded.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::order_execution::aggregate::{Order, OrderSnapshot};
use crate::domain::order_execution::errors::OrderError;
use crate::domain::order_execution::repository::OrderRepository;
use crate::domain::order_execution::value_objects::OrderStatus;
use crate::domain::position::{Position, PositionError, PositionRepository, PositionSnapshot};
use crate::domain::shared::{BrokerId, OrderId, SignalId, Symbol, Timestamp, UserId};
use crate::domain::signals::{SignalError, SignalRepository, TradingSignal};

// ============================================================================
// Orders
// ============================================================================

/// In-memory implementation of `OrderRepository`.
///
/// Suitable for testing, journal replay and development.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<OrderId, OrderSnapshot>>,
}

impl InMemoryOrderRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of orders in the repository.
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Check if the repository is empty.
    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }

    /// Clear all orders from the repository.
    pub async fn clear(&self) {
        self.orders.write().await.clear();
    }

    /// Every stored order, oldest first.
    pub async fn snapshots(&self) -> Vec<OrderSnapshot> {
        let orders = self.orders.read().await;
        let mut snapshots: Vec<OrderSnapshot> = orders.values().cloned().collect();
        snapshots.sort_by(|a, b| {
            a.submitted_at
                .cmp(&b.submitted_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        snapshots
    }

    async fn collect<F>(&self, keep: F) -> Result<Vec<Order>, OrderError>
    where
        F: Fn(&OrderSnapshot) -> bool + Send,
    {
        self.snapshots()
            .await
            .into_iter()
            .filter(|s| keep(s))
            .map(Order::from_snapshot)
            .collect()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: &Order) -> Result<(), OrderError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(order.id()) {
            return Err(OrderError::DuplicateOrderId {
                order_id: order.id().clone(),
            });
        }
        orders.insert(order.id().clone(), order.to_snapshot());
        Ok(())
    }

    async fn save(&self, order: &Order, expected_version: u64) -> Result<(), OrderError> {
        let mut orders = self.orders.write().await;
        let Some(stored) = orders.get_mut(order.id()) else {
            return Err(OrderError::NotFound {
                order_id: order.id().clone(),
            });
        };
        if stored.version != expected_version {
            return Err(OrderError::ConcurrentModification {
                order_id: order.id().clone(),
                expected: expected_version,
                actual: stored.version,
            });
        }
        *stored = order.to_snapshot();
        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderError> {
        let snapshot = self.orders.read().await.get(id).cloned();
        snapshot.map(Order::from_snapshot).transpose()
    }

    async fn find_by_broker_id(&self, broker_id: &BrokerId) -> Result<Option<Order>, OrderError> {
        let snapshot = self
            .orders
            .read()
            .await
            .values()
            .find(|s| s.broker_order_id.as_ref() == Some(broker_id))
            .cloned();
        snapshot.map(Order::from_snapshot).transpose()
    }

    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, OrderError> {
        self.collect(|s| s.status == status).await
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderError> {
        self.collect(|s| &s.user_id == user_id).await
    }

    async fn find_active(&self) -> Result<Vec<Order>, OrderError> {
        self.collect(|s| !s.status.is_terminal()).await
    }

    async fn delete(&self, id: &OrderId) -> Result<(), OrderError> {
        self.orders.write().await.remove(id);
        Ok(())
    }

    async fn exists(&self, id: &OrderId) -> Result<bool, OrderError> {
        Ok(self.orders.read().await.contains_key(id))
    }
}

// ============================================================================
// Positions
// ============================================================================

/// In-memory implementation of `PositionRepository`, keyed by user and
/// symbol.
#[derive(Debug, Default)]
pub struct InMemoryPositionRepository {
    positions: RwLock<HashMap<(UserId, Symbol), PositionSnapshot>>,
}

impl InMemoryPositionRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of positions in the repository.
    pub async fn len(&self) -> usize {
        self.positions.read().await.len()
    }

    /// Check if the repository is empty.
    pub async fn is_empty(&self) -> bool {
        self.positions.read().await.is_empty()
    }

    /// Every stored position, ordered by user then symbol.
    pub async fn snapshots(&self) -> Vec<PositionSnapshot> {
        let positions = self.positions.read().await;
        let mut snapshots: Vec<PositionSnapshot> = positions.values().cloned().collect();
        snapshots.sort_by(|a, b| {
            a.user_id
                .cmp(&b.user_id)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        snapshots
    }

    async fn collect<F>(&self, keep: F) -> Result<Vec<Position>, PositionError>
    where
        F: Fn(&PositionSnapshot) -> bool + Send,
    {
        self.snapshots()
            .await
            .into_iter()
            .filter(|s| keep(s))
            .map(Position::from_snapshot)
            .collect()
    }
}

#[async_trait]
impl PositionRepository for InMemoryPositionRepository {
    async fn insert(&self, position: &Position) -> Result<(), PositionError> {
        let key = (position.user_id().clone(), position.symbol().clone());
        let mut positions = self.positions.write().await;
        if positions.contains_key(&key) {
            return Err(PositionError::AlreadyExists {
                user_id: key.0,
                symbol: key.1,
            });
        }
        positions.insert(key, position.to_snapshot());
        Ok(())
    }

    async fn save(&self, position: &Position, expected_version: u64) -> Result<(), PositionError> {
        let key = (position.user_id().clone(), position.symbol().clone());
        let mut positions = self.positions.write().await;
        let Some(stored) = positions.get_mut(&key) else {
            return Err(PositionError::NotFound {
                user_id: key.0,
                symbol: key.1,
            });
        };
        if stored.version != expected_version || stored.id != *position.id() {
            return Err(PositionError::ConcurrentModification {
                position_id: position.id().clone(),
                expected: expected_version,
                actual: stored.version,
            });
        }
        *stored = position.to_snapshot();
        Ok(())
    }

    async fn find(
        &self,
        user_id: &UserId,
        symbol: &Symbol,
    ) -> Result<Option<Position>, PositionError> {
        let snapshot = self
            .positions
            .read()
            .await
            .get(&(user_id.clone(), symbol.clone()))
            .cloned();
        snapshot.map(Position::from_snapshot).transpose()
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Position>, PositionError> {
        self.collect(|s| &s.user_id == user_id).await
    }

    async fn find_open(&self) -> Result<Vec<Position>, PositionError> {
        self.collect(|s| !s.quantity.is_zero()).await
    }

    async fn find_all(&self) -> Result<Vec<Position>, PositionError> {
        self.collect(|_| true).await
    }
}

// ============================================================================
// Signals
// ============================================================================

/// In-memory implementation of `SignalRepository`.
#[derive(Debug, Default)]
pub struct InMemorySignalRepository {
    signals: RwLock<HashMap<SignalId, TradingSignal>>,
}

impl InMemorySignalRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of signals in the repository.
    pub async fn len(&self) -> usize {
        self.signals.read().await.len()
    }

    /// Check if the repository is empty.
    pub async fn is_empty(&self) -> bool {
        self.signals.read().await.is_empty()
    }

    async fn newest_first<F>(&self, keep: F) -> Vec<TradingSignal>
    where
        F: Fn(&TradingSignal) -> bool + Send,
    {
        let signals = self.signals.read().await;
        let mut found: Vec<TradingSignal> = signals.values().filter(|s| keep(s)).cloned().collect();
        found.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        found
    }
}

#[async_trait]
impl SignalRepository for InMemorySignalRepository {
    async fn insert(&self, signal: &TradingSignal) -> Result<(), SignalError> {
        let mut signals = self.signals.write().await;
        if signals.contains_key(signal.id()) {
            return Err(SignalError::DuplicateSignalId {
                signal_id: signal.id().clone(),
            });
        }
        signals.insert(signal.id().clone(), signal.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &SignalId) -> Result<Option<TradingSignal>, SignalError> {
        Ok(self.signals.read().await.get(id).cloned())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<TradingSignal>, SignalError> {
        Ok(self.newest_first(|s| s.user_id() == user_id).await)
    }

    async fn find_active(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Vec<TradingSignal>, SignalError> {
        Ok(self
            .newest_first(|s| s.user_id() == user_id && !s.is_expired_at(now))
            .await)
    }

    async fn purge_expired(&self, now: Timestamp) -> Result<usize, SignalError> {
        let mut signals = self.signals.write().await;
        let before = signals.len();
        signals.retain(|_, s| !s.is_expired_at(now));
        Ok(before - signals.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_execution::aggregate::{CreateOrderCommand, DEFAULT_MAX_ORDER_QUANTITY};
    use crate::domain::order_execution::value_objects::{OrderSide, OrderType};
    use crate::domain::shared::{Money, Quantity};
    use crate::domain::signals::{SignalParams, SignalType};
    use rust_decimal_macros::dec;

    fn create_test_order() -> Order {
        let command = CreateOrderCommand {
            id: None,
            user_id: UserId::new("user-1"),
            symbol: Symbol::new("AAPL"),
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            quantity: Quantity::from_i64(100),
            price: None,
            stop_price: None,
            strategy_id: None,
        };
        Order::new(command, DEFAULT_MAX_ORDER_QUANTITY).unwrap()
    }

    #[tokio::test]
    async fn insert_and_find_by_id() {
        let repo = InMemoryOrderRepository::new();
        let order = create_test_order();

        repo.insert(&order).await.unwrap();

        let found = repo.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(found.to_snapshot(), order.to_snapshot());
        assert!(found.pending_events().is_empty());
        assert!(repo.exists(order.id()).await.unwrap());
    }

    #[tokio::test]
    async fn insert_duplicate_fails() {
        let repo = InMemoryOrderRepository::new();
        let order = create_test_order();
        repo.insert(&order).await.unwrap();

        let err = repo.insert(&order).await.unwrap_err();
        assert!(matches!(err, OrderError::DuplicateOrderId { .. }));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn stale_save_is_rejected() {
        let repo = InMemoryOrderRepository::new();
        let order = create_test_order();
        repo.insert(&order).await.unwrap();

        let mut first = repo.find_by_id(order.id()).await.unwrap().unwrap();
        let mut second = repo.find_by_id(order.id()).await.unwrap().unwrap();

        first.submit(None).unwrap();
        repo.save(&first, 0).await.unwrap();

        second.cancel(None).unwrap();
        let err = repo.save(&second, 0).await.unwrap_err();
        assert_eq!(
            err,
            OrderError::ConcurrentModification {
                order_id: order.id().clone(),
                expected: 0,
                actual: 1,
            }
        );

        let stored = repo.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Submitted);
    }

    #[tokio::test]
    async fn save_unknown_order_is_not_found() {
        let repo = InMemoryOrderRepository::new();
        let err = repo.save(&create_test_order(), 0).await.unwrap_err();
        assert!(matches!(err, OrderError::NotFound { .. }));
    }

    #[tokio::test]
    async fn queries_filter_orders() {
        let repo = InMemoryOrderRepository::new();
        let mut submitted = create_test_order();
        submitted.submit(Some(BrokerId::new("brk-1"))).unwrap();
        let mut cancelled = create_test_order();
        cancelled.cancel(None).unwrap();
        repo.insert(&submitted).await.unwrap();
        repo.insert(&cancelled).await.unwrap();

        assert_eq!(repo.find_active().await.unwrap().len(), 1);
        assert_eq!(
            repo.find_by_status(OrderStatus::Cancelled)
                .await
                .unwrap()
                .len(),
            1
        );
        assert_eq!(repo.find_by_user(&UserId::new("user-1")).await.unwrap().len(), 2);
        let by_broker = repo
            .find_by_broker_id(&BrokerId::new("brk-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_broker.id(), submitted.id());

        repo.delete(cancelled.id()).await.unwrap();
        assert_eq!(repo.len().await, 1);
        repo.clear().await;
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn position_insert_save_find() {
        let repo = InMemoryPositionRepository::new();
        let user = UserId::new("user-1");
        let sym = Symbol::new("TCS");
        let mut position =
            Position::new(user.clone(), sym.clone(), dec!(10), Money::new(dec!(100))).unwrap();
        repo.insert(&position).await.unwrap();
        assert!(matches!(
            repo.insert(&position).await.unwrap_err(),
            PositionError::AlreadyExists { .. }
        ));

        position.update_price(Money::new(dec!(110))).unwrap();
        repo.save(&position, 0).await.unwrap();
        let err = repo.save(&position, 0).await.unwrap_err();
        assert!(matches!(err, PositionError::ConcurrentModification { .. }));

        let found = repo.find(&user, &sym).await.unwrap().unwrap();
        assert_eq!(found.unrealized_pnl(), Money::new(dec!(100)));
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
        assert_eq!(repo.find_open().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn signals_are_filtered_by_expiry() {
        let repo = InMemorySignalRepository::new();
        let now = Timestamp::now();
        for (i, expires_in) in [(0_i64, 60_i64), (1, -60), (2, 120)] {
            let signal = TradingSignal::new(SignalParams {
                id: Some(SignalId::new(format!("sig-{i}"))),
                user_id: UserId::new("user-1"),
                symbol: Symbol::new("TCS"),
                signal_type: SignalType::Sell,
                confidence_score: dec!(0.5),
                target_price: Money::new(dec!(10)),
                stop_loss: None,
                created_at: Some(now.add(chrono::Duration::seconds(-300 + i))),
                expires_at: now.add(chrono::Duration::seconds(expires_in)),
            })
            .unwrap();
            repo.insert(&signal).await.unwrap();
        }

        let active = repo.find_active(&UserId::new("user-1"), now).await.unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].id().as_str(), "sig-2");

        assert_eq!(repo.purge_expired(now).await.unwrap(), 1);
        assert_eq!(repo.len().await, 2);
        assert!(repo.find_by_id(&SignalId::new("sig-1")).await.unwrap().is_none());
    }
}
