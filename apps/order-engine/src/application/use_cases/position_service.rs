//! Position Service
//!
//! Applies order fills to positions and marks them to market. Every change
//! to one user's position in one symbol runs under that pair's lock.

use std::sync::Arc;

use super::locks::LockRegistry;
use crate::domain::order_execution::{Fill, OrderSide};
use crate::domain::position::{Position, PositionError, PositionRepository};
use crate::domain::shared::{Money, Symbol, UserId};
use crate::error::EngineError;

/// Outcome of applying a fill to a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionUpdate {
    /// Position after the fill.
    pub position: Position,
    /// P&L realized by this fill.
    pub realized_pnl: Money,
    /// True if the fill opened a new position record.
    pub opened: bool,
}

/// Use case for position bookkeeping.
pub struct PositionService<P>
where
    P: PositionRepository,
{
    position_repo: Arc<P>,
    locks: LockRegistry<(UserId, Symbol)>,
}

impl<P> PositionService<P>
where
    P: PositionRepository,
{
    /// Create a new `PositionService`.
    pub fn new(position_repo: Arc<P>) -> Self {
        Self {
            position_repo,
            locks: LockRegistry::new(),
        }
    }

    /// Apply a fill to the user's position in `symbol`, opening one if none
    /// exists yet.
    pub async fn apply_fill(
        &self,
        user_id: &UserId,
        symbol: &Symbol,
        side: OrderSide,
        fill: &Fill,
    ) -> Result<PositionUpdate, EngineError> {
        let _guard = self.locks.acquire(&(user_id.clone(), symbol.clone())).await;

        let update = match self.position_repo.find(user_id, symbol).await? {
            Some(mut position) => {
                let expected = position.version();
                let realized_pnl = position.apply_fill(symbol, side, fill)?;
                self.position_repo.save(&position, expected).await?;
                PositionUpdate {
                    position,
                    realized_pnl,
                    opened: false,
                }
            }
            None => {
                let position = Position::open(user_id.clone(), symbol.clone(), side, fill)?;
                self.position_repo.insert(&position).await?;
                PositionUpdate {
                    position,
                    realized_pnl: Money::ZERO,
                    opened: true,
                }
            }
        };

        tracing::debug!(
            user_id = %user_id,
            symbol = %symbol,
            quantity = %update.position.quantity(),
            average_price = %update.position.average_price(),
            realized_pnl = %update.realized_pnl,
            "Position updated"
        );

        Ok(update)
    }

    /// Mark the user's position in `symbol` to `price`.
    pub async fn mark_to_market(
        &self,
        user_id: &UserId,
        symbol: &Symbol,
        price: Money,
    ) -> Result<Position, EngineError> {
        let _guard = self.locks.acquire(&(user_id.clone(), symbol.clone())).await;

        let mut position = self
            .position_repo
            .find(user_id, symbol)
            .await?
            .ok_or_else(|| PositionError::NotFound {
                user_id: user_id.clone(),
                symbol: symbol.clone(),
            })?;
        let expected = position.version();
        position.update_price(price)?;
        self.position_repo.save(&position, expected).await?;

        tracing::debug!(
            user_id = %user_id,
            symbol = %symbol,
            price = %price,
            unrealized_pnl = %position.unrealized_pnl(),
            "Position marked"
        );

        Ok(position)
    }

    /// Get the user's position in `symbol`.
    pub async fn get_position(
        &self,
        user_id: &UserId,
        symbol: &Symbol,
    ) -> Result<Option<Position>, EngineError> {
        Ok(self.position_repo.find(user_id, symbol).await?)
    }

    /// All positions held by a user, flat ones included.
    pub async fn positions_for_user(&self, user_id: &UserId) -> Result<Vec<Position>, EngineError> {
        Ok(self.position_repo.find_by_user(user_id).await?)
    }

    /// Every non-flat position.
    pub async fn open_positions(&self) -> Result<Vec<Position>, EngineError> {
        Ok(self.position_repo.find_open().await?)
    }

    /// Every position.
    pub async fn all_positions(&self) -> Result<Vec<Position>, EngineError> {
        Ok(self.position_repo.find_all().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::infrastructure::persistence::InMemoryPositionRepository;
    use crate::domain::shared::Quantity;
    use rust_decimal_macros::dec;

    fn service() -> PositionService<InMemoryPositionRepository> {
        PositionService::new(Arc::new(InMemoryPositionRepository::new()))
    }

    fn fill(qty: i64, price: rust_decimal::Decimal) -> Fill {
        Fill::new(Quantity::from_i64(qty), Money::new(price))
    }

    #[tokio::test]
    async fn first_fill_opens_then_updates() {
        let svc = service();
        let user = UserId::new("user-1");
        let sym = Symbol::new("INFY");

        let update = svc
            .apply_fill(&user, &sym, OrderSide::Buy, &fill(10, dec!(1500)))
            .await
            .unwrap();
        assert!(update.opened);
        assert_eq!(update.position.quantity(), dec!(10));

        let update = svc
            .apply_fill(&user, &sym, OrderSide::Sell, &fill(4, dec!(1550)))
            .await
            .unwrap();
        assert!(!update.opened);
        assert_eq!(update.realized_pnl, Money::new(dec!(200)));
        assert_eq!(update.position.quantity(), dec!(6));
    }

    #[tokio::test]
    async fn mark_to_market_updates_unrealized() {
        let svc = service();
        let user = UserId::new("user-1");
        let sym = Symbol::new("RELIANCE");
        svc.apply_fill(&user, &sym, OrderSide::Buy, &fill(100, dec!(2500)))
            .await
            .unwrap();

        let position = svc
            .mark_to_market(&user, &sym, Money::new(dec!(2550)))
            .await
            .unwrap();
        assert_eq!(position.unrealized_pnl(), Money::new(dec!(5000)));

        let stored = svc.get_position(&user, &sym).await.unwrap().unwrap();
        assert_eq!(stored, position);
    }

    #[tokio::test]
    async fn mark_unknown_position_is_not_found() {
        let err = service()
            .mark_to_market(&UserId::new("u"), &Symbol::new("X"), Money::new(dec!(1)))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn mark_rejects_non_positive_price() {
        let svc = service();
        let user = UserId::new("u");
        let sym = Symbol::new("X");
        svc.apply_fill(&user, &sym, OrderSide::Buy, &fill(1, dec!(10)))
            .await
            .unwrap();

        let err = svc
            .mark_to_market(&user, &sym, Money::ZERO)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn open_positions_exclude_flat() {
        let svc = service();
        let user = UserId::new("u");
        svc.apply_fill(&user, &Symbol::new("A"), OrderSide::Buy, &fill(1, dec!(10)))
            .await
            .unwrap();
        svc.apply_fill(&user, &Symbol::new("B"), OrderSide::Buy, &fill(1, dec!(10)))
            .await
            .unwrap();
        svc.apply_fill(&user, &Symbol::new("B"), OrderSide::Sell, &fill(1, dec!(12)))
            .await
            .unwrap();

        assert_eq!(svc.positions_for_user(&user).await.unwrap().len(), 2);
        let open = svc.open_positions().await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].symbol().as_str(), "A");
    }
}
