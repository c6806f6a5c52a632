//! Property-based tests for fill accumulation and position netting.
//!
//! Random fill sequences are applied to orders and positions and the
//! bookkeeping invariants are checked after every step.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use order_engine::domain::order_execution::{
    CreateOrderCommand, DEFAULT_MAX_ORDER_QUANTITY, Fill, Order, OrderError, OrderSide,
    OrderSnapshot, OrderStatus, OrderType,
};
use order_engine::domain::position::Position;
use order_engine::domain::shared::{Money, Quantity, Symbol, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Tolerance for comparing incremental averages with a direct computation.
const EPSILON: Decimal = dec!(0.000000000001);

fn new_order(quantity: i64) -> Order {
    let cmd = CreateOrderCommand {
        id: None,
        user_id: UserId::new("prop-user"),
        symbol: Symbol::new("PROP"),
        side: OrderSide::Buy,
        order_type: OrderType::Market,
        quantity: Quantity::from_i64(quantity),
        price: None,
        stop_price: None,
        strategy_id: None,
    };
    Order::new(cmd, DEFAULT_MAX_ORDER_QUANTITY).unwrap()
}

fn make_fill(quantity: i64, price_cents: i64, commission_cents: i64) -> Fill {
    Fill::new(Quantity::from_i64(quantity), Money::new(Decimal::new(price_cents, 2)))
        .with_commission(Money::new(Decimal::new(commission_cents, 2)))
}

fn fills_strategy() -> impl Strategy<Value = Vec<(i64, i64, i64)>> {
    prop::collection::vec((1i64..50, 1i64..1_000_000, 0i64..500), 1..30)
}

/// Apply fills until one would overfill; returns the fills that were applied.
fn fill_until_full(order: &mut Order, fills: &[(i64, i64, i64)]) -> Vec<(i64, i64, i64)> {
    let mut applied = Vec::new();
    for &(q, p, c) in fills {
        if order.apply_fill(make_fill(q, p, c)).is_ok() {
            applied.push((q, p, c));
        }
    }
    applied
}

fn weighted_mean(fills: &[(i64, i64, i64)]) -> Decimal {
    let total_qty: i64 = fills.iter().map(|f| f.0).sum();
    let notional: Decimal = fills
        .iter()
        .map(|&(q, p, _)| Decimal::from(q) * Decimal::new(p, 2))
        .sum();
    notional / Decimal::from(total_qty)
}

proptest! {
    /// Filled quantity never exceeds the order and FILLED tracks completion.
    #[test]
    fn filled_quantity_stays_in_bounds(
        quantity in 1i64..500,
        fills in fills_strategy(),
    ) {
        let mut order = new_order(quantity);
        for (q, p, c) in fills {
            let _ = order.apply_fill(make_fill(q, p, c));
            let filled = order.filled_quantity();
            prop_assert!(filled >= Quantity::ZERO);
            prop_assert!(filled <= order.quantity());
            prop_assert_eq!(order.status() == OrderStatus::Filled, filled == order.quantity());
            prop_assert_eq!(order.remaining_quantity(), order.quantity() - filled);
        }
    }

    /// The average fill price is the quantity-weighted mean of the fills.
    #[test]
    fn average_is_weighted_mean(
        quantity in 1i64..500,
        fills in fills_strategy(),
    ) {
        let mut order = new_order(quantity);
        let applied = fill_until_full(&mut order, &fills);
        if applied.is_empty() {
            return Ok(());
        }

        let expected = weighted_mean(&applied);
        let diff = (order.average_fill_price().amount() - expected).abs();
        prop_assert!(diff < EPSILON, "avg {} expected {}", order.average_fill_price(), expected);

        let commission: i64 = applied.iter().map(|f| f.2).sum();
        prop_assert_eq!(order.total_commission(), Money::new(Decimal::new(commission, 2)));
    }

    /// Fill order does not change the resulting average.
    #[test]
    fn average_is_independent_of_fill_order(
        fills in prop::collection::vec((1i64..50, 1i64..1_000_000), 1..20),
    ) {
        let total: i64 = fills.iter().map(|f| f.0).sum();
        let mut forward = new_order(total);
        let mut backward = new_order(total);

        for &(q, p) in &fills {
            forward.apply_fill(make_fill(q, p, 0)).unwrap();
        }
        for &(q, p) in fills.iter().rev() {
            backward.apply_fill(make_fill(q, p, 0)).unwrap();
        }

        prop_assert_eq!(forward.status(), OrderStatus::Filled);
        prop_assert_eq!(backward.status(), OrderStatus::Filled);
        let diff = (forward.average_fill_price().amount()
            - backward.average_fill_price().amount())
        .abs();
        prop_assert!(diff < EPSILON);
    }

    /// Snapshots survive JSON and rebuild the same order.
    #[test]
    fn snapshot_round_trip_is_identity(
        quantity in 1i64..500,
        fills in fills_strategy(),
        cancel in any::<bool>(),
    ) {
        let mut order = new_order(quantity);
        fill_until_full(&mut order, &fills);
        if cancel {
            let _ = order.cancel(Some("prop".to_string()));
        }

        let snapshot = order.to_snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: OrderSnapshot = serde_json::from_str(&json).unwrap();
        let rebuilt = Order::from_snapshot(decoded).unwrap();

        prop_assert_eq!(rebuilt.to_snapshot(), snapshot);
    }

    /// A refused overfill leaves every field untouched.
    #[test]
    fn overfill_leaves_state_unchanged(
        quantity in 1i64..500,
        fills in fills_strategy(),
        extra in 1i64..100,
    ) {
        let mut order = new_order(quantity);
        fill_until_full(&mut order, &fills);
        if order.is_terminal() {
            return Ok(());
        }

        let before = order.to_snapshot();
        let events_before = order.pending_events().len();
        let too_much = order.remaining_quantity().amount() + Decimal::from(extra);
        let err = order
            .apply_fill(Fill::new(Quantity::new(too_much), Money::new(dec!(1))))
            .unwrap_err();

        let is_overfill = matches!(err, OrderError::Overfill { .. });
        prop_assert!(is_overfill);
        prop_assert_eq!(order.to_snapshot(), before);
        prop_assert_eq!(order.pending_events().len(), events_before);
    }

    /// Position quantity is the signed sum of fills and P&L follows the mark.
    #[test]
    fn position_tracks_signed_fills(
        fills in prop::collection::vec((any::<bool>(), 1i64..50, 1i64..1_000_000), 1..30),
    ) {
        let user = UserId::new("prop-user");
        let symbol = Symbol::new("PROP");
        let side = |buy: bool| if buy { OrderSide::Buy } else { OrderSide::Sell };

        let (buy, q, p) = fills[0];
        let mut position = Position::open(user, symbol.clone(), side(buy), &make_fill(q, p, 0)).unwrap();
        let mut expected_qty = side(buy).signed(Decimal::from(q));

        for &(buy, q, p) in &fills[1..] {
            position.apply_fill(&symbol, side(buy), &make_fill(q, p, 0)).unwrap();
            expected_qty += side(buy).signed(Decimal::from(q));

            prop_assert_eq!(position.quantity(), expected_qty);
            if position.is_flat() {
                prop_assert!(position.average_price().is_zero());
            } else {
                prop_assert!(position.average_price().is_positive());
            }
            let expected_unrealized = (position.current_price().amount()
                - position.average_price().amount())
                * position.quantity();
            prop_assert_eq!(position.unrealized_pnl().amount(), expected_unrealized);
        }
    }
}
