//! Advisory trading signal.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::SignalType;
use super::errors::SignalError;
use crate::domain::shared::{Money, SignalId, Symbol, Timestamp, UserId};

/// Inputs for a signal; also the wire shape it is deserialized from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalParams {
    /// Caller-chosen id; generated when absent.
    #[serde(default)]
    pub id: Option<SignalId>,
    /// Owner.
    pub user_id: UserId,
    /// Symbol.
    pub symbol: Symbol,
    /// Recommendation.
    pub signal_type: SignalType,
    /// Confidence in `[0, 1]`.
    #[serde(with = "rust_decimal::serde::str")]
    pub confidence_score: Decimal,
    /// Price target.
    pub target_price: Money,
    /// Protective stop.
    #[serde(default)]
    pub stop_loss: Option<Money>,
    /// Creation time; now when absent.
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    /// Expiry time.
    pub expires_at: Timestamp,
}

/// A recommendation with a confidence score and an expiry.
///
/// Advisory only: nothing acts on a signal automatically and nothing
/// enforces expiry. Callers check [`TradingSignal::is_expired`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SignalParams")]
pub struct TradingSignal {
    id: SignalId,
    user_id: UserId,
    symbol: Symbol,
    signal_type: SignalType,
    #[serde(with = "rust_decimal::serde::str")]
    confidence_score: Decimal,
    target_price: Money,
    stop_loss: Option<Money>,
    created_at: Timestamp,
    expires_at: Timestamp,
}

impl TradingSignal {
    /// Create a validated signal.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the user id is blank, the symbol is invalid,
    /// confidence is outside `[0, 1]`, a price is not positive, or the
    /// signal expires before it is created.
    pub fn new(params: SignalParams) -> Result<Self, SignalError> {
        if params.user_id.is_blank() {
            return Err(validation("user_id", "user id cannot be empty"));
        }
        params.symbol.validate()?;
        if params.confidence_score < Decimal::ZERO || params.confidence_score > Decimal::ONE {
            return Err(validation(
                "confidence_score",
                format!(
                    "confidence must be within [0, 1], got {}",
                    params.confidence_score
                ),
            ));
        }
        params.target_price.validate_price("target_price")?;
        if let Some(stop) = params.stop_loss {
            stop.validate_price("stop_loss")?;
        }
        let created_at = params.created_at.unwrap_or_else(Timestamp::now);
        if params.expires_at < created_at {
            return Err(validation("expires_at", "signal expires before it is created"));
        }

        Ok(Self {
            id: params.id.unwrap_or_else(SignalId::generate),
            user_id: params.user_id,
            symbol: params.symbol,
            signal_type: params.signal_type,
            confidence_score: params.confidence_score,
            target_price: params.target_price,
            stop_loss: params.stop_loss,
            created_at,
            expires_at: params.expires_at,
        })
    }

    /// Get the signal ID.
    #[must_use]
    pub const fn id(&self) -> &SignalId {
        &self.id
    }

    /// Get the owner.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Get the symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Get the recommendation.
    #[must_use]
    pub const fn signal_type(&self) -> SignalType {
        self.signal_type
    }

    /// Get the confidence score.
    #[must_use]
    pub const fn confidence_score(&self) -> Decimal {
        self.confidence_score
    }

    /// Get the price target.
    #[must_use]
    pub const fn target_price(&self) -> Money {
        self.target_price
    }

    /// Get the protective stop.
    #[must_use]
    pub const fn stop_loss(&self) -> Option<Money> {
        self.stop_loss
    }

    /// Get the creation time.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Get the expiry time.
    #[must_use]
    pub const fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    /// True once the wall clock has passed `expires_at`.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Timestamp::now())
    }

    /// True iff `now > expires_at`; a signal is still live at its expiry
    /// instant.
    #[must_use]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now > self.expires_at
    }
}

impl TryFrom<SignalParams> for TradingSignal {
    type Error = SignalError;

    fn try_from(params: SignalParams) -> Result<Self, Self::Error> {
        Self::new(params)
    }
}

fn validation(field: &str, message: impl Into<String>) -> SignalError {
    SignalError::Validation {
        field: field.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn make_params() -> SignalParams {
        let created = Timestamp::parse("2026-01-19T09:15:00Z").unwrap();
        SignalParams {
            id: Some(SignalId::new("sig-1")),
            user_id: UserId::new("user-1"),
            symbol: Symbol::new("infy"),
            signal_type: SignalType::Buy,
            confidence_score: dec!(0.82),
            target_price: Money::new(dec!(1650)),
            stop_loss: Some(Money::new(dec!(1580))),
            created_at: Some(created),
            expires_at: created.add(Duration::hours(6)),
        }
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let signal = TradingSignal::new(make_params()).unwrap();
        let expires = signal.expires_at();

        assert!(!signal.is_expired_at(expires.add(Duration::seconds(-1))));
        assert!(!signal.is_expired_at(expires));
        assert!(signal.is_expired_at(expires.add(Duration::milliseconds(1))));
    }

    #[test]
    fn old_signal_is_expired_now() {
        let signal = TradingSignal::new(make_params()).unwrap();
        assert!(signal.is_expired());
    }

    #[test]
    fn confidence_must_be_in_unit_range() {
        for bad in [dec!(-0.01), dec!(1.01)] {
            let mut params = make_params();
            params.confidence_score = bad;
            let err = TradingSignal::new(params).unwrap_err();
            assert!(matches!(err, SignalError::Validation { ref field, .. } if field == "confidence_score"));
        }
        for ok in [Decimal::ZERO, Decimal::ONE] {
            let mut params = make_params();
            params.confidence_score = ok;
            assert!(TradingSignal::new(params).is_ok());
        }
    }

    #[test]
    fn prices_and_times_validated() {
        let mut params = make_params();
        params.target_price = Money::ZERO;
        assert!(TradingSignal::new(params).is_err());

        let mut params = make_params();
        params.stop_loss = Some(Money::new(dec!(-5)));
        assert!(TradingSignal::new(params).is_err());

        let mut params = make_params();
        params.expires_at = params.created_at.unwrap().add(Duration::seconds(-1));
        assert!(TradingSignal::new(params).is_err());
    }

    #[test]
    fn hold_has_no_side() {
        assert!(SignalType::Hold.side().is_none());
        assert_eq!(
            SignalType::Sell.side(),
            Some(crate::domain::order_execution::OrderSide::Sell)
        );
    }

    #[test]
    fn serde_round_trip_validates() {
        let signal = TradingSignal::new(make_params()).unwrap();
        let json = serde_json::to_value(&signal).unwrap();
        assert_eq!(json["symbol"], "INFY");
        assert_eq!(json["confidence_score"], "0.82");

        let parsed: TradingSignal = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(parsed, signal);

        let mut bad = json;
        bad["confidence_score"] = serde_json::Value::String("1.5".to_string());
        assert!(serde_json::from_value::<TradingSignal>(bad).is_err());
    }
}
