//! Engine-level error handling.
//!
//! Each layer raises its own error enum. [`EngineError`] gathers them at the
//! service boundary and maps every failure onto a stable [`ErrorCode`] that
//! callers can match on without parsing messages.
//!
//! | Code | Raised for |
//! |------|------------|
//! | `VALIDATION_FAILED` | Bad order, fill, position or signal fields |
//! | `OVERFILL` | Fill past the ordered quantity |
//! | `INVALID_STATE_TRANSITION` | Operation not allowed from the order's status |
//! | `NOT_FOUND` | Unknown order or position |
//! | `CONFLICT` | Duplicate id or concurrent modification |
//! | `CONFIG_ERROR` | Configuration could not be loaded |
//! | `JOURNAL_ERROR` | Journal could not be read |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::order_execution::OrderError;
use crate::domain::position::PositionError;
use crate::domain::signals::SignalError;
use crate::infrastructure::journal::JournalError;

/// Error codes for the order engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Invalid input.
    ValidationFailed,
    /// Fill past the ordered quantity.
    Overfill,
    /// Operation not allowed in the current status.
    InvalidStateTransition,
    /// Entity not found.
    NotFound,
    /// Duplicate id or version conflict.
    Conflict,
    /// Configuration error.
    ConfigError,
    /// Journal error.
    JournalError,
}

impl ErrorCode {
    /// Get the error reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::Overfill => "OVERFILL",
            Self::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::JournalError => "JOURNAL_ERROR",
        }
    }

    /// Whether retrying the same request could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// Any failure surfaced by the engine's services.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Order lifecycle failure.
    #[error(transparent)]
    Order(#[from] OrderError),
    /// Position failure.
    #[error(transparent)]
    Position(#[from] PositionError),
    /// Signal failure.
    #[error(transparent)]
    Signal(#[from] SignalError),
    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Journal failure.
    #[error(transparent)]
    Journal(#[from] JournalError),
}

impl EngineError {
    /// Map to a stable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Order(err) => match err {
                OrderError::Validation { .. } => ErrorCode::ValidationFailed,
                OrderError::Overfill { .. } => ErrorCode::Overfill,
                OrderError::InvalidStateTransition { .. } => ErrorCode::InvalidStateTransition,
                OrderError::NotFound { .. } => ErrorCode::NotFound,
                OrderError::DuplicateOrderId { .. } | OrderError::ConcurrentModification { .. } => {
                    ErrorCode::Conflict
                }
            },
            Self::Position(err) => match err {
                PositionError::Validation { .. } | PositionError::SymbolMismatch { .. } => {
                    ErrorCode::ValidationFailed
                }
                PositionError::NotFound { .. } => ErrorCode::NotFound,
                PositionError::AlreadyExists { .. }
                | PositionError::ConcurrentModification { .. } => ErrorCode::Conflict,
            },
            Self::Signal(err) => match err {
                SignalError::Validation { .. } => ErrorCode::ValidationFailed,
                SignalError::DuplicateSignalId { .. } => ErrorCode::Conflict,
            },
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Journal(_) => ErrorCode::JournalError,
        }
    }

    /// Build a serializable error body.
    #[must_use]
    pub fn to_response(&self) -> ErrorResponse {
        let mut details = BTreeMap::new();
        match self {
            Self::Order(OrderError::Validation { field, .. })
            | Self::Position(PositionError::Validation { field, .. })
            | Self::Signal(SignalError::Validation { field, .. }) => {
                details.insert("field".to_string(), field.clone());
            }
            Self::Order(
                OrderError::NotFound { order_id }
                | OrderError::DuplicateOrderId { order_id }
                | OrderError::ConcurrentModification { order_id, .. },
            ) => {
                details.insert("order_id".to_string(), order_id.to_string());
            }
            Self::Order(OrderError::InvalidStateTransition { from, to }) => {
                details.insert("from".to_string(), from.to_string());
                details.insert("to".to_string(), to.to_string());
            }
            _ => {}
        }

        ErrorResponse {
            code: self.code(),
            message: self.to_string(),
            details,
        }
    }
}

/// Serializable error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Structured context.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_execution::OrderStatus;
    use crate::domain::shared::{OrderId, Quantity};

    #[test]
    fn test_error_code_mapping() {
        let err: EngineError = OrderError::validation("quantity", "must be positive").into();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);

        let err: EngineError = OrderError::Overfill {
            fill_quantity: Quantity::from_i64(5),
            filled_quantity: Quantity::from_i64(98),
            quantity: Quantity::from_i64(100),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::Overfill);

        let err: EngineError = OrderError::ConcurrentModification {
            order_id: OrderId::new("o-1"),
            expected: 1,
            actual: 2,
        }
        .into();
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert!(err.code().is_retryable());
    }

    #[test]
    fn test_error_display_is_transparent() {
        let err: EngineError = OrderError::NotFound {
            order_id: OrderId::new("o-9"),
        }
        .into();
        assert_eq!(err.to_string(), "Order not found: o-9");
    }

    #[test]
    fn test_to_response() {
        let err: EngineError = OrderError::InvalidStateTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Filled,
        }
        .into();
        let response = err.to_response();

        assert_eq!(response.code, ErrorCode::InvalidStateTransition);
        assert_eq!(response.details["from"], "CANCELLED");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["code"], "INVALID_STATE_TRANSITION");
    }
}
