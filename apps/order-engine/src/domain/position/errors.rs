//! Position errors.

use thiserror::Error;

use crate::domain::shared::{DomainError, PositionId, Symbol, UserId};

/// Errors that can occur while maintaining positions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// Invalid price, quantity or snapshot field.
    #[error("Invalid position parameter '{field}': {message}")]
    Validation {
        /// Field with invalid value.
        field: String,
        /// Error message.
        message: String,
    },

    /// A fill for one symbol was applied to another symbol's position.
    #[error("Fill for {actual} cannot be applied to {expected} position")]
    SymbolMismatch {
        /// Symbol of the position.
        expected: Symbol,
        /// Symbol of the fill.
        actual: Symbol,
    },

    /// No position for the user and symbol.
    #[error("No position for user {user_id} in {symbol}")]
    NotFound {
        /// Owner.
        user_id: UserId,
        /// Symbol.
        symbol: Symbol,
    },

    /// A position for the user and symbol is already stored.
    #[error("Position for user {user_id} in {symbol} already exists")]
    AlreadyExists {
        /// Owner.
        user_id: UserId,
        /// Symbol.
        symbol: Symbol,
    },

    /// The stored position changed since it was loaded.
    #[error(
        "Position {position_id} was modified concurrently (expected version {expected}, found {actual})"
    )]
    ConcurrentModification {
        /// Position ID.
        position_id: PositionId,
        /// Version the caller loaded.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },
}

impl PositionError {
    /// Shorthand for a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<DomainError> for PositionError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidValue { field, message } => Self::Validation { field, message },
            DomainError::InvariantViolation {
                invariant, state, ..
            } => Self::Validation {
                field: invariant,
                message: state,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_mismatch_display() {
        let err = PositionError::SymbolMismatch {
            expected: Symbol::new("AAPL"),
            actual: Symbol::new("MSFT"),
        };
        assert_eq!(
            err.to_string(),
            "Fill for MSFT cannot be applied to AAPL position"
        );
    }

    #[test]
    fn domain_error_keeps_field() {
        let err: PositionError = DomainError::invalid("price", "price must be positive").into();
        assert!(matches!(err, PositionError::Validation { ref field, .. } if field == "price"));
    }
}
