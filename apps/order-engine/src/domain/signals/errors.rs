//! Trading signal errors.

use thiserror::Error;

use crate::domain::shared::{DomainError, SignalId};

/// Errors raised by the signal model and its repository.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// Invalid signal field.
    #[error("Invalid signal parameter '{field}': {message}")]
    Validation {
        /// Field with invalid value.
        field: String,
        /// Error message.
        message: String,
    },

    /// A signal with this id is already stored.
    #[error("Duplicate signal ID: {signal_id}")]
    DuplicateSignalId {
        /// Signal ID.
        signal_id: SignalId,
    },
}

impl From<DomainError> for SignalError {
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
