//! Order execution errors.

use thiserror::Error;

use super::value_objects::OrderStatus;
use crate::domain::shared::{DomainError, OrderId, Quantity};

/// Errors that can occur in order execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Invalid order or fill parameters.
    #[error("Invalid order parameter '{field}': {message}")]
    Validation {
        /// Field with invalid value.
        field: String,
        /// Error message.
        message: String,
    },

    /// Fill would take the filled quantity past the ordered quantity.
    #[error(
        "Fill of {fill_quantity} would overfill order: {filled_quantity} of {quantity} already filled"
    )]
    Overfill {
        /// Quantity of the rejected fill.
        fill_quantity: Quantity,
        /// Quantity filled before the fill.
        filled_quantity: Quantity,
        /// Ordered quantity.
        quantity: Quantity,
    },

    /// Transition not permitted from the current status.
    #[error("Invalid order state transition: {from} -> {to}")]
    InvalidStateTransition {
        /// Current order status.
        from: OrderStatus,
        /// Attempted status.
        to: OrderStatus,
    },

    /// Order not found.
    #[error("Order not found: {order_id}")]
    NotFound {
        /// Order ID.
        order_id: OrderId,
    },

    /// An order with this id is already stored.
    #[error("Duplicate order ID: {order_id}")]
    DuplicateOrderId {
        /// Order ID.
        order_id: OrderId,
    },

    /// The stored order changed since it was loaded.
    #[error("Order {order_id} was modified concurrently (expected version {expected}, found {actual})")]
    ConcurrentModification {
        /// Order ID.
        order_id: OrderId,
        /// Version the caller loaded.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },
}

impl OrderError {
    /// Shorthand for a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<DomainError> for OrderError {
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
    fn invalid_state_transition_display() {
        let err = OrderError::InvalidStateTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::PartiallyFilled,
        };
        let msg = err.to_string();
        assert!(msg.contains("CANCELLED"));
        assert!(msg.contains("PARTIALLY_FILLED"));
    }

    #[test]
    fn overfill_display() {
        let err = OrderError::Overfill {
            fill_quantity: Quantity::from_i64(21),
            filled_quantity: Quantity::from_i64(80),
            quantity: Quantity::from_i64(100),
        };
        let msg = err.to_string();
        assert!(msg.contains("21"));
        assert!(msg.contains("80 of 100"));
    }

    #[test]
    fn domain_error_converts_to_validation() {
        let err: OrderError = DomainError::invalid("fill_price", "price must be positive").into();
        assert_eq!(
            err,
            OrderError::validation("fill_price", "price must be positive")
        );
    }

    #[test]
    fn order_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(OrderError::NotFound {
            order_id: OrderId::new("ord-1"),
        });
        assert_eq!(err.to_string(), "Order not found: ord-1");
    }
}
