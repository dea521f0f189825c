//! Order lifecycle errors.

use thiserror::Error;

use super::value_objects::{OrderStatus, OrderType};

/// Errors raised by the order aggregate and its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Invalid state transition attempted.
    #[error("invalid order state transition: {from} -> {to}")]
    InvalidStateTransition {
        /// Current order status.
        from: OrderStatus,
        /// Attempted status.
        to: OrderStatus,
    },

    /// Order type cannot be executed.
    #[error("order type {order_type} is not supported; only MARKET orders are executable")]
    UnsupportedOrderType {
        /// The rejected order type.
        order_type: OrderType,
    },

    /// Invalid order parameters supplied at submission.
    #[error("invalid {field}: {message}")]
    InvalidParameters {
        /// Field with the invalid value.
        field: String,
        /// What was wrong with it.
        message: String,
    },
}
