//! Order Repository Port (Driven Port)
//!
//! Persistence abstraction for order records. The storage technology behind
//! this port is a deployment concern; the engine only depends on the
//! contract.

use async_trait::async_trait;

use crate::domain::order::{Order, OrderStatus};
use crate::domain::shared::OrderId;

/// Repository error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    /// No record exists for the order id.
    #[error("order not found: {order_id}")]
    NotFound {
        /// The missing order id.
        order_id: String,
    },

    /// A record already exists for the order id.
    #[error("order already exists: {order_id}")]
    Duplicate {
        /// The conflicting order id.
        order_id: String,
    },

    /// Underlying store failure.
    #[error("storage error: {message}")]
    Storage {
        /// Error details.
        message: String,
    },
}

/// Filter for order listings.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Restrict to a single status.
    pub status: Option<OrderStatus>,
}

/// Port for order record persistence.
#[async_trait]
pub trait OrderRepositoryPort: Send + Sync {
    /// Insert a new record.
    ///
    /// Fails with `Duplicate` if a record with the same order id exists.
    async fn create(&self, order: &Order) -> Result<(), RepositoryError>;

    /// Replace the stored record for `order.order_id`.
    ///
    /// Fails with `NotFound` if the order was never created.
    async fn update(&self, order: &Order) -> Result<(), RepositoryError>;

    /// Fetch a record by id.
    async fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Delete a record by id. Used only to roll back a submission whose
    /// enqueue failed.
    async fn delete(&self, order_id: &OrderId) -> Result<(), RepositoryError>;

    /// List records matching `filter`, newest first, with the total count
    /// before pagination.
    async fn list(
        &self,
        filter: &OrderFilter,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<Order>, usize), RepositoryError>;
}
