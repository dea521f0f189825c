//! Job Queue Port (Driven Port)
//!
//! Submission-side contract of the durable work queue. Workers consume the
//! queue through its concrete API; producers only need `enqueue`.

use async_trait::async_trait;

use crate::domain::order::OrderSpec;

/// Queue error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum QueueError {
    /// An unresolved job with the same order id is already queued or running.
    #[error("duplicate job for order {order_id}")]
    DuplicateJob {
        /// The deduplicated order id.
        order_id: String,
    },

    /// The queue is shutting down and no longer accepts work.
    #[error("queue is closed")]
    Closed,
}

/// Port for enqueuing order-execution jobs.
#[async_trait]
pub trait JobQueuePort: Send + Sync {
    /// Durably enqueue one order for execution.
    ///
    /// Returns once the job is queued; execution is asynchronous. Fails with
    /// `DuplicateJob` when an unresolved job for the same order id exists.
    async fn enqueue(&self, spec: OrderSpec) -> Result<(), QueueError>;
}
