//! Submit Order Use Case
//!
//! Boundary entry point for new orders: validates the request, creates the
//! PENDING record, and enqueues the execution job. Enqueue is synchronous
//! with respect to durability and asynchronous with respect to execution.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::application::ports::{
    JobQueuePort, OrderRepositoryPort, QueueError, RepositoryError,
};
use crate::domain::order::{Order, OrderError, OrderSpec, OrderType};
use crate::domain::shared::{OrderId, Symbol, UserId};

/// A submission request as received from the request layer.
///
/// Symbols are normalized and the order id generated here, so callers can
/// pass raw client input.
#[derive(Debug, Clone)]
pub struct SubmitOrderCommand {
    /// Client-supplied order id; generated when absent.
    pub order_id: Option<OrderId>,
    /// Requested execution behavior.
    pub order_type: OrderType,
    /// Token being sold.
    pub token_in: String,
    /// Token being bought.
    pub token_out: String,
    /// Amount of `token_in` to swap.
    pub amount_in: Decimal,
    /// Submitting user, when known.
    pub user_id: Option<UserId>,
}

/// Errors rejecting a submission synchronously.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Bad input shape, type, or range. The order is never created.
    #[error(transparent)]
    Validation(#[from] OrderError),

    /// A record for this order id already exists.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Queue rejected the job (duplicate unresolved job, or shutdown).
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Use case accepting orders at the boundary.
pub struct SubmitOrderUseCase<R, Q>
where
    R: OrderRepositoryPort,
    Q: JobQueuePort,
{
    repository: Arc<R>,
    queue: Arc<Q>,
}

impl<R, Q> SubmitOrderUseCase<R, Q>
where
    R: OrderRepositoryPort,
    Q: JobQueuePort,
{
    /// Create the use case.
    pub fn new(repository: Arc<R>, queue: Arc<Q>) -> Self {
        Self { repository, queue }
    }

    /// Validate, persist as PENDING, and enqueue one order.
    ///
    /// The record is created atomically with the enqueue: a rejected enqueue
    /// rolls the record back, so no orphaned PENDING order survives a
    /// rejected submission.
    ///
    /// # Errors
    ///
    /// Rejects synchronously on validation failure, duplicate order id, or a
    /// duplicate unresolved job.
    pub async fn submit(&self, command: SubmitOrderCommand) -> Result<OrderId, SubmitError> {
        let spec = OrderSpec {
            order_id: command.order_id.unwrap_or_else(OrderId::generate),
            order_type: command.order_type,
            token_in: Symbol::new(command.token_in),
            token_out: Symbol::new(command.token_out),
            amount_in: command.amount_in,
            user_id: command.user_id,
        };
        spec.validate()?;

        let order = Order::new(spec.clone());
        self.repository.create(&order).await?;

        if let Err(queue_error) = self.queue.enqueue(spec.clone()).await {
            // Roll the record back so the rejection leaves no trace.
            if let Err(delete_error) = self.repository.delete(&spec.order_id).await {
                tracing::error!(
                    order_id = %spec.order_id,
                    error = %delete_error,
                    "failed to roll back order record after enqueue rejection"
                );
            }
            return Err(queue_error.into());
        }

        tracing::info!(order_id = %spec.order_id, "order accepted and queued");
        Ok(spec.order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::{Mutex, RwLock};

    use crate::application::ports::OrderFilter;
    use crate::domain::order::OrderStatus;

    #[derive(Default)]
    struct FakeRepository {
        orders: RwLock<HashMap<String, Order>>,
    }

    #[async_trait]
    impl OrderRepositoryPort for FakeRepository {
        async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
            let mut orders = self.orders.write().unwrap();
            if orders.contains_key(order.order_id.as_str()) {
                return Err(RepositoryError::Duplicate {
                    order_id: order.order_id.to_string(),
                });
            }
            orders.insert(order.order_id.to_string(), order.clone());
            Ok(())
        }

        async fn update(&self, order: &Order) -> Result<(), RepositoryError> {
            let mut orders = self.orders.write().unwrap();
            orders.insert(order.order_id.to_string(), order.clone());
            Ok(())
        }

        async fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, RepositoryError> {
            Ok(self.orders.read().unwrap().get(order_id.as_str()).cloned())
        }

        async fn delete(&self, order_id: &OrderId) -> Result<(), RepositoryError> {
            self.orders.write().unwrap().remove(order_id.as_str());
            Ok(())
        }

        async fn list(
            &self,
            _filter: &OrderFilter,
            _limit: usize,
            _offset: usize,
        ) -> Result<(Vec<Order>, usize), RepositoryError> {
            let orders: Vec<Order> = self.orders.read().unwrap().values().cloned().collect();
            let total = orders.len();
            Ok((orders, total))
        }
    }

    /// Queue stub that records accepted specs and can reject everything.
    #[derive(Default)]
    struct FakeQueue {
        accepted: Mutex<Vec<OrderSpec>>,
        reject_duplicates: bool,
    }

    #[async_trait]
    impl JobQueuePort for FakeQueue {
        async fn enqueue(&self, spec: OrderSpec) -> Result<(), QueueError> {
            if self.reject_duplicates {
                return Err(QueueError::DuplicateJob {
                    order_id: spec.order_id.to_string(),
                });
            }
            self.accepted.lock().unwrap().push(spec);
            Ok(())
        }
    }

    fn command(order_type: OrderType) -> SubmitOrderCommand {
        SubmitOrderCommand {
            order_id: None,
            order_type,
            token_in: "sol".to_string(),
            token_out: "usdc".to_string(),
            amount_in: dec!(10),
            user_id: None,
        }
    }

    #[tokio::test]
    async fn submit_creates_pending_record_and_enqueues() {
        let repository = Arc::new(FakeRepository::default());
        let queue = Arc::new(FakeQueue::default());
        let use_case = SubmitOrderUseCase::new(Arc::clone(&repository), Arc::clone(&queue));

        let order_id = use_case.submit(command(OrderType::Market)).await.unwrap();

        let order = repository.find_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.token_in.as_str(), "SOL");
        assert_eq!(queue.accepted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn limit_orders_are_accepted_at_submission() {
        let repository = Arc::new(FakeRepository::default());
        let queue = Arc::new(FakeQueue::default());
        let use_case = SubmitOrderUseCase::new(repository, Arc::clone(&queue));

        // Rejection happens later, in routing; submission must accept.
        assert!(use_case.submit(command(OrderType::Limit)).await.is_ok());
        assert_eq!(queue.accepted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_amount_is_rejected_without_side_effects() {
        let repository = Arc::new(FakeRepository::default());
        let queue = Arc::new(FakeQueue::default());
        let use_case = SubmitOrderUseCase::new(Arc::clone(&repository), Arc::clone(&queue));

        let mut bad = command(OrderType::Market);
        bad.amount_in = dec!(-1);
        let result = use_case.submit(bad).await;

        assert!(matches!(result, Err(SubmitError::Validation(_))));
        assert!(repository.orders.read().unwrap().is_empty());
        assert!(queue.accepted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_order_id_is_rejected() {
        let repository = Arc::new(FakeRepository::default());
        let queue = Arc::new(FakeQueue::default());
        let use_case = SubmitOrderUseCase::new(repository, queue);

        let mut first = command(OrderType::Market);
        first.order_id = Some(OrderId::new("ord-dup"));
        let mut second = command(OrderType::Market);
        second.order_id = Some(OrderId::new("ord-dup"));

        use_case.submit(first).await.unwrap();
        let result = use_case.submit(second).await;

        assert!(matches!(
            result,
            Err(SubmitError::Repository(RepositoryError::Duplicate { .. }))
        ));
    }

    #[tokio::test]
    async fn enqueue_rejection_rolls_back_the_record() {
        let repository = Arc::new(FakeRepository::default());
        let queue = Arc::new(FakeQueue {
            reject_duplicates: true,
            ..Default::default()
        });
        let use_case = SubmitOrderUseCase::new(Arc::clone(&repository), queue);

        let result = use_case.submit(command(OrderType::Market)).await;

        assert!(matches!(result, Err(SubmitError::Queue(_))));
        assert!(repository.orders.read().unwrap().is_empty());
    }
}
