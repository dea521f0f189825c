//! Dependency Injection Container
//!
//! Manages creation and wiring of all application components. No component
//! is a global: everything is constructed here and passed by reference.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::application::ports::{OrderRepositoryPort, StatusPublisherPort};
use crate::application::services::QuoteRouter;
use crate::application::use_cases::{ExecuteOrderUseCase, SubmitOrderUseCase};
use crate::infrastructure::queue::JobQueue;

/// Dependency injection container.
///
/// Holds the wired component instances and builds use cases over them.
pub struct Container<R, P>
where
    R: OrderRepositoryPort + 'static,
    P: StatusPublisherPort + 'static,
{
    repository: Arc<R>,
    publisher: Arc<P>,
    router: Arc<QuoteRouter>,
    queue: Arc<JobQueue>,
    slippage_tolerance: Decimal,
}

impl<R, P> Container<R, P>
where
    R: OrderRepositoryPort + 'static,
    P: StatusPublisherPort + 'static,
{
    /// Create a container over concrete component instances.
    pub fn new(
        repository: Arc<R>,
        publisher: Arc<P>,
        router: Arc<QuoteRouter>,
        queue: Arc<JobQueue>,
        slippage_tolerance: Decimal,
    ) -> Self {
        Self {
            repository,
            publisher,
            router,
            queue,
            slippage_tolerance,
        }
    }

    /// Get the order repository.
    pub fn repository(&self) -> Arc<R> {
        Arc::clone(&self.repository)
    }

    /// Get the status publisher.
    pub fn publisher(&self) -> Arc<P> {
        Arc::clone(&self.publisher)
    }

    /// Get the quote router.
    pub fn router(&self) -> Arc<QuoteRouter> {
        Arc::clone(&self.router)
    }

    /// Get the job queue.
    pub fn queue(&self) -> Arc<JobQueue> {
        Arc::clone(&self.queue)
    }

    /// Create a `SubmitOrderUseCase`.
    pub fn submit_order_use_case(&self) -> SubmitOrderUseCase<R, JobQueue> {
        SubmitOrderUseCase::new(Arc::clone(&self.repository), Arc::clone(&self.queue))
    }

    /// Create an `ExecuteOrderUseCase`.
    pub fn execute_order_use_case(&self) -> ExecuteOrderUseCase<R, P> {
        ExecuteOrderUseCase::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.publisher),
            Arc::clone(&self.router),
            self.slippage_tolerance,
        )
    }
}
