//! Bounded-concurrency worker pool consuming the job queue.
//!
//! The dispatcher takes both gates — the rolling-window rate limiter and the
//! concurrency semaphore — before a job starts executing. Failed jobs are
//! re-queued with exponential backoff until the retry budget is exhausted.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{OrderRepositoryPort, StatusPublisherPort};
use crate::application::use_cases::{ExecuteError, ExecuteOrderUseCase};
use crate::domain::order::OrderSpec;

use super::{Job, JobQueue, RetryPolicy, RollingWindowLimiter};

/// Length of the rolling rate-limit window.
const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Worker pool configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum jobs executing simultaneously.
    pub max_concurrent: usize,
    /// Maximum job starts per rolling 60-second window.
    pub jobs_per_minute: usize,
    /// Per-job retry policy.
    pub retry: RetryPolicy,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 10,
            jobs_per_minute: 100,
            retry: RetryPolicy::default(),
        }
    }
}

/// Handler invoked for each delivered job.
///
/// The execution pipeline implements this; tests substitute stubs.
#[async_trait]
pub trait JobHandler: Send + Sync + 'static {
    /// Execute one order, returning the pipeline error on failure.
    async fn handle(&self, spec: &OrderSpec) -> Result<(), ExecuteError>;
}

#[async_trait]
impl<R, P> JobHandler for ExecuteOrderUseCase<R, P>
where
    R: OrderRepositoryPort + 'static,
    P: StatusPublisherPort + 'static,
{
    async fn handle(&self, spec: &OrderSpec) -> Result<(), ExecuteError> {
        self.execute(spec).await
    }
}

/// Consumes the job queue with a concurrency ceiling and a rate limit.
pub struct WorkerPool<H: JobHandler> {
    queue: Arc<JobQueue>,
    handler: Arc<H>,
    config: WorkerConfig,
}

impl<H: JobHandler> WorkerPool<H> {
    /// Create a pool over `queue` delegating each job to `handler`.
    #[must_use]
    pub fn new(queue: Arc<JobQueue>, handler: Arc<H>, config: WorkerConfig) -> Self {
        Self {
            queue,
            handler,
            config,
        }
    }

    /// Spawn the dispatcher task.
    ///
    /// The task runs until `shutdown` is cancelled or the queue closes and
    /// drains, then waits for in-flight jobs to finish.
    #[must_use]
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, shutdown: CancellationToken) {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent));
        let limiter = RollingWindowLimiter::new(self.config.jobs_per_minute, RATE_WINDOW);

        tracing::info!(
            concurrency = self.config.max_concurrent,
            rate = self.config.jobs_per_minute,
            "worker pool started"
        );

        loop {
            let job = tokio::select! {
                () = shutdown.cancelled() => break,
                job = self.queue.dequeue() => match job {
                    Some(job) => job,
                    None => break,
                },
            };

            // Both gates are held before the job starts; dispatched jobs
            // always run to completion.
            limiter.acquire().await;
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };

            let queue = Arc::clone(&self.queue);
            let handler = Arc::clone(&self.handler);
            let retry = self.config.retry.clone();
            tokio::spawn(async move {
                process(&queue, handler.as_ref(), &retry, job).await;
                drop(permit);
            });
        }

        // Drain: wait until every in-flight job has released its slot.
        #[allow(clippy::cast_possible_truncation)]
        let _ = semaphore.acquire_many(self.config.max_concurrent as u32).await;
        tracing::info!("worker pool stopped");
    }
}

async fn process<H: JobHandler>(queue: &JobQueue, handler: &H, retry: &RetryPolicy, job: Job) {
    let order_id = job.spec.order_id.clone();
    let attempt = job.attempts_made;
    tracing::info!(order_id = %order_id, attempt = attempt + 1, "processing order job");

    match handler.handle(&job.spec).await {
        Ok(()) => {
            queue.ack(&order_id);
            tracing::info!(order_id = %order_id, "job completed");
        }
        Err(error) if retry.allows_retry(attempt) => {
            let delay = retry.delay_for(attempt);
            tracing::warn!(
                order_id = %order_id,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "job failed, scheduling redelivery"
            );
            queue.retry(job, delay);
        }
        Err(error) => {
            queue.mark_failed(&order_id);
            tracing::error!(
                order_id = %order_id,
                attempts = attempt + 1,
                error = %error,
                "job permanently failed, retries exhausted"
            );
        }
    }
}
