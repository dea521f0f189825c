//! Durable, at-least-once job queue keyed by order id.
//!
//! Producers enqueue one job per order; the dedup key rejects a second
//! submission while a job for the same order is unresolved. Workers dequeue
//! in arrival order, then resolve each job with `ack`, `retry` (delayed
//! redelivery), or `mark_failed`. Resolved jobs are retained for a bounded
//! window for inspection and purged by the housekeeping sweep.

mod rate_limit;
mod retry;
mod worker;

pub use rate_limit::RollingWindowLimiter;
pub use retry::RetryPolicy;
pub use worker::{JobHandler, WorkerConfig, WorkerPool};

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::application::ports::{JobQueuePort, QueueError};
use crate::domain::order::OrderSpec;
use crate::domain::shared::OrderId;

/// A queued unit of work: one order's execution request.
///
/// Serializes to the flat queue-message shape
/// `{orderId, orderType, tokenIn, tokenOut, amountIn, userId?, attemptsMade}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// The order to execute.
    #[serde(flatten)]
    pub spec: OrderSpec,
    /// Number of attempts already made (0 on first delivery).
    pub attempts_made: u32,
}

/// Resolution state tracked per order id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobPhase {
    /// Ready for delivery.
    Waiting,
    /// Scheduled for redelivery after a backoff delay.
    Delayed,
    /// Delivered to a worker, not yet resolved.
    Active,
    /// Resolved successfully; retained until swept.
    Completed,
    /// Permanently failed; retained until swept.
    Failed,
}

impl JobPhase {
    const fn is_resolved(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Queue depth counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueMetrics {
    /// Jobs ready for delivery.
    pub waiting: usize,
    /// Jobs awaiting a backoff deadline.
    pub delayed: usize,
    /// Jobs currently held by workers.
    pub active: usize,
    /// Retained completed jobs.
    pub completed: usize,
    /// Retained permanently-failed jobs.
    pub failed: usize,
}

impl QueueMetrics {
    /// Total jobs known to the queue, retained included.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.waiting + self.delayed + self.active + self.completed + self.failed
    }
}

/// Retention windows for resolved jobs.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// How long completed jobs stay visible before the sweep purges them.
    pub completed: Duration,
    /// How long failed jobs stay visible before the sweep purges them.
    pub failed: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            completed: Duration::from_secs(24 * 3600),
            failed: Duration::from_secs(7 * 24 * 3600),
        }
    }
}

#[derive(Debug)]
struct DelayedJob {
    ready_at: Instant,
    seq: u64,
    job: Job,
}

impl PartialEq for DelayedJob {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for DelayedJob {}

impl PartialOrd for DelayedJob {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DelayedJob {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.ready_at, self.seq).cmp(&(other.ready_at, other.seq))
    }
}

#[derive(Debug, Default)]
struct QueueState {
    ready: VecDeque<Job>,
    delayed: BinaryHeap<Reverse<DelayedJob>>,
    phases: HashMap<String, (JobPhase, Instant)>,
    next_seq: u64,
    closed: bool,
}

impl QueueState {
    /// Move jobs whose backoff deadline has passed into the ready queue.
    fn promote_due(&mut self, now: Instant) {
        while let Some(Reverse(head)) = self.delayed.peek() {
            if head.ready_at > now {
                break;
            }
            let Some(Reverse(entry)) = self.delayed.pop() else {
                break;
            };
            self.phases.insert(
                entry.job.spec.order_id.to_string(),
                (JobPhase::Waiting, now),
            );
            self.ready.push_back(entry.job);
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.delayed.peek().map(|Reverse(entry)| entry.ready_at)
    }
}

/// In-process implementation of the durable order-execution queue.
#[derive(Debug, Default)]
pub struct JobQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    retention: RetentionPolicy,
}

impl JobQueue {
    /// Create a queue with the default retention policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_retention(RetentionPolicy::default())
    }

    /// Create a queue with explicit retention windows.
    #[must_use]
    pub fn with_retention(retention: RetentionPolicy) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
            retention,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Deliver the next job in arrival order, waiting for work if necessary.
    ///
    /// Returns `None` once the queue is closed and fully drained.
    pub async fn dequeue(&self) -> Option<Job> {
        loop {
            // Register interest before inspecting state so an enqueue racing
            // with the check cannot be missed.
            let notified = self.notify.notified();

            let deadline = {
                let mut state = self.lock();
                state.promote_due(Instant::now());
                if let Some(job) = state.ready.pop_front() {
                    state.phases.insert(
                        job.spec.order_id.to_string(),
                        (JobPhase::Active, Instant::now()),
                    );
                    return Some(job);
                }
                if state.closed && state.delayed.is_empty() {
                    return None;
                }
                state.next_deadline()
            };

            match deadline {
                Some(ready_at) => {
                    tokio::select! {
                        () = notified => {}
                        () = tokio::time::sleep_until(ready_at) => {}
                    }
                }
                None => notified.await,
            }
        }
    }

    /// Resolve a delivered job as successfully completed.
    pub fn ack(&self, order_id: &OrderId) {
        let mut state = self.lock();
        state.phases.insert(
            order_id.to_string(),
            (JobPhase::Completed, Instant::now()),
        );
    }

    /// Schedule a delivered job for redelivery after `delay`.
    ///
    /// The redelivered job carries an incremented attempt count; redelivery
    /// order for one order id follows its own prior attempts.
    pub fn retry(&self, job: Job, delay: Duration) {
        let mut state = self.lock();
        let order_id = job.spec.order_id.to_string();
        let seq = state.next_seq;
        state.next_seq += 1;
        state
            .phases
            .insert(order_id, (JobPhase::Delayed, Instant::now()));
        state.delayed.push(Reverse(DelayedJob {
            ready_at: Instant::now() + delay,
            seq,
            job: Job {
                attempts_made: job.attempts_made + 1,
                spec: job.spec,
            },
        }));
        drop(state);
        // Wake the dispatcher so it re-arms its timer on the new deadline.
        self.notify.notify_one();
    }

    /// Resolve a delivered job as permanently failed.
    pub fn mark_failed(&self, order_id: &OrderId) {
        let mut state = self.lock();
        state
            .phases
            .insert(order_id.to_string(), (JobPhase::Failed, Instant::now()));
    }

    /// Current queue depth counters.
    #[must_use]
    pub fn metrics(&self) -> QueueMetrics {
        let state = self.lock();
        let mut metrics = QueueMetrics {
            waiting: 0,
            delayed: 0,
            active: 0,
            completed: 0,
            failed: 0,
        };
        for (phase, _) in state.phases.values() {
            match phase {
                JobPhase::Waiting => metrics.waiting += 1,
                JobPhase::Delayed => metrics.delayed += 1,
                JobPhase::Active => metrics.active += 1,
                JobPhase::Completed => metrics.completed += 1,
                JobPhase::Failed => metrics.failed += 1,
            }
        }
        metrics
    }

    /// Purge resolved jobs older than their retention window.
    ///
    /// Advisory housekeeping only; correctness never depends on it. Returns
    /// the number of purged entries.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut state = self.lock();
        let retention = &self.retention;
        let before = state.phases.len();
        state.phases.retain(|_, (phase, resolved_at)| match phase {
            JobPhase::Completed => now.duration_since(*resolved_at) < retention.completed,
            JobPhase::Failed => now.duration_since(*resolved_at) < retention.failed,
            _ => true,
        });
        let purged = before - state.phases.len();
        if purged > 0 {
            tracing::debug!(purged, "queue sweep purged resolved jobs");
        }
        purged
    }

    /// Stop accepting work. Pending delayed jobs still drain.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        drop(state);
        self.notify.notify_waiters();
        // Also store a permit for a consumer that checked state before this
        // close but has not reached its await point yet.
        self.notify.notify_one();
    }
}

#[async_trait]
impl JobQueuePort for JobQueue {
    async fn enqueue(&self, spec: OrderSpec) -> Result<(), QueueError> {
        let mut state = self.lock();
        if state.closed {
            return Err(QueueError::Closed);
        }
        let key = spec.order_id.to_string();
        if let Some((phase, _)) = state.phases.get(&key) {
            if !phase.is_resolved() {
                return Err(QueueError::DuplicateJob { order_id: key });
            }
        }
        state
            .phases
            .insert(key, (JobPhase::Waiting, Instant::now()));
        state.ready.push_back(Job {
            spec,
            attempts_made: 0,
        });
        drop(state);
        self.notify.notify_one();
        Ok(())
    }
}
