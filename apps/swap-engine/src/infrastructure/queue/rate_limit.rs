//! Rolling-window rate limiter for job starts.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Caps job starts to a fixed number per rolling window.
///
/// Callers beyond the cap wait until the oldest start falls out of the
/// window; nothing is ever rejected.
#[derive(Debug)]
pub struct RollingWindowLimiter {
    capacity: usize,
    window: Duration,
    starts: Mutex<VecDeque<Instant>>,
}

impl RollingWindowLimiter {
    /// Allow `capacity` starts per `window`.
    #[must_use]
    pub fn new(capacity: usize, window: Duration) -> Self {
        Self {
            capacity,
            window,
            starts: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Wait for a start slot in the rolling window, then claim it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut starts = self.starts.lock().await;
                let now = Instant::now();
                while let Some(oldest) = starts.front() {
                    if now.duration_since(*oldest) >= self.window {
                        starts.pop_front();
                    } else {
                        break;
                    }
                }

                if starts.len() < self.capacity {
                    starts.push_back(now);
                    return;
                }
                // Full: sleep until the oldest start leaves the window.
                starts.front().map(|oldest| *oldest + self.window - now)
            };

            match wait {
                Some(delay) => tokio::time::sleep(delay).await,
                None => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn starts_under_the_cap_are_immediate() {
        let limiter = RollingWindowLimiter::new(3, Duration::from_secs(60));
        let started = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn excess_starts_wait_for_the_window_to_roll() {
        let limiter = RollingWindowLimiter::new(2, Duration::from_secs(60));
        let started = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        // Third start waits until the first leaves the 60s window.
        assert_eq!(started.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn window_rolls_continuously_rather_than_resetting() {
        let limiter = RollingWindowLimiter::new(2, Duration::from_secs(60));

        limiter.acquire().await;
        tokio::time::advance(Duration::from_secs(30)).await;
        limiter.acquire().await;

        let started = Instant::now();
        limiter.acquire().await;
        // Only the first slot (30s old) needs to expire, not the whole window.
        assert_eq!(started.elapsed(), Duration::from_secs(30));
    }
}
