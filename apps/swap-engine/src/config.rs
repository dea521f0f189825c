//! Configuration module for the swap engine.
//!
//! All settings default sensibly and can be overridden through environment
//! variables, so the engine runs out of the box in development.
//!
//! # Environment Variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `PORT` | `3000` | HTTP server port |
//! | `BIND_ADDRESS` | `0.0.0.0` | HTTP bind address |
//! | `MAX_CONCURRENT_ORDERS` | `10` | Worker pool concurrency ceiling |
//! | `ORDERS_PER_MINUTE` | `100` | Job starts per rolling 60s window |
//! | `MAX_RETRIES` | `3` | Execution attempts per job |
//! | `BACKOFF_BASE_MS` | `1000` | Initial retry backoff |
//! | `BACKOFF_CAP_MS` | `10000` | Retry backoff ceiling |
//! | `VENUE_NETWORK_DELAY_MS` | `200` | Simulated quote latency |
//! | `VENUE_EXECUTION_DELAY_MS` | `2000` | Simulated settlement latency |
//! | `VENUE_FAILURE_RATE` | `0.0` | Simulated transient failure rate |
//! | `DEFAULT_SLIPPAGE_TOLERANCE` | `0.01` | Slippage protection fraction |
//! | `RUST_LOG` | `info` | Log filter |

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::infrastructure::queue::{RetentionPolicy, RetryPolicy, WorkerConfig};
use crate::infrastructure::venues::VenueProfile;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSettings,
    /// Queue and worker pool settings.
    #[serde(default)]
    pub queue: QueueSettings,
    /// Venue simulation settings, applied to every venue profile.
    #[serde(default)]
    pub venues: VenueSettings,
    /// Trading settings.
    #[serde(default)]
    pub trading: TradingSettings,
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server: ServerSettings {
                port: env_or("PORT", default_port()),
                bind_address: std::env::var("BIND_ADDRESS")
                    .unwrap_or_else(|_| default_bind_address()),
            },
            queue: QueueSettings {
                max_concurrent_orders: env_or("MAX_CONCURRENT_ORDERS", default_concurrency()),
                orders_per_minute: env_or("ORDERS_PER_MINUTE", default_rate()),
                max_retries: env_or("MAX_RETRIES", default_max_retries()),
                backoff_base_ms: env_or("BACKOFF_BASE_MS", default_backoff_base_ms()),
                backoff_cap_ms: env_or("BACKOFF_CAP_MS", default_backoff_cap_ms()),
                completed_retention_secs: env_or(
                    "COMPLETED_RETENTION_SECS",
                    default_completed_retention_secs(),
                ),
                failed_retention_secs: env_or(
                    "FAILED_RETENTION_SECS",
                    default_failed_retention_secs(),
                ),
                sweep_interval_secs: env_or("SWEEP_INTERVAL_SECS", default_sweep_interval_secs()),
            },
            venues: VenueSettings {
                network_delay_ms: env_or("VENUE_NETWORK_DELAY_MS", default_network_delay_ms()),
                execution_delay_ms: env_or(
                    "VENUE_EXECUTION_DELAY_MS",
                    default_execution_delay_ms(),
                ),
                execution_jitter_ms: env_or(
                    "VENUE_EXECUTION_JITTER_MS",
                    default_execution_jitter_ms(),
                ),
                failure_rate: env_or("VENUE_FAILURE_RATE", 0.0),
            },
            trading: TradingSettings {
                slippage_tolerance: env_or(
                    "DEFAULT_SLIPPAGE_TOLERANCE",
                    default_slippage_tolerance(),
                ),
            },
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Port for the REST endpoints.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
        }
    }
}

/// Queue and worker pool settings.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueSettings {
    /// Worker pool concurrency ceiling.
    #[serde(default = "default_concurrency")]
    pub max_concurrent_orders: usize,
    /// Job starts per rolling 60-second window.
    #[serde(default = "default_rate")]
    pub orders_per_minute: usize,
    /// Execution attempts per job.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Initial retry backoff in milliseconds.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Retry backoff ceiling in milliseconds.
    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,
    /// Retention for completed jobs, in seconds.
    #[serde(default = "default_completed_retention_secs")]
    pub completed_retention_secs: u64,
    /// Retention for permanently failed jobs, in seconds.
    #[serde(default = "default_failed_retention_secs")]
    pub failed_retention_secs: u64,
    /// Interval of the housekeeping sweep, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            max_concurrent_orders: default_concurrency(),
            orders_per_minute: default_rate(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_cap_ms: default_backoff_cap_ms(),
            completed_retention_secs: default_completed_retention_secs(),
            failed_retention_secs: default_failed_retention_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl QueueSettings {
    /// Worker pool configuration derived from these settings.
    #[must_use]
    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            max_concurrent: self.max_concurrent_orders,
            jobs_per_minute: self.orders_per_minute,
            retry: RetryPolicy::new(
                self.max_retries,
                Duration::from_millis(self.backoff_base_ms),
                Duration::from_millis(self.backoff_cap_ms),
            ),
        }
    }

    /// Retention policy derived from these settings.
    #[must_use]
    pub fn retention(&self) -> RetentionPolicy {
        RetentionPolicy {
            completed: Duration::from_secs(self.completed_retention_secs),
            failed: Duration::from_secs(self.failed_retention_secs),
        }
    }

    /// Housekeeping sweep interval.
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Venue simulation settings, applied on top of each venue's profile.
#[derive(Debug, Clone, Deserialize)]
pub struct VenueSettings {
    /// Simulated network latency before quoting, in milliseconds.
    #[serde(default = "default_network_delay_ms")]
    pub network_delay_ms: u64,
    /// Simulated settlement latency, in milliseconds.
    #[serde(default = "default_execution_delay_ms")]
    pub execution_delay_ms: u64,
    /// Additional settlement jitter, in milliseconds.
    #[serde(default = "default_execution_jitter_ms")]
    pub execution_jitter_ms: u64,
    /// Probability of a simulated transient failure per venue call.
    #[serde(default)]
    pub failure_rate: f64,
}

impl Default for VenueSettings {
    fn default() -> Self {
        Self {
            network_delay_ms: default_network_delay_ms(),
            execution_delay_ms: default_execution_delay_ms(),
            execution_jitter_ms: default_execution_jitter_ms(),
            failure_rate: 0.0,
        }
    }
}

impl VenueSettings {
    /// The configured venue profiles with these latency/failure settings
    /// applied.
    #[must_use]
    pub fn profiles(&self) -> Vec<VenueProfile> {
        [VenueProfile::orca(), VenueProfile::phoenix()]
            .into_iter()
            .map(|profile| VenueProfile {
                quote_latency_ms: self.network_delay_ms,
                execution_latency_ms: self.execution_delay_ms,
                execution_jitter_ms: self.execution_jitter_ms,
                failure_rate: self.failure_rate,
                ..profile
            })
            .collect()
    }
}

/// Trading settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TradingSettings {
    /// Fraction shaved off the best quote to form the slippage floor.
    #[serde(default = "default_slippage_tolerance")]
    pub slippage_tolerance: Decimal,
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            slippage_tolerance: default_slippage_tolerance(),
        }
    }
}

const fn default_port() -> u16 {
    3000
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

const fn default_concurrency() -> usize {
    10
}

const fn default_rate() -> usize {
    100
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_backoff_base_ms() -> u64 {
    1000
}

const fn default_backoff_cap_ms() -> u64 {
    10_000
}

const fn default_completed_retention_secs() -> u64 {
    24 * 3600
}

const fn default_failed_retention_secs() -> u64 {
    7 * 24 * 3600
}

const fn default_sweep_interval_secs() -> u64 {
    3600
}

const fn default_network_delay_ms() -> u64 {
    200
}

const fn default_execution_delay_ms() -> u64 {
    2000
}

const fn default_execution_jitter_ms() -> u64 {
    1000
}

fn default_slippage_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = EngineConfig::default();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.queue.max_concurrent_orders, 10);
        assert_eq!(config.queue.orders_per_minute, 100);
        assert_eq!(config.queue.max_retries, 3);
        assert_eq!(config.trading.slippage_tolerance, Decimal::new(1, 2));
    }

    #[test]
    fn worker_config_carries_the_retry_policy() {
        let worker = QueueSettings::default().worker_config();

        assert_eq!(worker.max_concurrent, 10);
        assert_eq!(worker.jobs_per_minute, 100);
        assert_eq!(worker.retry.max_retries, 3);
        assert_eq!(worker.retry.base_delay, Duration::from_millis(1000));
        assert_eq!(worker.retry.cap_delay, Duration::from_millis(10_000));
    }

    #[test]
    fn retention_windows_cover_a_day_and_a_week() {
        let retention = QueueSettings::default().retention();
        assert_eq!(retention.completed, Duration::from_secs(86_400));
        assert_eq!(retention.failed, Duration::from_secs(604_800));
    }

    #[test]
    fn venue_profiles_inherit_latency_settings() {
        let settings = VenueSettings {
            network_delay_ms: 5,
            execution_delay_ms: 10,
            execution_jitter_ms: 0,
            failure_rate: 0.5,
        };

        let profiles = settings.profiles();
        assert_eq!(profiles.len(), 2);
        for profile in &profiles {
            assert_eq!(profile.quote_latency_ms, 5);
            assert_eq!(profile.execution_latency_ms, 10);
            assert!((profile.failure_rate - 0.5).abs() < f64::EPSILON);
        }
        // Per-venue fees are profile-owned, not overridden.
        assert_ne!(profiles[0].fee, profiles[1].fee);
    }
}
