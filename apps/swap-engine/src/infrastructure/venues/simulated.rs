//! Simulated liquidity venue.
//!
//! One adapter implementation covers every simulated venue; the differences
//! between venues (fee, base-price table, latencies, variance) live in the
//! `VenueProfile` configuration, not in code. Randomness comes from an
//! injectable seedable generator so simulations are deterministic under test.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::application::ports::{VenueError, VenuePort};
use crate::domain::order::{Quote, SwapReceipt, VenueId};
use crate::domain::shared::{Symbol, TxRef};

/// Length of a simulated transaction reference.
const TX_REF_LEN: usize = 88;

/// Base58-style alphabet used for transaction references.
const TX_REF_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Configuration of one simulated venue.
#[derive(Debug, Clone)]
pub struct VenueProfile {
    /// Venue identifier the adapter registers under.
    pub id: VenueId,
    /// Venue fee as a fraction of the swapped amount.
    pub fee: Decimal,
    /// Base unit price per "IN/OUT" pair; unknown pairs default to 1.
    pub base_prices: HashMap<String, Decimal>,
    /// Simulated network latency before a quote is produced.
    pub quote_latency_ms: u64,
    /// Simulated settlement latency before execution completes.
    pub execution_latency_ms: u64,
    /// Additional settlement jitter, uniformly sampled.
    pub execution_jitter_ms: u64,
    /// Quote price variance around the base rate, in basis points.
    pub quote_variance_bps: i64,
    /// Execution price variance, in basis points. Slightly wider than the
    /// quote variance to model quote staleness.
    pub execution_variance_bps: i64,
    /// Probability of a simulated transient network failure per call.
    pub failure_rate: f64,
}

impl VenueProfile {
    /// Default profile for the "orca" venue (25 bps fee).
    #[must_use]
    pub fn orca() -> Self {
        Self {
            id: VenueId::new("orca"),
            fee: Decimal::new(25, 4),
            base_prices: Self::default_base_prices(),
            quote_latency_ms: 200,
            execution_latency_ms: 2000,
            execution_jitter_ms: 1000,
            quote_variance_bps: 200,
            execution_variance_bps: 250,
            failure_rate: 0.0,
        }
    }

    /// Default profile for the "phoenix" venue (20 bps fee).
    #[must_use]
    pub fn phoenix() -> Self {
        Self {
            id: VenueId::new("phoenix"),
            fee: Decimal::new(20, 4),
            ..Self::orca()
        }
    }

    fn default_base_prices() -> HashMap<String, Decimal> {
        HashMap::from([
            ("SOL/USDC".to_string(), Decimal::new(100, 0)),
            ("USDC/SOL".to_string(), Decimal::new(1, 2)),
            ("SOL/USDT".to_string(), Decimal::new(100, 0)),
            ("USDT/SOL".to_string(), Decimal::new(1, 2)),
            ("ETH/USDC".to_string(), Decimal::new(2500, 0)),
            ("USDC/ETH".to_string(), Decimal::new(4, 4)),
        ])
    }
}

/// A liquidity venue simulator driven by a `VenueProfile`.
pub struct SimulatedVenue {
    profile: VenueProfile,
    rng: Mutex<StdRng>,
}

impl SimulatedVenue {
    /// Create a venue seeded from the operating system.
    #[must_use]
    pub fn new(profile: VenueProfile) -> Self {
        Self {
            profile,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Create a venue with a fixed seed for deterministic simulation.
    #[must_use]
    pub fn with_seed(profile: VenueProfile, seed: u64) -> Self {
        Self {
            profile,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn base_price(&self, token_in: &Symbol, token_out: &Symbol) -> Decimal {
        let pair = format!("{token_in}/{token_out}");
        self.profile
            .base_prices
            .get(&pair)
            .copied()
            .unwrap_or(Decimal::ONE)
    }

    /// Sample a multiplier in `1 ± variance_bps`.
    fn variance(&self, variance_bps: i64) -> Decimal {
        let bps = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .random_range(-variance_bps..=variance_bps);
        Decimal::ONE + Decimal::new(bps, 4)
    }

    fn roll_failure(&self) -> bool {
        if self.profile.failure_rate <= 0.0 {
            return false;
        }
        let roll: f64 = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .random();
        roll < self.profile.failure_rate
    }

    /// Sample a slippage estimate between 10 and 30 bps.
    fn slippage_estimate(&self) -> Decimal {
        let bps = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .random_range(10..=30);
        Decimal::new(bps, 4)
    }

    fn settlement_delay(&self) -> Duration {
        let jitter = if self.profile.execution_jitter_ms == 0 {
            0
        } else {
            self.rng
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .random_range(0..=self.profile.execution_jitter_ms)
        };
        Duration::from_millis(self.profile.execution_latency_ms + jitter)
    }

    fn generate_tx_ref(&self) -> TxRef {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let tx: String = (0..TX_REF_LEN)
            .map(|_| {
                let index = rng.random_range(0..TX_REF_ALPHABET.len());
                char::from(TX_REF_ALPHABET[index])
            })
            .collect();
        TxRef::new(tx)
    }
}

#[async_trait]
impl VenuePort for SimulatedVenue {
    fn id(&self) -> &VenueId {
        &self.profile.id
    }

    async fn get_quote(
        &self,
        token_in: &Symbol,
        token_out: &Symbol,
        amount_in: Decimal,
    ) -> Result<Quote, VenueError> {
        tokio::time::sleep(Duration::from_millis(self.profile.quote_latency_ms)).await;

        if self.roll_failure() {
            return Err(VenueError::Network {
                message: format!("{}: quote request timed out", self.profile.id),
            });
        }

        let price = self.base_price(token_in, token_out) * self.variance(self.profile.quote_variance_bps);
        let amount_out = amount_in * price * (Decimal::ONE - self.profile.fee);

        let quote = Quote {
            venue: self.profile.id.clone(),
            price,
            amount_out,
            fee: self.profile.fee,
            slippage: self.slippage_estimate(),
            timestamp: Utc::now(),
        };

        tracing::debug!(venue = %self.profile.id, price = %price, amount_out = %amount_out, "quote produced");
        Ok(quote)
    }

    async fn execute_swap(
        &self,
        token_in: &Symbol,
        token_out: &Symbol,
        amount_in: Decimal,
        min_amount_out: Decimal,
    ) -> Result<SwapReceipt, VenueError> {
        tokio::time::sleep(self.settlement_delay()).await;

        if self.roll_failure() {
            return Err(VenueError::Network {
                message: format!("{}: swap submission failed", self.profile.id),
            });
        }

        // Re-randomized independently of the quote: the market has moved.
        let executed_price =
            self.base_price(token_in, token_out) * self.variance(self.profile.execution_variance_bps);
        let amount_out = amount_in * executed_price * (Decimal::ONE - self.profile.fee);

        if amount_out < min_amount_out {
            return Err(VenueError::SlippageExceeded {
                amount_out,
                min_amount_out,
            });
        }

        let receipt = SwapReceipt {
            tx_ref: self.generate_tx_ref(),
            executed_price,
            amount_out,
        };

        tracing::debug!(
            venue = %self.profile.id,
            tx_ref = %receipt.tx_ref,
            executed_price = %executed_price,
            "swap executed"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fast(profile: VenueProfile) -> VenueProfile {
        VenueProfile {
            quote_latency_ms: 0,
            execution_latency_ms: 0,
            execution_jitter_ms: 0,
            ..profile
        }
    }

    fn pair() -> (Symbol, Symbol) {
        (Symbol::new("SOL"), Symbol::new("USDC"))
    }

    #[tokio::test]
    async fn quote_price_stays_within_variance_band() {
        let venue = SimulatedVenue::with_seed(fast(VenueProfile::orca()), 7);
        let (token_in, token_out) = pair();

        for _ in 0..50 {
            let quote = venue.get_quote(&token_in, &token_out, dec!(10)).await.unwrap();
            assert!(quote.price >= dec!(98.0), "price {} too low", quote.price);
            assert!(quote.price <= dec!(102.0), "price {} too high", quote.price);
        }
    }

    #[tokio::test]
    async fn quote_output_reflects_the_fee() {
        let venue = SimulatedVenue::with_seed(fast(VenueProfile::orca()), 7);
        let (token_in, token_out) = pair();

        let quote = venue.get_quote(&token_in, &token_out, dec!(10)).await.unwrap();
        let expected = dec!(10) * quote.price * (Decimal::ONE - quote.fee);
        assert_eq!(quote.amount_out, expected);
    }

    #[tokio::test]
    async fn unknown_pair_defaults_to_unit_price() {
        let venue = SimulatedVenue::with_seed(fast(VenueProfile::phoenix()), 7);
        let quote = venue
            .get_quote(&Symbol::new("FOO"), &Symbol::new("BAR"), dec!(100))
            .await
            .unwrap();

        assert!(quote.price >= dec!(0.98) && quote.price <= dec!(1.02));
    }

    #[tokio::test]
    async fn same_seed_produces_the_same_quotes() {
        let (token_in, token_out) = pair();
        let first = SimulatedVenue::with_seed(fast(VenueProfile::orca()), 42);
        let second = SimulatedVenue::with_seed(fast(VenueProfile::orca()), 42);

        let a = first.get_quote(&token_in, &token_out, dec!(10)).await.unwrap();
        let b = second.get_quote(&token_in, &token_out, dec!(10)).await.unwrap();
        assert_eq!(a.price, b.price);
        assert_eq!(a.amount_out, b.amount_out);
    }

    #[tokio::test]
    async fn huge_floor_always_trips_slippage_protection() {
        let (token_in, token_out) = pair();
        for profile in [VenueProfile::orca(), VenueProfile::phoenix()] {
            let venue = SimulatedVenue::with_seed(fast(profile), 9);
            let result = venue
                .execute_swap(&token_in, &token_out, dec!(10), dec!(1_000_000))
                .await;
            assert!(matches!(
                result,
                Err(VenueError::SlippageExceeded { .. })
            ));
        }
    }

    #[tokio::test]
    async fn successful_swap_returns_fixed_length_tx_ref() {
        let venue = SimulatedVenue::with_seed(fast(VenueProfile::orca()), 11);
        let (token_in, token_out) = pair();

        let receipt = venue
            .execute_swap(&token_in, &token_out, dec!(10), dec!(1))
            .await
            .unwrap();

        assert_eq!(receipt.tx_ref.as_str().len(), TX_REF_LEN);
        assert!(receipt.amount_out > Decimal::ZERO);
        assert!(receipt.executed_price > Decimal::ZERO);
    }

    #[tokio::test]
    async fn full_failure_rate_simulates_network_errors() {
        let profile = VenueProfile {
            failure_rate: 1.0,
            ..fast(VenueProfile::orca())
        };
        let venue = SimulatedVenue::with_seed(profile, 3);
        let (token_in, token_out) = pair();

        let result = venue.get_quote(&token_in, &token_out, dec!(10)).await;
        assert!(matches!(result, Err(VenueError::Network { .. })));
    }
}
