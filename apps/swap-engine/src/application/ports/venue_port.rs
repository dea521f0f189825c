//! Venue Port (Driven Port)
//!
//! Interface for quoting and executing swaps against one liquidity venue.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::order::{Quote, SwapReceipt, VenueId};
use crate::domain::shared::Symbol;

/// Venue port error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VenueError {
    /// Execution would settle below the slippage-protected minimum.
    /// The swap does not proceed; no venue-side state changes.
    #[error("slippage protection: amount out {amount_out} < minimum {min_amount_out}")]
    SlippageExceeded {
        /// Output the venue would have settled.
        amount_out: Decimal,
        /// Slippage-protected floor requested by the caller.
        min_amount_out: Decimal,
    },

    /// Transient network failure talking to the venue. Retryable.
    #[error("venue network error: {message}")]
    Network {
        /// Error details.
        message: String,
    },
}

/// Port for a single liquidity venue.
///
/// Implementations simulate or integrate one venue; the router fans out
/// across all registered implementations.
#[async_trait]
pub trait VenuePort: Send + Sync {
    /// Identifier this venue registered under.
    fn id(&self) -> &VenueId;

    /// Quote a prospective swap of `amount_in` of `token_in` into `token_out`.
    async fn get_quote(
        &self,
        token_in: &Symbol,
        token_out: &Symbol,
        amount_in: Decimal,
    ) -> Result<Quote, VenueError>;

    /// Execute the swap, aborting with `SlippageExceeded` when the realized
    /// output would fall below `min_amount_out`.
    async fn execute_swap(
        &self,
        token_in: &Symbol,
        token_out: &Symbol,
        amount_in: Decimal,
        min_amount_out: Decimal,
    ) -> Result<SwapReceipt, VenueError>;
}
