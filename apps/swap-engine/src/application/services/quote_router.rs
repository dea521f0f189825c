//! Quote router: venue fan-out, best-quote selection, execution dispatch.

use std::sync::Arc;

use futures::future::join_all;
use rust_decimal::Decimal;

use crate::application::ports::{VenueError, VenuePort};
use crate::domain::order::{Quote, SwapReceipt, VenueId};
use crate::domain::shared::Symbol;

/// Router error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RouterError {
    /// Router was constructed without any venues.
    #[error("no venues configured")]
    NoVenues,

    /// Execution was dispatched to a venue no adapter registered under.
    #[error("unknown venue: {venue}")]
    UnknownVenue {
        /// The unmatched venue id.
        venue: VenueId,
    },

    /// A venue call failed.
    #[error(transparent)]
    Venue(#[from] VenueError),
}

/// Outcome of routing one order across all venues.
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    /// The winning quote.
    pub best: Quote,
    /// Every venue's quote, in adapter registration order, for audit.
    pub quotes: Vec<Quote>,
}

/// Routes quote requests across all configured venues and dispatches
/// execution to the chosen one.
///
/// Venue order is fixed at construction; it determines the tie-break
/// (the earliest adapter wins on equal output).
pub struct QuoteRouter {
    venues: Vec<Arc<dyn VenuePort>>,
}

impl QuoteRouter {
    /// Create a router over a fixed, ordered set of venue adapters.
    #[must_use]
    pub fn new(venues: Vec<Arc<dyn VenuePort>>) -> Self {
        Self { venues }
    }

    /// Quote all venues concurrently and select the best offer.
    ///
    /// Quotes are requested in parallel, so total latency is the slowest
    /// venue, not the sum. Selection keeps the quote with the strictly
    /// greatest `amount_out`; on an exact tie the earlier adapter wins.
    ///
    /// # Errors
    ///
    /// Fails if no venues are configured or any venue fails to quote.
    pub async fn best_quote(
        &self,
        token_in: &Symbol,
        token_out: &Symbol,
        amount_in: Decimal,
    ) -> Result<RoutingDecision, RouterError> {
        let requests = self
            .venues
            .iter()
            .map(|venue| venue.get_quote(token_in, token_out, amount_in));
        let quotes: Vec<Quote> = join_all(requests)
            .await
            .into_iter()
            .collect::<Result<_, _>>()?;

        let mut iter = quotes.iter();
        let mut best = iter.next().ok_or(RouterError::NoVenues)?;
        for quote in iter {
            if quote.amount_out > best.amount_out {
                best = quote;
            }
        }

        tracing::info!(
            venue = %best.venue,
            amount_out = %best.amount_out,
            quoted_venues = quotes.len(),
            "routing decision made"
        );

        Ok(RoutingDecision {
            best: best.clone(),
            quotes,
        })
    }

    /// Execute the swap on the venue chosen during routing.
    ///
    /// # Errors
    ///
    /// Fails with `UnknownVenue` when no adapter matches `venue`, or with the
    /// venue's own error (slippage, network) when execution fails.
    pub async fn execute_swap(
        &self,
        venue: &VenueId,
        token_in: &Symbol,
        token_out: &Symbol,
        amount_in: Decimal,
        min_amount_out: Decimal,
    ) -> Result<SwapReceipt, RouterError> {
        let adapter = self
            .venues
            .iter()
            .find(|candidate| candidate.id() == venue)
            .ok_or_else(|| RouterError::UnknownVenue {
                venue: venue.clone(),
            })?;

        Ok(adapter
            .execute_swap(token_in, token_out, amount_in, min_amount_out)
            .await?)
    }
}
