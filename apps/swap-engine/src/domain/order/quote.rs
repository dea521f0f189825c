//! Quote and execution result value objects.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::TxRef;

use super::value_objects::VenueId;

/// A venue's price offer for a prospective swap.
///
/// Quotes are ephemeral: they are valid only momentarily and are not
/// persisted beyond the fields copied into the order record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Venue that produced the quote.
    pub venue: VenueId,
    /// Unit price of `token_in` denominated in `token_out`.
    pub price: Decimal,
    /// Projected output amount after fees.
    pub amount_out: Decimal,
    /// Venue fee as a fraction (e.g. 0.0025 for 25 bps).
    pub fee: Decimal,
    /// Estimated slippage fraction at execution time.
    pub slippage: Decimal,
    /// When the quote was produced.
    pub timestamp: DateTime<Utc>,
}

/// A quoted unit price recorded on the order for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotedPrice {
    /// Venue that quoted.
    pub venue: VenueId,
    /// Quoted unit price.
    pub price: Decimal,
}

impl QuotedPrice {
    /// Capture the audit fields of a quote.
    #[must_use]
    pub fn from_quote(quote: &Quote) -> Self {
        Self {
            venue: quote.venue.clone(),
            price: quote.price,
        }
    }
}

/// Result of an executed swap on a venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapReceipt {
    /// Venue-assigned transaction reference.
    pub tx_ref: TxRef,
    /// Price realized at execution.
    pub executed_price: Decimal,
    /// Output amount actually received.
    pub amount_out: Decimal,
}
