//! Value objects for the swap order lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status in the execution lifecycle.
///
/// Statuses advance strictly forward within one execution attempt:
///
/// ```text
/// PENDING -> ROUTING -> BUILDING -> SUBMITTED -> { CONFIRMED | FAILED }
/// ```
///
/// `FAILED` is reachable from every non-terminal status. `CONFIRMED` is
/// terminal. A failed order that is redelivered by the worker pool re-enters
/// the pipeline at `PENDING` and runs from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order accepted and queued, not yet picked up by a worker.
    Pending,
    /// Comparing quotes across venues.
    Routing,
    /// Computing the slippage-protected minimum output.
    Building,
    /// Swap dispatched to the selected venue.
    Submitted,
    /// Swap executed and settled.
    Confirmed,
    /// Execution failed; the error message is recorded on the order.
    Failed,
}

impl OrderStatus {
    /// Returns true if the order is in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }

    /// Returns true if this transition is permitted.
    ///
    /// Forward-only with no skipping; `FAILED` is reachable from any
    /// non-terminal status; `FAILED -> PENDING` is the redelivery edge.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Routing)
                | (Self::Routing, Self::Building)
                | (Self::Building, Self::Submitted)
                | (Self::Submitted, Self::Confirmed)
                | (
                    Self::Pending | Self::Routing | Self::Building | Self::Submitted,
                    Self::Failed
                )
                | (Self::Failed, Self::Pending)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Routing => write!(f, "ROUTING"),
            Self::Building => write!(f, "BUILDING"),
            Self::Submitted => write!(f, "SUBMITTED"),
            Self::Confirmed => write!(f, "CONFIRMED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Order type specifying execution behavior.
///
/// Only market orders are executable today; limit and sniper orders are
/// accepted at submission and rejected when they reach routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Execute immediately at the best available price.
    Market,
    /// Execute at a specified price or better.
    Limit,
    /// Execute when a liquidity event is observed.
    Sniper,
}

impl OrderType {
    /// Returns true if this is a market order (immediate execution).
    #[must_use]
    pub const fn is_market(&self) -> bool {
        matches!(self, Self::Market)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
            Self::Sniper => write!(f, "SNIPER"),
        }
    }
}

/// Identifier of a liquidity venue.
///
/// Venues are pluggable; the id is whatever the adapter registers under,
/// normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueId(String);

impl VenueId {
    /// Create a new venue id, normalized to lowercase.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().to_lowercase())
    }

    /// Get the venue id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VenueId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
