//! Order aggregate root.
//!
//! The `Order` aggregate owns the complete lifecycle of a swap order. All
//! status mutations go through transition methods that enforce the
//! forward-only lifecycle; fields recorded by earlier transitions (quotes,
//! selected venue) are never cleared once set.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{OrderId, Symbol, TxRef, UserId};

use super::errors::OrderError;
use super::quote::{Quote, QuotedPrice, SwapReceipt};
use super::value_objects::{OrderStatus, OrderType, VenueId};

/// Immutable, producer-supplied description of a swap order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSpec {
    /// Unique order identifier.
    pub order_id: OrderId,
    /// Requested execution behavior.
    pub order_type: OrderType,
    /// Token being sold.
    pub token_in: Symbol,
    /// Token being bought.
    pub token_out: Symbol,
    /// Amount of `token_in` to swap.
    pub amount_in: Decimal,
    /// Submitting user, when known.
    pub user_id: Option<UserId>,
}

impl OrderSpec {
    /// Validate the spec's shape and ranges.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidParameters` for empty symbols or a
    /// non-positive amount.
    pub fn validate(&self) -> Result<(), OrderError> {
        if !self.token_in.is_valid() {
            return Err(OrderError::InvalidParameters {
                field: "token_in".to_string(),
                message: "token symbol must not be empty".to_string(),
            });
        }
        if !self.token_out.is_valid() {
            return Err(OrderError::InvalidParameters {
                field: "token_out".to_string(),
                message: "token symbol must not be empty".to_string(),
            });
        }
        if self.amount_in <= Decimal::ZERO {
            return Err(OrderError::InvalidParameters {
                field: "amount_in".to_string(),
                message: "amount must be a positive number".to_string(),
            });
        }
        Ok(())
    }
}

/// The order record, persisted by the repository and mutated exclusively
/// through the execution pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    pub order_id: OrderId,
    /// Submitting user, when known.
    pub user_id: Option<UserId>,
    /// Requested execution behavior.
    pub order_type: OrderType,
    /// Token being sold.
    pub token_in: Symbol,
    /// Token being bought.
    pub token_out: Symbol,
    /// Amount of `token_in` to swap.
    pub amount_in: Decimal,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Venue chosen during routing.
    pub venue_selected: Option<VenueId>,
    /// Unit prices quoted per venue, recorded during routing.
    pub quoted_prices: Vec<QuotedPrice>,
    /// Price realized at execution.
    pub executed_price: Option<Decimal>,
    /// Output amount actually received.
    pub amount_out: Option<Decimal>,
    /// Venue-assigned transaction reference.
    pub tx_ref: Option<TxRef>,
    /// Error message from the most recent failed attempt.
    pub error: Option<String>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order in `PENDING` status from a validated spec.
    #[must_use]
    pub fn new(spec: OrderSpec) -> Self {
        let now = Utc::now();
        Self {
            order_id: spec.order_id,
            user_id: spec.user_id,
            order_type: spec.order_type,
            token_in: spec.token_in,
            token_out: spec.token_out,
            amount_in: spec.amount_in,
            status: OrderStatus::Pending,
            venue_selected: None,
            quoted_prices: Vec::new(),
            executed_price: None,
            amount_out: None,
            tx_ref: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstruct the immutable spec from the record (for re-execution).
    #[must_use]
    pub fn spec(&self) -> OrderSpec {
        OrderSpec {
            order_id: self.order_id.clone(),
            order_type: self.order_type,
            token_in: self.token_in.clone(),
            token_out: self.token_out.clone(),
            amount_in: self.amount_in,
            user_id: self.user_id.clone(),
        }
    }

    fn transition_to(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidStateTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Re-enter the pipeline after a worker-pool redelivery.
    ///
    /// Only a `FAILED` order can be reset; the new attempt runs the whole
    /// pipeline from scratch. Quotes and prices from earlier attempts stay on
    /// the record.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidStateTransition` unless the order is
    /// currently `FAILED`.
    pub fn reset_for_retry(&mut self) -> Result<(), OrderError> {
        self.transition_to(OrderStatus::Pending)
    }

    /// Enter `ROUTING`.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidStateTransition` if the order is not
    /// `PENDING`.
    pub fn begin_routing(&mut self) -> Result<(), OrderError> {
        self.transition_to(OrderStatus::Routing)
    }

    /// Record the routing outcome: every venue's quoted price and the winner.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidStateTransition` if called outside
    /// `ROUTING`.
    pub fn record_routing(&mut self, quotes: &[Quote], selected: &Quote) -> Result<(), OrderError> {
        if self.status != OrderStatus::Routing {
            return Err(OrderError::InvalidStateTransition {
                from: self.status,
                to: OrderStatus::Routing,
            });
        }
        self.quoted_prices
            .extend(quotes.iter().map(QuotedPrice::from_quote));
        self.venue_selected = Some(selected.venue.clone());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Enter `BUILDING`.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidStateTransition` if the order is not
    /// `ROUTING`.
    pub fn begin_building(&mut self) -> Result<(), OrderError> {
        self.transition_to(OrderStatus::Building)
    }

    /// Enter `SUBMITTED`.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidStateTransition` if the order is not
    /// `BUILDING`.
    pub fn begin_submission(&mut self) -> Result<(), OrderError> {
        self.transition_to(OrderStatus::Submitted)
    }

    /// Enter `CONFIRMED`, recording the execution result.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidStateTransition` if the order is not
    /// `SUBMITTED`.
    pub fn confirm(&mut self, receipt: SwapReceipt) -> Result<(), OrderError> {
        self.transition_to(OrderStatus::Confirmed)?;
        self.tx_ref = Some(receipt.tx_ref);
        self.executed_price = Some(receipt.executed_price);
        self.amount_out = Some(receipt.amount_out);
        Ok(())
    }

    /// Enter `FAILED`, recording the error message.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidStateTransition` if the order is already
    /// terminal.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), OrderError> {
        self.transition_to(OrderStatus::Failed)?;
        self.error = Some(message.into());
        Ok(())
    }
}
