//! Status Publisher Port (Driven Port)
//!
//! Push-channel abstraction for streaming lifecycle transitions to the
//! submitting client. Delivery is best-effort; the persisted order record is
//! the durable source of truth.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order::{OrderStatus, QuotedPrice, VenueId};
use crate::domain::shared::{OrderId, TxRef};

/// Status-specific payload attached to a lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", rename_all_fields = "camelCase", tag = "kind")]
pub enum StatusDetail {
    /// Routing decision: every venue's quoted price and the winner.
    Routing {
        /// Quoted unit price per venue.
        quotes: Vec<QuotedPrice>,
        /// Venue selected for execution.
        venue_selected: VenueId,
    },
    /// Successful execution result.
    Confirmed {
        /// Venue-assigned transaction reference.
        tx_ref: TxRef,
        /// Price realized at execution.
        executed_price: Decimal,
        /// Output amount received.
        amount_out: Decimal,
    },
    /// Execution failure.
    Failed {
        /// Error message recorded on the order.
        error: String,
    },
}

/// A lifecycle transition pushed to the order's subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    /// Order the event belongs to.
    pub order_id: OrderId,
    /// Status entered.
    pub status: OrderStatus,
    /// When the transition happened.
    pub timestamp: DateTime<Utc>,
    /// Status-specific payload, absent for plain transitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<StatusDetail>,
}

impl StatusEvent {
    /// Event with no status-specific payload.
    #[must_use]
    pub fn plain(order_id: OrderId, status: OrderStatus) -> Self {
        Self {
            order_id,
            status,
            timestamp: Utc::now(),
            data: None,
        }
    }

    /// Event carrying a status-specific payload.
    #[must_use]
    pub fn with_detail(order_id: OrderId, status: OrderStatus, detail: StatusDetail) -> Self {
        Self {
            order_id,
            status,
            timestamp: Utc::now(),
            data: Some(detail),
        }
    }
}

/// Port for pushing status events to live subscribers.
///
/// Publishing never fails: events for orders without an open subscriber
/// channel are silently dropped, not queued.
pub trait StatusPublisherPort: Send + Sync {
    /// Push one lifecycle event, best-effort.
    fn publish(&self, event: StatusEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_event_omits_data_field() {
        let event = StatusEvent::plain(OrderId::new("ord-1"), OrderStatus::Building);
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["status"], "BUILDING");
    }

    #[test]
    fn failed_detail_serializes_error_string() {
        let event = StatusEvent::with_detail(
            OrderId::new("ord-1"),
            OrderStatus::Failed,
            StatusDetail::Failed {
                error: "slippage".to_string(),
            },
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["data"]["kind"], "failed");
        assert_eq!(json["data"]["error"], "slippage");
    }
}
