//! HTTP response DTOs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::order::{Order, OrderStatus, OrderType, QuotedPrice, VenueId};
use crate::infrastructure::queue::QueueMetrics;

/// Health check payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service health indicator.
    pub status: String,
    /// Application version.
    pub version: String,
}

/// Error payload for rejected requests.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable rejection reason.
    pub error: String,
}

/// Body of a successful `POST /api/v1/orders`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderResponse {
    /// Assigned order id.
    pub order_id: String,
    /// Initial status (always `PENDING`).
    pub status: OrderStatus,
    /// Human-readable acknowledgment.
    pub message: String,
}

/// External view of an order record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    /// Order id.
    pub order_id: String,
    /// Submitting user, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Requested execution behavior.
    pub order_type: OrderType,
    /// Token sold.
    pub token_in: String,
    /// Token bought.
    pub token_out: String,
    /// Input amount.
    pub amount_in: Decimal,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Venue chosen during routing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_selected: Option<VenueId>,
    /// Unit prices quoted per venue.
    pub quoted_prices: Vec<QuotedPrice>,
    /// Price realized at execution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_price: Option<Decimal>,
    /// Output amount received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_out: Option<Decimal>,
    /// Venue transaction reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_ref: Option<String>,
    /// Error message from the most recent failed attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl OrderView {
    /// Build the external view of a record.
    #[must_use]
    pub fn from_order(order: &Order) -> Self {
        Self {
            order_id: order.order_id.to_string(),
            user_id: order.user_id.as_ref().map(ToString::to_string),
            order_type: order.order_type,
            token_in: order.token_in.to_string(),
            token_out: order.token_out.to_string(),
            amount_in: order.amount_in,
            status: order.status,
            venue_selected: order.venue_selected.clone(),
            quoted_prices: order.quoted_prices.clone(),
            executed_price: order.executed_price,
            amount_out: order.amount_out,
            tx_ref: order.tx_ref.as_ref().map(ToString::to_string),
            error: order.error.clone(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Body of `GET /api/v1/orders/{id}`.
#[derive(Debug, Serialize)]
pub struct GetOrderResponse {
    /// The order record.
    pub order: OrderView,
}

/// Pagination echo for listings.
#[derive(Debug, Serialize)]
pub struct Pagination {
    /// Total records matching the filter.
    pub total: usize,
    /// Page size applied.
    pub limit: usize,
    /// Page offset applied.
    pub offset: usize,
}

/// Body of `GET /api/v1/orders`.
#[derive(Debug, Serialize)]
pub struct ListOrdersResponse {
    /// Records on this page, newest first.
    pub orders: Vec<OrderView>,
    /// Pagination metadata.
    pub pagination: Pagination,
}

/// Body of `GET /api/v1/queue/metrics`.
#[derive(Debug, Serialize)]
pub struct QueueMetricsResponse {
    /// Queue depth counters.
    pub queue: QueueMetrics,
    /// Total jobs known to the queue.
    pub total: usize,
}
