//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API that delegates to application use cases.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::application::ports::{OrderFilter, OrderRepositoryPort, QueueError, RepositoryError};
use crate::application::use_cases::{SubmitError, SubmitOrderUseCase};
use crate::domain::order::OrderStatus;
use crate::domain::shared::OrderId;
use crate::infrastructure::queue::JobQueue;

use super::request::{ListOrdersQuery, SubmitOrderRequest};
use super::response::{
    ErrorResponse, GetOrderResponse, HealthResponse, ListOrdersResponse, OrderView, Pagination,
    QueueMetricsResponse, SubmitOrderResponse,
};

/// Default listing page size.
const DEFAULT_LIST_LIMIT: usize = 50;

/// Application state shared across handlers.
pub struct AppState<R>
where
    R: OrderRepositoryPort,
{
    /// Use case accepting new orders.
    pub submit_order: Arc<SubmitOrderUseCase<R, JobQueue>>,
    /// Repository for status and listing queries.
    pub repository: Arc<R>,
    /// Queue handle for depth metrics.
    pub queue: Arc<JobQueue>,
    /// Application version.
    pub version: String,
}

impl<R> Clone for AppState<R>
where
    R: OrderRepositoryPort,
{
    fn clone(&self) -> Self {
        Self {
            submit_order: Arc::clone(&self.submit_order),
            repository: Arc::clone(&self.repository),
            queue: Arc::clone(&self.queue),
            version: self.version.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<R>(state: AppState<R>) -> Router
where
    R: OrderRepositoryPort + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/orders", post(submit_order).get(list_orders))
        .route("/api/v1/orders/{order_id}", get(get_order))
        .route("/api/v1/queue/metrics", get(queue_metrics))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check<R>(State(state): State<AppState<R>>) -> impl IntoResponse
where
    R: OrderRepositoryPort,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    })
}

/// Accept a new order: validate, persist as PENDING, enqueue.
async fn submit_order<R>(
    State(state): State<AppState<R>>,
    Json(request): Json<SubmitOrderRequest>,
) -> impl IntoResponse
where
    R: OrderRepositoryPort,
{
    match state.submit_order.submit(request.into_command()).await {
        Ok(order_id) => (
            StatusCode::CREATED,
            Json(SubmitOrderResponse {
                order_id: order_id.to_string(),
                status: OrderStatus::Pending,
                message: "order received and queued for execution".to_string(),
            }),
        )
            .into_response(),
        Err(error) => reject(&error),
    }
}

/// Map a submission rejection to an HTTP status.
fn reject(error: &SubmitError) -> axum::response::Response {
    let status = match error {
        SubmitError::Validation(_) => StatusCode::BAD_REQUEST,
        SubmitError::Repository(RepositoryError::Duplicate { .. })
        | SubmitError::Queue(QueueError::DuplicateJob { .. }) => StatusCode::CONFLICT,
        SubmitError::Queue(QueueError::Closed) => StatusCode::SERVICE_UNAVAILABLE,
        SubmitError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

/// Fetch one order record.
async fn get_order<R>(
    State(state): State<AppState<R>>,
    Path(order_id): Path<String>,
) -> impl IntoResponse
where
    R: OrderRepositoryPort,
{
    match state.repository.find_by_id(&OrderId::new(&order_id)).await {
        Ok(Some(order)) => (
            StatusCode::OK,
            Json(GetOrderResponse {
                order: OrderView::from_order(&order),
            }),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("order not found: {order_id}"),
            }),
        )
            .into_response(),
        Err(error) => storage_failure(&error),
    }
}

/// List order records with optional status filter and pagination.
async fn list_orders<R>(
    State(state): State<AppState<R>>,
    Query(query): Query<ListOrdersQuery>,
) -> impl IntoResponse
where
    R: OrderRepositoryPort,
{
    let filter = OrderFilter {
        status: query.status,
    };
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let offset = query.offset.unwrap_or(0);

    match state.repository.list(&filter, limit, offset).await {
        Ok((orders, total)) => (
            StatusCode::OK,
            Json(ListOrdersResponse {
                orders: orders.iter().map(OrderView::from_order).collect(),
                pagination: Pagination {
                    total,
                    limit,
                    offset,
                },
            }),
        )
            .into_response(),
        Err(error) => storage_failure(&error),
    }
}

/// Report queue depth counters.
async fn queue_metrics<R>(State(state): State<AppState<R>>) -> impl IntoResponse
where
    R: OrderRepositoryPort,
{
    let metrics = state.queue.metrics();
    Json(QueueMetricsResponse {
        total: metrics.total(),
        queue: metrics,
    })
}

fn storage_failure(error: &RepositoryError) -> axum::response::Response {
    tracing::error!(error = %error, "repository query failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "storage failure".to_string(),
        }),
    )
        .into_response()
}
