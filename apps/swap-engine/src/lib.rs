// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Swap Engine - Rust Core Library
//!
//! Asynchronous token-swap order execution engine.
//!
//! # Architecture (Clean Architecture + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic
//!   - `order`: Order aggregate, forward-only status lifecycle, quotes
//!   - `shared`: Strongly-typed identifiers, token symbols
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: Interfaces for external systems (`VenuePort`,
//!     `OrderRepositoryPort`, `StatusPublisherPort`, `JobQueuePort`)
//!   - `services`: `QuoteRouter` — parallel venue fan-out, best-quote
//!     selection, execution dispatch
//!   - `use_cases`: `SubmitOrder` (boundary intake), `ExecuteOrder` (the
//!     order state machine)
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `venues`: Simulated liquidity venues driven by `VenueProfile`
//!   - `queue`: Durable job queue, worker pool, rate limiter, retry policy
//!   - `broadcast`: Per-order live status channels
//!   - `persistence`: In-memory order store
//!   - `http`: REST adapter delegating to use cases
//!   - `config`: Dependency injection container

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

/// Configuration loading.
pub mod config;

/// Tracing setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::order::{Order, OrderError, OrderSpec, OrderStatus, OrderType, Quote, VenueId};
pub use domain::shared::{OrderId, Symbol, TxRef, UserId};

// Application re-exports
pub use application::ports::{
    JobQueuePort, OrderFilter, OrderRepositoryPort, QueueError, RepositoryError, StatusDetail,
    StatusEvent, StatusPublisherPort, VenueError, VenuePort,
};
pub use application::services::{QuoteRouter, RouterError, RoutingDecision};
pub use application::use_cases::{
    ExecuteError, ExecuteOrderUseCase, SubmitError, SubmitOrderCommand, SubmitOrderUseCase,
};

// Infrastructure re-exports
pub use config::EngineConfig;
pub use infrastructure::broadcast::StatusBroadcaster;
pub use infrastructure::config::Container;
pub use infrastructure::http::{AppState, create_router};
pub use infrastructure::persistence::InMemoryOrderStore;
pub use infrastructure::queue::{
    JobQueue, RetentionPolicy, RetryPolicy, WorkerConfig, WorkerPool,
};
pub use infrastructure::venues::{SimulatedVenue, VenueProfile};
