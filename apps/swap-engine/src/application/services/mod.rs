//! Application services - orchestration over ports.

mod quote_router;

pub use quote_router::{QuoteRouter, RouterError, RoutingDecision};
