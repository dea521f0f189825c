//! Swap Engine Binary
//!
//! Starts the swap execution engine: venue simulators, job queue, worker
//! pool, housekeeping sweep, and the REST boundary.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin swap-engine
//! ```
//!
//! Configuration comes from environment variables; see `config.rs` for the
//! full table. `RUST_LOG` controls log verbosity (default: info).

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use swap_engine::application::ports::VenuePort;
use swap_engine::application::services::QuoteRouter;
use swap_engine::config::EngineConfig;
use swap_engine::infrastructure::broadcast::StatusBroadcaster;
use swap_engine::infrastructure::config::Container;
use swap_engine::infrastructure::http::{AppState, create_router};
use swap_engine::infrastructure::persistence::InMemoryOrderStore;
use swap_engine::infrastructure::queue::{JobQueue, WorkerPool};
use swap_engine::infrastructure::venues::SimulatedVenue;
use swap_engine::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = EngineConfig::from_env();
    tracing::info!(
        port = config.server.port,
        concurrency = config.queue.max_concurrent_orders,
        rate = config.queue.orders_per_minute,
        "starting swap engine"
    );

    // Wire explicit component instances; nothing is a global.
    let repository = Arc::new(InMemoryOrderStore::new());
    let broadcaster = Arc::new(StatusBroadcaster::new());
    let venues: Vec<Arc<dyn VenuePort>> = config
        .venues
        .profiles()
        .into_iter()
        .map(|profile| Arc::new(SimulatedVenue::new(profile)) as Arc<dyn VenuePort>)
        .collect();
    let router = Arc::new(QuoteRouter::new(venues));
    let queue = Arc::new(JobQueue::with_retention(config.queue.retention()));

    let container = Container::new(
        Arc::clone(&repository),
        Arc::clone(&broadcaster),
        router,
        Arc::clone(&queue),
        config.trading.slippage_tolerance,
    );

    let shutdown = CancellationToken::new();
    let pool = WorkerPool::new(
        Arc::clone(&queue),
        Arc::new(container.execute_order_use_case()),
        config.queue.worker_config(),
    );
    let pool_handle = pool.spawn(shutdown.clone());
    let sweeper_handle = spawn_sweeper(
        Arc::clone(&queue),
        config.queue.sweep_interval(),
        shutdown.clone(),
    );

    let state = AppState {
        submit_order: Arc::new(container.submit_order_use_case()),
        repository,
        queue: Arc::clone(&queue),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let app = create_router(state);

    let address = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = TcpListener::bind(&address).await?;
    tracing::info!(address = %listener.local_addr()?, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain: stop intake, let in-flight jobs finish, stop housekeeping.
    tracing::info!("shutting down");
    queue.close();
    shutdown.cancel();
    pool_handle.await?;
    sweeper_handle.await?;
    tracing::info!("swap engine stopped");

    Ok(())
}

/// Periodic queue housekeeping: purge resolved jobs past retention.
fn spawn_sweeper(
    queue: Arc<JobQueue>,
    interval: std::time::Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                () = tokio::time::sleep(interval) => {
                    queue.sweep();
                }
            }
        }
    })
}

/// Resolves when the process receives a termination signal.
async fn shutdown_signal() {
    if let Err(error) = signal::ctrl_c().await {
        tracing::error!(error = %error, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
