//! Tracing setup.
//!
//! Console subscriber with `RUST_LOG`-style filtering. Call once from the
//! binary entry point.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();
}
