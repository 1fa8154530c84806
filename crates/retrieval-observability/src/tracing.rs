//! Process-wide `tracing` initialization (SPEC_FULL §6.1). Called once from
//! the CLI binary's `main`; library crates only ever emit `tracing` events,
//! never configure a subscriber themselves.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install a `tracing_subscriber::fmt` subscriber with an `EnvFilter`
/// seeded from `default_level` and overridable via `RUST_LOG`.
pub fn init_tracing(default_level: &str) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}
