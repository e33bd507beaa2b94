//! Bridges the facade's levels onto the `tracing` crate, active only with
//! the `tracing` feature.

use std::fmt;

use crate::Level;

/// Emits one message through `tracing`, mapping each [`Level`] onto the
/// nearest `tracing` level.
pub fn emit(level: Level, args: fmt::Arguments<'_>) {
    match level {
        Level::Fatal | Level::Error => tracing::error!(target: "blocksync", "{}", args),
        Level::Warning => tracing::warn!(target: "blocksync", "{}", args),
        Level::Info => tracing::info!(target: "blocksync", "{}", args),
        Level::Debug => tracing::debug!(target: "blocksync", "{}", args),
    }
}

/// Installs a `tracing-subscriber` `fmt` subscriber honoring `RUST_LOG`
/// (falling back to `current_level`'s label when unset) as the global
/// default. Intended to be called once, near the top of `main`.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn install() -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(crate::current_level().label()));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
}
