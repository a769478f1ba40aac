//! Logging setup for binaries and tests.
//!
//! The library only emits `tracing` events; installing a subscriber is up
//! to the host.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stdout subscriber filtered at `level`
///
/// `RUST_LOG` takes precedence over `level` when set. Calling this twice
/// keeps the first subscriber.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .try_init();
}
