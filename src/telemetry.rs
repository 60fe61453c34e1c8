//! Logging bootstrap for binaries.
//!
//! The library only emits `tracing` events; installing a subscriber is
//! left to the process. `RUST_LOG` overrides the configured directive.

use tracing_subscriber::EnvFilter;

use crate::settings::LoggingSettings;

/// Filter from `RUST_LOG`, falling back to `directive`
pub fn env_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

/// Install a global `fmt` subscriber. Later calls are no-ops.
pub fn init(settings: &LoggingSettings) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&settings.filter))
        .with_ansi(settings.ansi)
        .with_target(true)
        .try_init();
}
