//! Structured logging for the terrain pipeline.
//!
//! Console logging via the `tracing` ecosystem: timestamps relative to
//! process start, module targets, and environment-based filtering through
//! `RUST_LOG` with a configurable fallback level.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `fallback_level` (e.g. `"info"` or
/// a full filter string like `"info,strata_chunks=debug"`) applies.
/// Calling this twice panics, so it belongs at the top of `main`.
pub fn init_logging(fallback_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_level));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();
}

/// The default filter used when neither `RUST_LOG` nor a config override
/// is present.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new("info")
}
