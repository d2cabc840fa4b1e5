//! Structured logging.
//!
//! `RUST_LOG` takes precedence; otherwise the configured level applies to
//! this crate and to tower-http's request traces.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for a given level.
pub fn default_directive(level: &str) -> String {
    format!("referer_proxy={level},tower_http={level}")
}

/// Install the global tracing subscriber.
pub fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive(level).into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
