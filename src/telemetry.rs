//! Telemetry and observability setup
//!
//! Configures structured logging with tracing and tracing-subscriber.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Build the log filter, preferring `RUST_LOG` over the configured level
fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("groq_relay={},tower_http=debug", default_level))
    })
}

/// Initialize tracing subscriber for structured logging
///
/// This can only be called once per process. Subsequent calls are silently ignored.
///
/// # Examples
///
/// ```no_run
/// groq_relay::telemetry::init("info");
/// tracing::info!("Application started");
/// ```
pub fn init(default_level: &str) {
    INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(filter(default_level))
            .with(tracing_subscriber::fmt::layer())
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_accepts_configured_level() {
        // RUST_LOG may be set in CI; either way a filter must come back.
        let rendered = filter("debug").to_string();
        assert!(!rendered.is_empty());
    }
}
