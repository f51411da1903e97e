//! Log setup for chatbridge
//!
//! Installs a `tracing-subscriber` registry with an env filter and a single
//! fmt layer in either text or JSON form.

use chatbridge_config::{LogFormat, TelemetryConfig};
use tracing_subscriber::EnvFilter;

/// Initialize logging from configuration
///
/// `RUST_LOG` takes precedence over the configured filter. An unparsable
/// directive falls back to `info`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: &TelemetryConfig) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = build_filter(&config.filter);
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Text => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);

            registry.with(fmt_layer).try_init()
        }
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_target(true);

            registry.with(fmt_layer).try_init()
        }
    };

    result.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

/// Resolve the active filter directive
fn build_filter(configured: &str) -> EnvFilter {
    let directive = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| configured.to_owned());

    EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("invalid log filter {directive:?}: {e}; falling back to info");
        EnvFilter::new("info")
    })
}
