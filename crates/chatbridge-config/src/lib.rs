#![allow(clippy::must_use_candidate)]

mod env;
mod loader;
pub mod server;
pub mod telemetry;
pub mod upstream;

use serde::Deserialize;

pub use server::*;
pub use telemetry::*;
pub use upstream::*;

/// Top-level chatbridge configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Listener and inbound request settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Provider table and outbound call settings
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Log output settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
