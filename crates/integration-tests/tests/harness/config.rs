//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use chatbridge_config::{Config, ServerConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    ..ServerConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Add a provider key pointing at `url`
    pub fn with_provider(mut self, key: &str, url: &str) -> Self {
        self.config
            .upstream
            .providers
            .insert(key.to_owned(), url.parse().expect("valid URL"));
        self
    }

    /// Enable the health endpoint
    pub fn with_health(mut self) -> Self {
        self.config.server.health.enabled = true;
        self
    }

    /// Override the image size cap
    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.config.upstream.max_image_bytes = max_image_bytes;
        self
    }

    /// Override the upstream timeout
    pub fn with_timeout(mut self, timeout: &str) -> Self {
        self.config.upstream.timeout = timeout.to_owned();
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
