use std::net::SocketAddr;

use serde::Deserialize;

/// Default inbound body limit (16 MiB), large enough for a maximum-size image plus form overhead
pub const DEFAULT_BODY_LIMIT: usize = 16 << 20;

/// Default listen address when neither config nor CLI supplies one
pub const DEFAULT_LISTEN_ADDRESS: SocketAddr = SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 8787);

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    /// Maximum accepted request body in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
    #[serde(default)]
    pub health: HealthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: None,
            body_limit: DEFAULT_BODY_LIMIT,
            health: HealthConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Configured listen address, falling back to `0.0.0.0:8787`
    pub fn listen_address(&self) -> SocketAddr {
        self.listen_address.unwrap_or(DEFAULT_LISTEN_ADDRESS)
    }
}

/// Health check endpoint configuration
///
/// Off by default so that every path outside the proxy allow-list answers 404.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_health_path")]
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_health_path(),
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_body_limit() -> usize {
    DEFAULT_BODY_LIMIT
}

fn default_health_path() -> String {
    "/health".to_string()
}
