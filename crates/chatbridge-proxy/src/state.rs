use std::sync::Arc;

use chatbridge_config::Config;

use crate::normalize::NormalizeOptions;
use crate::upstream::Upstream;

/// Shared, read-only state for proxy handlers
#[derive(Clone)]
pub struct ProxyState {
    inner: Arc<ProxyStateInner>,
}

struct ProxyStateInner {
    upstream: Upstream,
    options: NormalizeOptions,
    paths: Vec<String>,
}

impl ProxyState {
    /// Build from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream HTTP client cannot be constructed
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let upstream = Upstream::new(&config.upstream)?;

        tracing::info!(
            providers = ?upstream.provider_keys().collect::<Vec<_>>(),
            paths = ?config.upstream.paths,
            "proxy state initialized"
        );

        Ok(Self {
            inner: Arc::new(ProxyStateInner {
                upstream,
                options: NormalizeOptions::from_config(config),
                paths: config.upstream.paths.clone(),
            }),
        })
    }

    /// Provider table and HTTP client
    pub fn upstream(&self) -> &Upstream {
        &self.inner.upstream
    }

    /// Normalization limits and defaults
    pub fn options(&self) -> &NormalizeOptions {
        &self.inner.options
    }

    /// Inbound paths accepting `POST`
    pub fn paths(&self) -> &[String] {
        &self.inner.paths
    }
}
