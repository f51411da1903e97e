use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or [`Config::parse`] fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// `{{ env.VAR }}` placeholders are expanded before deserialization.
    ///
    /// # Errors
    ///
    /// Returns an error if variable expansion, TOML parsing or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        tracing::debug!(
            providers = config.upstream.providers.len(),
            paths = config.upstream.paths.len(),
            "configuration loaded"
        );

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if no provider is configured, a path is not absolute,
    /// the timeout is unusable or the image cap exceeds the body limit
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_providers()?;
        self.validate_paths()?;
        self.validate_limits()?;
        Ok(())
    }

    fn validate_providers(&self) -> anyhow::Result<()> {
        if self.upstream.providers.is_empty() {
            anyhow::bail!("at least one upstream provider must be configured under [upstream.providers]");
        }

        for (key, url) in &self.upstream.providers {
            if key.trim().is_empty() {
                anyhow::bail!("upstream provider keys must not be empty");
            }
            if !matches!(url.scheme(), "http" | "https") {
                anyhow::bail!("upstream provider '{key}' must use an http or https URL, got '{url}'");
            }
        }

        Ok(())
    }

    fn validate_paths(&self) -> anyhow::Result<()> {
        if self.upstream.paths.is_empty() {
            anyhow::bail!("upstream.paths must list at least one inbound path");
        }

        if let Some(path) = self.upstream.paths.iter().find(|p| !p.starts_with('/')) {
            anyhow::bail!("upstream path '{path}' must start with '/'");
        }

        if self.server.health.enabled && self.upstream.paths.contains(&self.server.health.path) {
            anyhow::bail!("health path '{}' collides with a proxy path", self.server.health.path);
        }

        Ok(())
    }

    fn validate_limits(&self) -> anyhow::Result<()> {
        if self.upstream.timeout_duration()?.is_zero() {
            anyhow::bail!("upstream.timeout must be greater than 0");
        }

        if self.upstream.max_image_bytes > self.server.body_limit {
            anyhow::bail!(
                "upstream.max_image_bytes ({}) exceeds server.body_limit ({})",
                self.upstream.max_image_bytes,
                self.server.body_limit
            );
        }

        Ok(())
    }
}
