use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;
use url::Url;

/// Largest image accepted in a multipart request (10 MiB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Model name sent upstream when the caller does not pick one
pub const DEFAULT_MODEL: &str = "default-model";

/// Upstream provider table and outbound call settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// Provider key to chat-completions endpoint URL, in declaration order
    #[serde(default)]
    pub providers: IndexMap<String, Url>,
    /// Inbound paths that accept `POST` requests
    #[serde(default = "default_paths")]
    pub paths: Vec<String>,
    /// Deadline for the whole upstream call (e.g. "60s", "2m")
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Model used when the request does not name one
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Size cap for an attached multipart image, in bytes
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            providers: IndexMap::new(),
            paths: default_paths(),
            timeout: default_timeout(),
            default_model: default_model(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl UpstreamConfig {
    /// Parse the configured timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid duration string
    pub fn timeout_duration(&self) -> anyhow::Result<Duration> {
        duration_str::parse(&self.timeout).map_err(|e| anyhow::anyhow!("invalid upstream timeout '{}': {e}", self.timeout))
    }
}

fn default_paths() -> Vec<String> {
    vec![
        "/v1/chat/completions".to_string(),
        "/compatible-mode/v1/chat/completions".to_string(),
    ]
}

fn default_timeout() -> String {
    "60s".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_image_bytes() -> usize {
    DEFAULT_MAX_IMAGE_BYTES
}
