use serde::Deserialize;

/// Log output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Output format for log lines
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: LogFormat::default(),
        }
    }
}

/// Log line encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable single-line output
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

fn default_filter() -> String {
    "info".to_string()
}
