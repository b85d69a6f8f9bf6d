use serde::Deserialize;

/// Logging configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive (e.g. `info,stt=debug`); the CLI value is used when unset
    #[serde(default)]
    pub filter: Option<String>,
    /// Output format for log lines
    #[serde(default)]
    pub format: LogFormat,
}

/// Log line format
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}
