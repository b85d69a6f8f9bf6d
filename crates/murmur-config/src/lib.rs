#![allow(clippy::must_use_candidate)]

mod env;
pub mod health;
mod loader;
pub mod server;
pub mod speech;
pub mod telemetry;

use serde::Deserialize;

pub use health::*;
pub use server::*;
pub use speech::*;
pub use telemetry::*;

/// Top-level murmur configuration
///
/// Built once at process start, either from a TOML file or from the
/// process environment, and handed to the server by value.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Speech provider configuration
    pub speech: SpeechConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
