use std::{path::PathBuf, time::Duration};

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Speech-to-Text provider configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeechConfig {
    /// Google Cloud project that owns the recognizer
    pub project_id: String,
    /// Where provider credentials come from
    pub credentials: CredentialsConfig,
    /// Deadline for a single recognition, including client acquisition
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Recognizer location (e.g. `global`, `us-central1`)
    #[serde(default = "default_location")]
    pub location: String,
    /// API base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Delay between long-running operation polls in batch mode
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl SpeechConfig {
    /// Create a config with defaults for everything but the project and credentials
    pub fn new(project_id: impl Into<String>, credentials: CredentialsConfig) -> Self {
        Self {
            project_id: project_id.into(),
            credentials,
            timeout_seconds: default_timeout_seconds(),
            location: default_location(),
            base_url: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Credential material for the speech provider
///
/// `local` points at a credential file on disk; `service_account_json`
/// carries the JSON document itself. Either may be left empty here, in
/// which case acquiring a client fails at request time.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CredentialsConfig {
    /// Credential file path
    Local {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    /// Credential JSON content
    ServiceAccountJson {
        #[serde(default)]
        json: Option<SecretString>,
    },
}

impl CredentialsConfig {
    /// Short name of the credential mode, safe to log
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::Local { .. } => "local",
            Self::ServiceAccountJson { .. } => "service_account_json",
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_timeout_seconds() -> u64 {
    300
}

fn default_location() -> String {
    "global".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_poll_interval_ms() -> u64 {
    1000
}
