//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use murmur_config::{Config, CredentialsConfig, HealthConfig, ServerConfig, SpeechConfig};
use secrecy::SecretString;

use super::mock_speech::MockSpeech;

/// Project id used by every test configuration
pub const TEST_PROJECT: &str = "test-project";

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    ///
    /// No credential material is configured until a mock is attached.
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig::default(),
                },
                speech: SpeechConfig::new(TEST_PROJECT, CredentialsConfig::ServiceAccountJson { json: None }),
                telemetry: None,
            },
        }
    }

    /// Point the speech provider and token exchange at a mock backend
    pub fn with_mock_speech(mut self, mock: &MockSpeech) -> Self {
        self.config.speech.base_url = Some(mock.base_url().parse().expect("valid URL"));
        self.config.speech.credentials = CredentialsConfig::ServiceAccountJson {
            json: Some(SecretString::from(mock.service_account_json())),
        };
        self.config.speech.poll_interval_ms = 10;
        self
    }

    /// Replace the credential source
    pub fn with_credentials(mut self, credentials: CredentialsConfig) -> Self {
        self.config.speech.credentials = credentials;
        self
    }

    /// Set the recognition deadline
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.speech.timeout_seconds = seconds;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
