use std::{net::SocketAddr, path::Path};

use secrecy::SecretString;

use crate::{Config, CredentialsConfig, DEFAULT_PORT, ServerConfig, SpeechConfig};

/// Variable holding either a credential file path or the credential JSON itself
const CREDENTIALS_VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded =
            crate::env::expand_env(&raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Build configuration from the process environment
    ///
    /// `PROJECT_ID` is required. `PORT` defaults to 80. `ENV=local` reads
    /// `GOOGLE_APPLICATION_CREDENTIALS` as a credential file path; any other
    /// value reads it as the credential JSON content.
    ///
    /// # Errors
    ///
    /// Returns an error if `PROJECT_ID` is unset or `PORT` is not a port number
    pub fn from_env() -> anyhow::Result<Self> {
        let project_id = std::env::var("PROJECT_ID")
            .ok()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| anyhow::anyhow!("PROJECT_ID environment variable is not set"))?;

        let port = match std::env::var("PORT") {
            Ok(port) if !port.is_empty() => port
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("invalid PORT value '{port}': {e}"))?,
            _ => {
                tracing::debug!("PORT not set, defaulting to {DEFAULT_PORT}");
                DEFAULT_PORT
            }
        };

        let credential_material = std::env::var(CREDENTIALS_VAR).ok().filter(|value| !value.is_empty());

        let credentials = if std::env::var("ENV").is_ok_and(|env| env == "local") {
            CredentialsConfig::Local {
                path: credential_material.map(Into::into),
            }
        } else {
            CredentialsConfig::ServiceAccountJson {
                json: credential_material.map(SecretString::from),
            }
        };

        let config = Self {
            server: ServerConfig {
                listen_address: Some(SocketAddr::from(([0, 0, 0, 0], port))),
                ..ServerConfig::default()
            },
            speech: SpeechConfig::new(project_id, credentials),
            telemetry: None,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the project id is empty or a duration is zero
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_speech_config()?;
        self.validate_health_config()?;
        Ok(())
    }

    fn validate_speech_config(&self) -> anyhow::Result<()> {
        let speech = &self.speech;

        if speech.project_id.trim().is_empty() {
            anyhow::bail!("speech.project_id must not be empty");
        }

        if speech.timeout_seconds == 0 {
            anyhow::bail!("speech.timeout_seconds must be greater than 0");
        }

        if speech.poll_interval_ms == 0 {
            anyhow::bail!("speech.poll_interval_ms must be greater than 0");
        }

        if speech.location.trim().is_empty() {
            anyhow::bail!("speech.location must not be empty");
        }

        Ok(())
    }

    fn validate_health_config(&self) -> anyhow::Result<()> {
        let health = &self.server.health;

        if health.enabled && !health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }

        Ok(())
    }
}
