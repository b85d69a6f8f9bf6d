//! Google Cloud Speech-to-Text v2 REST provider

use std::time::Duration;

use async_trait::async_trait;
use murmur_config::{CredentialsConfig, SpeechConfig};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use super::{SpeechClient, SpeechProvider};
use crate::{
    credentials,
    error::{Result, SttError},
    http_client::http_client,
    protocol::{
        BatchRecognizeRequest, BatchRecognizeResponse, ErrorEnvelope, Operation, RecognizeRequest, RecognizeResponse,
    },
};

const DEFAULT_SPEECH_API_URL: &str = "https://speech.googleapis.com";

/// Google Speech-to-Text provider
pub(crate) struct GoogleSpeechProvider {
    client: Client,
    base_url: String,
    poll_interval: Duration,
}

impl GoogleSpeechProvider {
    pub fn new(config: &SpeechConfig) -> Self {
        let base_url = config
            .base_url
            .as_ref()
            .map_or(DEFAULT_SPEECH_API_URL, Url::as_str)
            .trim_end_matches('/')
            .to_string();

        Self {
            client: http_client(),
            base_url,
            poll_interval: config.poll_interval(),
        }
    }
}

#[async_trait]
impl SpeechProvider for GoogleSpeechProvider {
    async fn connect(&self, credentials: &CredentialsConfig) -> Result<Box<dyn SpeechClient>> {
        let token = credentials::access_token(&self.client, credentials).await?;

        tracing::debug!(mode = credentials.mode(), "Google speech client ready");

        Ok(Box::new(GoogleSpeechClient {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            poll_interval: self.poll_interval,
            token,
        }))
    }

    fn name(&self) -> &str {
        "google"
    }
}

/// Client bound to one access token
struct GoogleSpeechClient {
    client: Client,
    base_url: String,
    poll_interval: Duration,
    token: SecretString,
}

impl GoogleSpeechClient {
    /// `{base}/v2/{resource}` for a resource name such as a recognizer or operation
    fn endpoint(&self, resource: &str) -> String {
        format!("{}/v2/{resource}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Google speech request failed: {e}");
                SttError::provider(format!("failed to send request to Google Speech-to-Text: {e}"))
            })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

            tracing::error!("Google speech API error ({status}): {body}");

            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.describe())
                .unwrap_or(body);

            return Err(SttError::Provider {
                status: Some(status.as_u16()),
                message,
            });
        }

        response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Google speech response: {e}");
            SttError::provider(format!("malformed response from Google Speech-to-Text: {e}"))
        })
    }
}

#[async_trait]
impl SpeechClient for GoogleSpeechClient {
    async fn batch_recognize(&self, request: &BatchRecognizeRequest) -> Result<BatchRecognizeResponse> {
        let url = self.endpoint(&format!("{}:batchRecognize", request.recognizer));

        let mut operation: Operation = self.send(self.client.post(&url).json(request)).await?;

        tracing::debug!(operation = %operation.name, "batch recognition submitted");

        while !operation.done {
            if operation.name.is_empty() {
                return Err(SttError::provider("batch recognition returned an unnamed pending operation"));
            }

            tokio::time::sleep(self.poll_interval).await;

            operation = self.send(self.client.get(self.endpoint(&operation.name))).await?;
        }

        tracing::debug!(operation = %operation.name, "batch recognition finished");

        operation.into_response()
    }

    async fn recognize(&self, request: &RecognizeRequest) -> Result<RecognizeResponse> {
        let url = self.endpoint(&format!("{}:recognize", request.recognizer));

        self.send(self.client.post(&url).json(request)).await
    }
}
