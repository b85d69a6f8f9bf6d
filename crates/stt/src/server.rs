use std::{future::Future, sync::Arc};

use murmur_config::SpeechConfig;

use crate::{
    error::{Result, SttError},
    provider::{SpeechProvider, google::GoogleSpeechProvider},
    recognition,
    types::{AudioPayload, RecognitionConfig, TranscriptResult, storage_uri},
};

/// Recognition orchestrator
///
/// Acquires a provider client per call, runs the call under the
/// configured deadline, and extracts transcripts from the response.
pub struct Server {
    provider: Arc<dyn SpeechProvider>,
    settings: SpeechConfig,
}

impl Server {
    /// Create an orchestrator over an arbitrary provider
    pub fn new(provider: Arc<dyn SpeechProvider>, settings: SpeechConfig) -> Self {
        Self { provider, settings }
    }

    /// Process-wide speech settings used to assemble per-request configs
    pub fn settings(&self) -> &SpeechConfig {
        &self.settings
    }

    /// Recognize audio from either source
    ///
    /// Storage references go through batch recognition and may yield any
    /// number of transcripts; inline bytes yield exactly one.
    pub async fn recognize(&self, config: &RecognitionConfig, payload: AudioPayload) -> Result<TranscriptResult> {
        match payload {
            AudioPayload::StorageReference { bucket, path } => self.batch_recognize(config, &bucket, &path).await,
            AudioPayload::InlineBytes(audio) => Ok(vec![self.inline_recognize(config, &audio).await?]),
        }
    }

    /// Recognize a stored object with an asynchronous batch operation
    ///
    /// A timeout abandons the wait without cancelling the remote operation.
    pub async fn batch_recognize(
        &self,
        config: &RecognitionConfig,
        bucket: &str,
        path: &str,
    ) -> Result<TranscriptResult> {
        let uri = storage_uri(bucket, path);

        tracing::debug!(
            provider = self.provider.name(),
            %uri,
            languages = ?config.language_codes,
            "starting batch recognition"
        );

        let request = recognition::batch_request(config, uri);

        let response = with_deadline(config, async {
            let client = self.provider.connect(&config.credentials).await?;
            client.batch_recognize(&request).await
        })
        .await?;

        let transcripts = recognition::batch_transcripts(response);

        tracing::debug!(count = transcripts.len(), "batch recognition complete");

        Ok(transcripts)
    }

    /// Recognize audio bytes with a synchronous call
    pub async fn inline_recognize(&self, config: &RecognitionConfig, audio: &[u8]) -> Result<String> {
        let request = recognition::inline_request(config, audio);

        tracing::debug!(
            provider = self.provider.name(),
            bytes = audio.len(),
            languages = ?config.language_codes,
            "starting inline recognition"
        );

        let response = with_deadline(config, async {
            let client = self.provider.connect(&config.credentials).await?;
            client.recognize(&request).await
        })
        .await?;

        let text = recognition::inline_transcript(response)?;

        tracing::debug!("inline recognition complete");

        Ok(text)
    }
}

/// Run `call` under the request deadline
///
/// The client handle is owned by `call`, so it is dropped on success,
/// on error, and when the deadline cancels the future.
async fn with_deadline<T>(config: &RecognitionConfig, call: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(config.timeout, call).await.unwrap_or_else(|_| {
        tracing::error!(timeout_secs = config.timeout.as_secs(), "recognition deadline exceeded");
        Err(SttError::Timeout(config.timeout.as_secs()))
    })
}

/// Builder for constructing the STT server from configuration
pub struct SttServerBuilder<'a> {
    config: &'a murmur_config::Config,
}

impl<'a> SttServerBuilder<'a> {
    pub fn new(config: &'a murmur_config::Config) -> Self {
        Self { config }
    }

    pub fn build(self) -> Result<Server> {
        let speech = &self.config.speech;

        tracing::debug!(
            project_id = %speech.project_id,
            location = %speech.location,
            credential_mode = speech.credentials.mode(),
            "Initializing Google speech provider"
        );

        let provider = Arc::new(GoogleSpeechProvider::new(speech));

        Ok(Server::new(provider, speech.clone()))
    }
}
