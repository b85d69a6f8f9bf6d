pub(crate) mod google;

use async_trait::async_trait;
use murmur_config::CredentialsConfig;

use crate::protocol::{BatchRecognizeRequest, BatchRecognizeResponse, RecognizeRequest, RecognizeResponse};

/// Source of speech recognition clients
///
/// Implemented by the Google provider and by test doubles.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Acquire a client authorised with the given credentials
    ///
    /// The returned handle lives for one recognition and is released when
    /// dropped.
    async fn connect(&self, credentials: &CredentialsConfig) -> crate::error::Result<Box<dyn SpeechClient>>;

    /// Get the provider name
    fn name(&self) -> &str;
}

/// Authorised handle to the recognition API
#[async_trait]
pub trait SpeechClient: Send + Sync {
    /// Submit a batch recognition and wait for the operation to finish
    async fn batch_recognize(&self, request: &BatchRecognizeRequest) -> crate::error::Result<BatchRecognizeResponse>;

    /// Recognize inline audio synchronously
    async fn recognize(&self, request: &RecognizeRequest) -> crate::error::Result<RecognizeResponse>;
}
