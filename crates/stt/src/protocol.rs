//! Google Cloud Speech-to-Text v2 REST wire types
//!
//! Only the fields this service sends or reads are modelled. Response
//! fields are all defaulted because the API omits empty values.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{Result, SttError};

/// Recognition settings shared by batch and inline requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionConfig {
    pub auto_decoding_config: AutoDetectDecodingConfig,
    pub model: String,
    pub language_codes: Vec<String>,
    pub features: RecognitionFeatures,
}

/// Let the provider detect the audio encoding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoDetectDecodingConfig {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct RecognitionFeatures {
    #[serde(default)]
    pub profanity_filter: bool,
    #[serde(default)]
    pub enable_word_time_offsets: bool,
    #[serde(default)]
    pub enable_word_confidence: bool,
}

/// `projects.locations.recognizers.batchRecognize` request
///
/// The recognizer is part of the URL path, not the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRecognizeRequest {
    #[serde(skip)]
    pub recognizer: String,
    pub config: RecognitionConfig,
    pub files: Vec<BatchRecognizeFileMetadata>,
    pub recognition_output_config: RecognitionOutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRecognizeFileMetadata {
    /// `gs://bucket/object` reference
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionOutputConfig {
    pub inline_response_config: InlineOutputConfig,
}

/// Return transcripts in the operation response instead of writing them to storage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineOutputConfig {}

/// `projects.locations.recognizers.recognize` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizeRequest {
    #[serde(skip)]
    pub recognizer: String,
    pub config: RecognitionConfig,
    /// Base64-encoded audio bytes
    pub content: String,
}

/// Long-running operation returned by `batchRecognize`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<Status>,
    #[serde(default)]
    pub response: Option<serde_json::Value>,
}

impl Operation {
    /// Convert a finished operation into its typed response
    ///
    /// An operation that finished with an error status becomes a provider
    /// error carrying the status message.
    pub(crate) fn into_response<T: DeserializeOwned + Default>(self) -> Result<T> {
        if let Some(status) = self.error {
            return Err(SttError::provider(status.describe()));
        }

        match self.response {
            Some(response) => serde_json::from_value(response)
                .map_err(|e| SttError::provider(format!("malformed operation response: {e}"))),
            None => Ok(T::default()),
        }
    }
}

/// `google.rpc.Status`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

impl Status {
    pub(crate) fn describe(&self) -> String {
        if self.message.is_empty() {
            format!("operation failed with code {}", self.code)
        } else {
            self.message.clone()
        }
    }
}

/// Result of a batch recognition, keyed by file URI in provider order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRecognizeResponse {
    #[serde(default)]
    pub results: IndexMap<String, BatchRecognizeFileResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRecognizeFileResult {
    #[serde(default)]
    pub error: Option<Status>,
    #[serde(default)]
    pub inline_result: Option<InlineResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InlineResult {
    #[serde(default)]
    pub transcript: Option<BatchRecognizeResults>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRecognizeResults {
    #[serde(default)]
    pub results: Vec<SpeechRecognitionResult>,
}

/// One recognized segment of audio
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRecognitionResult {
    /// Candidate transcriptions, best first
    #[serde(default)]
    pub alternatives: Vec<SpeechRecognitionAlternative>,
    #[serde(default)]
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechRecognitionAlternative {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub confidence: f32,
}

/// Result of an inline recognition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognizeResponse {
    #[serde(default)]
    pub results: Vec<SpeechRecognitionResult>,
}

/// Error envelope returned with non-2xx responses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: Status,
}
