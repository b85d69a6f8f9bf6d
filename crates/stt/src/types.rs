use std::time::Duration;

use murmur_config::{CredentialsConfig, SpeechConfig};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SttError};

/// Language used for uploaded audio
pub const UPLOAD_LANGUAGE_CODE: &str = "ja-JP";

/// Settings for a single recognition call
///
/// Assembled per request from caller input and the process-wide
/// [`SpeechConfig`].
#[derive(Debug, Clone)]
pub struct RecognitionConfig {
    /// Google Cloud project that owns the recognizer
    pub project_id: String,
    /// Recognizer location
    pub location: String,
    /// BCP-47 codes passed to the provider verbatim, at least one
    pub language_codes: Vec<String>,
    /// Deadline covering client acquisition and the provider call
    pub timeout: Duration,
    /// Credential mode and its material
    pub credentials: CredentialsConfig,
}

impl RecognitionConfig {
    fn from_settings(settings: &SpeechConfig, language_codes: Vec<String>) -> Self {
        Self {
            project_id: settings.project_id.clone(),
            location: settings.location.clone(),
            language_codes,
            timeout: settings.timeout(),
            credentials: settings.credentials.clone(),
        }
    }

    /// Assemble a batch recognition from raw query parameters
    ///
    /// Absent and empty parameters are both treated as missing. The language
    /// list is split on `,` with no trimming or validation.
    pub fn for_batch(
        settings: &SpeechConfig,
        bucket_name: Option<&str>,
        audio_file_path: Option<&str>,
        language_codes: Option<&str>,
    ) -> Result<(Self, AudioPayload)> {
        fn present(value: Option<&str>) -> Option<&str> {
            value.filter(|v| !v.is_empty())
        }

        let (Some(bucket), Some(path), Some(language_codes)) = (
            present(bucket_name),
            present(audio_file_path),
            present(language_codes),
        ) else {
            return Err(SttError::MissingParameter(
                "bucket_name, audio_file_path, language_codes".to_string(),
            ));
        };

        let config = Self::from_settings(settings, split_language_codes(language_codes));
        let payload = AudioPayload::StorageReference {
            bucket: bucket.to_string(),
            path: path.to_string(),
        };

        Ok((config, payload))
    }

    /// Assemble an inline recognition for uploaded audio
    pub fn for_upload(settings: &SpeechConfig) -> Self {
        Self::from_settings(settings, vec![UPLOAD_LANGUAGE_CODE.to_string()])
    }
}

/// Split a comma-joined language list, keeping every token as given
pub fn split_language_codes(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_string).collect()
}

/// Audio to recognize
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioPayload {
    /// Object stored in a Cloud Storage bucket
    StorageReference { bucket: String, path: String },
    /// Raw audio bytes carried in the request
    InlineBytes(Vec<u8>),
}

impl AudioPayload {
    /// `gs://` URI for a storage reference
    pub fn storage_uri(&self) -> Option<String> {
        match self {
            Self::StorageReference { bucket, path } => Some(storage_uri(bucket, path)),
            Self::InlineBytes(_) => None,
        }
    }
}

/// `gs://{bucket}/{path}` address of a stored object
pub fn storage_uri(bucket: &str, path: &str) -> String {
    format!("gs://{bucket}/{path}")
}

/// Transcripts in provider order, one per recognized segment
pub type TranscriptResult = Vec<String>;

/// Query parameters of the stored-object endpoint
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchQuery {
    pub bucket_name: Option<String>,
    pub audio_file_path: Option<String>,
    pub language_codes: Option<String>,
}

impl BatchQuery {
    /// Parse a raw query string
    ///
    /// The first occurrence of a repeated key wins and unknown keys are
    /// ignored, so parsing never fails.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut query = Self::default();

        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let slot = match key.as_ref() {
                "bucket_name" => &mut query.bucket_name,
                "audio_file_path" => &mut query.audio_file_path,
                "language_codes" => &mut query.language_codes,
                _ => continue,
            };

            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        query
    }
}

/// Response body of the stored-object endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptsResponse {
    pub transcripts: TranscriptResult,
}

/// Response body of the upload endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    /// Transcribed text
    pub text: String,
}
