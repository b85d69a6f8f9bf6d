//! Provider request construction and transcript extraction

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{
    error::{Result, SttError},
    protocol::{
        AutoDetectDecodingConfig, BatchRecognizeFileMetadata, BatchRecognizeRequest, BatchRecognizeResponse,
        RecognitionConfig as WireConfig, RecognitionFeatures, RecognitionOutputConfig, RecognizeRequest,
        RecognizeResponse,
    },
    types::{RecognitionConfig, TranscriptResult},
};

/// Recognition model tier used for every request
pub const RECOGNITION_MODEL: &str = "short";

/// Recognizer resource name; `_` selects the implicit default recognizer
fn recognizer(config: &RecognitionConfig) -> String {
    format!(
        "projects/{}/locations/{}/recognizers/_",
        config.project_id, config.location
    )
}

fn wire_config(config: &RecognitionConfig) -> WireConfig {
    WireConfig {
        auto_decoding_config: AutoDetectDecodingConfig {},
        model: RECOGNITION_MODEL.to_string(),
        language_codes: config.language_codes.clone(),
        features: RecognitionFeatures {
            profanity_filter: true,
            enable_word_time_offsets: true,
            enable_word_confidence: true,
        },
    }
}

pub(crate) fn batch_request(config: &RecognitionConfig, uri: String) -> BatchRecognizeRequest {
    BatchRecognizeRequest {
        recognizer: recognizer(config),
        config: wire_config(config),
        files: vec![BatchRecognizeFileMetadata { uri }],
        recognition_output_config: RecognitionOutputConfig::default(),
    }
}

pub(crate) fn inline_request(config: &RecognitionConfig, audio: &[u8]) -> RecognizeRequest {
    RecognizeRequest {
        recognizer: recognizer(config),
        config: wire_config(config),
        content: STANDARD.encode(audio),
    }
}

/// Collect the top alternative of every segment, file by file
///
/// Files that failed, carry no inline result, or have no segments are
/// logged and skipped. Segments without alternatives contribute nothing.
pub(crate) fn batch_transcripts(response: BatchRecognizeResponse) -> TranscriptResult {
    let mut transcripts = Vec::new();

    for (uri, file) in response.results {
        if let Some(error) = file.error {
            tracing::warn!(%uri, "skipping file: recognition failed: {}", error.describe());
            continue;
        }

        let Some(inline) = file.inline_result else {
            tracing::warn!(%uri, "skipping file: no inline result found");
            continue;
        };

        let Some(transcript) = inline.transcript.filter(|t| !t.results.is_empty()) else {
            tracing::warn!(%uri, "skipping file: no transcript found");
            continue;
        };

        transcripts.extend(
            transcript
                .results
                .into_iter()
                .filter_map(|segment| segment.alternatives.into_iter().next())
                .map(|alternative| alternative.transcript),
        );
    }

    transcripts
}

/// Top alternative of the first result
pub(crate) fn inline_transcript(response: RecognizeResponse) -> Result<String> {
    response
        .results
        .into_iter()
        .next()
        .and_then(|result| result.alternatives.into_iter().next())
        .map(|alternative| alternative.transcript)
        .ok_or(SttError::NoTranscript)
}
