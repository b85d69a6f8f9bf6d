use axum::{
    body::Body,
    extract::{FromRequest, Multipart},
};

use crate::error::SttError;

/// Body limit for audio uploads (10 MiB)
pub(crate) const UPLOAD_LIMIT_BYTES: usize = 10 << 20;

/// Multipart field carrying the audio bytes
const AUDIO_FIELD: &str = "audio";

/// Extractor for the uploaded audio file
///
/// Reads the `audio` part of a `multipart/form-data` body. Other parts are
/// ignored. The file name and content type of the part are not inspected.
pub struct ExtractAudioUpload(pub Vec<u8>);

impl<S> FromRequest<S> for ExtractAudioUpload
where
    S: Send + Sync,
{
    type Rejection = SttError;

    async fn from_request(request: http::Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = request
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("multipart/form-data") {
            return Err(SttError::InvalidRequest(
                "Unable to parse form: expected 'Content-Type: multipart/form-data'".to_string(),
            ));
        }

        let mut multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| SttError::InvalidRequest(format!("Unable to parse form: {e}")))?;

        loop {
            let field = multipart
                .next_field()
                .await
                .map_err(|e| SttError::InvalidRequest(format!("Unable to parse form: {e}")))?;

            let Some(field) = field else {
                break;
            };

            if field.name() != Some(AUDIO_FIELD) {
                continue;
            }

            let audio = field
                .bytes()
                .await
                .map_err(|e| SttError::InvalidRequest(format!("Unable to read audio file: {e}")))?;

            tracing::debug!(bytes = audio.len(), "received audio upload");

            return Ok(Self(audio.to_vec()));
        }

        Err(SttError::InvalidRequest(
            "Missing required 'audio' field in multipart form".to_string(),
        ))
    }
}
