#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod credentials;
mod error;
mod http_client;
pub mod protocol;
mod provider;
mod recognition;
mod request;
mod server;
mod types;

use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, RawQuery, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

pub use error::{Result, SttError};
pub use provider::{SpeechClient, SpeechProvider};
pub use recognition::RECOGNITION_MODEL;
pub use request::ExtractAudioUpload;
pub use server::{Server, SttServerBuilder};
pub use types::{
    AudioPayload, BatchQuery, RecognitionConfig, TranscriptResult, TranscriptionResponse, TranscriptsResponse,
    UPLOAD_LANGUAGE_CODE, split_language_codes, storage_uri,
};

/// Build the STT server from configuration
///
/// # Errors
///
/// Returns an error if the server fails to initialize
pub fn build_server(config: &murmur_config::Config) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        SttServerBuilder::new(config)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize STT server: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for STT
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new().route("/", get(transcribe_stored)).route(
        "/api/speech-to-text",
        post(transcribe_upload)
            .fallback(method_not_allowed)
            .layer(DefaultBodyLimit::max(request::UPLOAD_LIMIT_BYTES)),
    )
}

/// Transcribe an object already stored in a bucket
async fn transcribe_stored(State(server): State<Arc<Server>>, RawQuery(raw): RawQuery) -> Result<Response> {
    let query = BatchQuery::parse(raw.as_deref());

    let (config, payload) = RecognitionConfig::for_batch(
        server.settings(),
        query.bucket_name.as_deref(),
        query.audio_file_path.as_deref(),
        query.language_codes.as_deref(),
    )?;

    tracing::debug!(uri = ?payload.storage_uri(), "STT batch handler called");

    let transcripts = server.recognize(&config, payload).await?;

    json_response(&TranscriptsResponse { transcripts })
}

/// Transcribe uploaded audio
async fn transcribe_upload(
    State(server): State<Arc<Server>>,
    ExtractAudioUpload(audio): ExtractAudioUpload,
) -> Result<Response> {
    tracing::debug!(bytes = audio.len(), "STT upload handler called");

    let config = RecognitionConfig::for_upload(server.settings());
    let text = server.inline_recognize(&config, &audio).await?;

    json_response(&TranscriptionResponse { text })
}

async fn method_not_allowed(method: Method) -> SttError {
    SttError::MethodNotAllowed(method.to_string())
}

/// Serialize a success body, reporting failure as a marshal error
fn json_response<T: Serialize>(body: &T) -> Result<Response> {
    let bytes = serde_json::to_vec(body).map_err(|e| SttError::Marshal(e.to_string()))?;

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], bytes).into_response())
}
