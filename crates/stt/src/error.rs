use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SttError>;

/// Speech recognition errors with their HTTP status codes
///
/// None of these are retried. Per-file problems inside a batch response
/// are logged and skipped and never become an `SttError`.
#[derive(Debug, Error)]
pub enum SttError {
    /// Caller omitted a required parameter
    #[error("Missing required parameters: {0}")]
    MissingParameter(String),

    /// Request body could not be used (bad form, missing file, too large)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Endpoint does not accept the request method
    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),

    /// Provider credentials are absent or malformed, or the token exchange failed
    #[error("Credential error: {0}")]
    Credential(String),

    /// The speech provider rejected the call or could not be reached
    #[error("Speech provider error: {message}")]
    Provider { status: Option<u16>, message: String },

    /// Deadline elapsed while waiting on the provider
    #[error("Recognition timed out after {0} seconds")]
    Timeout(u64),

    /// Inline recognition returned no usable alternative
    #[error("No transcript found in recognition response")]
    NoTranscript,

    /// Response body could not be serialized
    #[error("Failed to marshal JSON response: {0}")]
    Marshal(String),
}

impl SttError {
    pub(crate) fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            status: None,
            message: message.into(),
        }
    }

    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Credential(_)
            | Self::Provider { .. }
            | Self::Timeout(_)
            | Self::NoTranscript
            | Self::Marshal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string for the response
    pub fn error_type(&self) -> &str {
        match self {
            Self::MissingParameter(_) | Self::InvalidRequest(_) | Self::MethodNotAllowed(_) => "invalid_request_error",
            Self::Credential(_) => "credential_error",
            Self::Provider { .. } => "provider_error",
            Self::Timeout(_) => "timeout_error",
            Self::NoTranscript => "no_transcript_error",
            Self::Marshal(_) => "internal_error",
        }
    }

    /// Message that is safe to expose to API consumers
    pub fn client_message(&self) -> String {
        match self {
            Self::MissingParameter(_) | Self::InvalidRequest(_) | Self::MethodNotAllowed(_) => self.to_string(),
            Self::Marshal(_) => "Failed to marshal JSON response".to_string(),
            _ => format!("Speech-to-Text processing failed: {self}"),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    r#type: String,
    code: u16,
}

impl IntoResponse for SttError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "speech request failed");
        } else {
            tracing::debug!(error = %self, "speech request rejected");
        }

        let error_response = ErrorResponse {
            error: ErrorDetails {
                message: self.client_message(),
                r#type: self.error_type().to_string(),
                code: status.as_u16(),
            },
        };

        (status, Json(error_response)).into_response()
    }
}
