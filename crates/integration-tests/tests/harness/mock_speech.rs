//! Mock Google Speech-to-Text backend for integration tests
//!
//! Serves the OAuth token endpoint, `recognize`, `batchRecognize` and
//! operation polling with canned responses

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

const MOCK_ACCESS_TOKEN: &str = "mock-access-token";
const OPERATION_ID: &str = "op-1";

/// Key shared with the unit tests of the speech crate
const SERVICE_ACCOUNT_KEY: &str = include_str!("../../../stt/testdata/service_account_key.pem");

/// Canned behavior of the mock backend
#[derive(Clone)]
pub struct Behavior {
    /// `response` of the finished batch operation
    pub batch_response: Value,
    /// Body returned by `recognize`
    pub inline_response: Value,
    /// Status and message returned by every speech call instead of a result
    pub failure: Option<(StatusCode, String)>,
    /// Number of polls that report the operation as still running
    pub pending_polls: u32,
    /// Delay before answering any speech call
    pub delay: Duration,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            batch_response: batch_response(&[("gs://b1/a.wav", &["hello"])]),
            inline_response: json!({
                "results": [{"alternatives": [{"transcript": "こんにちは", "confidence": 0.92}], "languageCode": "ja-jp"}]
            }),
            failure: None,
            pending_polls: 1,
            delay: Duration::ZERO,
        }
    }
}

/// Build a `BatchRecognizeResponse` with one segment per transcript
pub fn batch_response(files: &[(&str, &[&str])]) -> Value {
    let results: serde_json::Map<String, Value> = files
        .iter()
        .map(|(uri, transcripts)| {
            let segments: Vec<Value> = transcripts
                .iter()
                .map(|t| json!({"alternatives": [{"transcript": t, "confidence": 0.9}]}))
                .collect();

            ((*uri).to_owned(), json!({"inlineResult": {"transcript": {"results": segments}}}))
        })
        .collect();

    json!({ "results": results })
}

/// Mock speech backend
pub struct MockSpeech {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockSpeechState>,
}

struct MockSpeechState {
    behavior: Behavior,
    token_count: AtomicU32,
    batch_count: AtomicU32,
    poll_count: AtomicU32,
    recognize_count: AtomicU32,
    last_grant_type: Mutex<Option<String>>,
    last_request: Mutex<Option<Value>>,
}

impl MockSpeech {
    /// Start the mock server with default responses
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(Behavior::default()).await
    }

    /// Start a mock server that rejects every speech call with `status`
    pub async fn start_failing(status: StatusCode, message: &str) -> anyhow::Result<Self> {
        Self::start_with(Behavior {
            failure: Some((status, message.to_owned())),
            ..Behavior::default()
        })
        .await
    }

    /// Start the mock server with custom behavior
    pub async fn start_with(behavior: Behavior) -> anyhow::Result<Self> {
        let state = Arc::new(MockSpeechState {
            behavior,
            token_count: AtomicU32::new(0),
            batch_count: AtomicU32::new(0),
            poll_count: AtomicU32::new(0),
            recognize_count: AtomicU32::new(0),
            last_grant_type: Mutex::new(None),
            last_request: Mutex::new(None),
        });

        let app = Router::new()
            .route("/token", routing::post(handle_token))
            .route(
                "/v2/projects/{project}/locations/{location}/recognizers/{method}",
                routing::post(handle_recognizer),
            )
            .route(
                "/v2/projects/{project}/locations/{location}/operations/{operation}",
                routing::get(handle_operation),
            )
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as the speech API
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Service account key whose `token_uri` points at this mock
    pub fn service_account_json(&self) -> String {
        json!({
            "type": "service_account",
            "project_id": "test-project",
            "private_key_id": "0123456789abcdef",
            "private_key": SERVICE_ACCOUNT_KEY,
            "client_email": "speech@test-project.iam.gserviceaccount.com",
            "token_uri": format!("{}/token", self.base_url()),
        })
        .to_string()
    }

    /// Number of token exchanges received
    pub fn token_count(&self) -> u32 {
        self.state.token_count.load(Ordering::Relaxed)
    }

    /// Number of batch recognitions submitted
    pub fn batch_count(&self) -> u32 {
        self.state.batch_count.load(Ordering::Relaxed)
    }

    /// Number of operation polls received
    pub fn poll_count(&self) -> u32 {
        self.state.poll_count.load(Ordering::Relaxed)
    }

    /// Number of inline recognitions received
    pub fn recognize_count(&self) -> u32 {
        self.state.recognize_count.load(Ordering::Relaxed)
    }

    /// Total speech calls of any kind
    pub fn speech_call_count(&self) -> u32 {
        self.batch_count() + self.recognize_count()
    }

    /// `grant_type` of the most recent token exchange
    pub fn last_grant_type(&self) -> Option<String> {
        self.state.last_grant_type.lock().unwrap().clone()
    }

    /// Body of the most recent recognizer call
    pub fn last_request(&self) -> Option<Value> {
        self.state.last_request.lock().unwrap().clone()
    }
}

impl Drop for MockSpeech {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_token(State(state): State<Arc<MockSpeechState>>, Form(form): Form<HashMap<String, String>>) -> Response {
    state.token_count.fetch_add(1, Ordering::Relaxed);
    *state.last_grant_type.lock().unwrap() = form.get("grant_type").cloned();

    if !form.contains_key("assertion") && !form.contains_key("refresh_token") {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid_grant"}))).into_response();
    }

    Json(json!({
        "access_token": MOCK_ACCESS_TOKEN,
        "expires_in": 3599,
        "token_type": "Bearer"
    }))
    .into_response()
}

async fn handle_recognizer(
    State(state): State<Arc<MockSpeechState>>,
    Path((project, location, method)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    match method.as_str() {
        "_:batchRecognize" => state.batch_count.fetch_add(1, Ordering::Relaxed),
        "_:recognize" => state.recognize_count.fetch_add(1, Ordering::Relaxed),
        _ => return google_error(StatusCode::NOT_FOUND, "unknown method"),
    };

    *state.last_request.lock().unwrap() = Some(body);

    if let Some(rejection) = check_call(&state, &headers).await {
        return rejection;
    }

    if method == "_:recognize" {
        return Json(state.behavior.inline_response.clone()).into_response();
    }

    let name = format!("projects/{project}/locations/{location}/operations/{OPERATION_ID}");

    if state.behavior.pending_polls == 0 {
        return Json(finished_operation(&name, &state.behavior)).into_response();
    }

    Json(json!({ "name": name })).into_response()
}

async fn handle_operation(
    State(state): State<Arc<MockSpeechState>>,
    Path((project, location, operation)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    let polls = state.poll_count.fetch_add(1, Ordering::Relaxed) + 1;

    if let Some(rejection) = check_call(&state, &headers).await {
        return rejection;
    }

    let name = format!("projects/{project}/locations/{location}/operations/{operation}");

    if polls < state.behavior.pending_polls {
        return Json(json!({ "name": name, "done": false })).into_response();
    }

    Json(finished_operation(&name, &state.behavior)).into_response()
}

/// Apply delay, bearer check and configured failure
async fn check_call(state: &MockSpeechState, headers: &HeaderMap) -> Option<Response> {
    if !state.behavior.delay.is_zero() {
        tokio::time::sleep(state.behavior.delay).await;
    }

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {MOCK_ACCESS_TOKEN}"));

    if !authorized {
        return Some(google_error(StatusCode::UNAUTHORIZED, "Request had invalid authentication credentials."));
    }

    state
        .behavior
        .failure
        .as_ref()
        .map(|(status, message)| google_error(*status, message))
}

fn finished_operation(name: &str, behavior: &Behavior) -> Value {
    let mut response = behavior.batch_response.clone();

    if let Some(object) = response.as_object_mut() {
        object.insert(
            "@type".to_owned(),
            json!("type.googleapis.com/google.cloud.speech.v2.BatchRecognizeResponse"),
        );
    }

    json!({ "name": name, "done": true, "response": response })
}

fn google_error(status: StatusCode, message: &str) -> Response {
    let body = json!({
        "error": {
            "code": status.as_u16(),
            "message": message,
            "status": status.canonical_reason().unwrap_or("UNKNOWN").to_uppercase().replace(' ', "_")
        }
    });

    (status, Json(body)).into_response()
}
