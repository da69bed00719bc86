//! Integration tests for the Kingsley Style storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p kingsley-integration-tests
//! ```
//!
//! No network access or API key is needed: [`StubGemini`] serves the
//! `generateContent` endpoint on an ephemeral local port and records every
//! request it receives.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use kingsley_storefront::config::StylistConfig;
use kingsley_storefront::gemini::GeminiClient;
use secrecy::SecretString;
use serde_json::{Value, json};

/// API key the stub expects.
pub const TEST_API_KEY: &str = "test-gemini-key";

/// How the stub answers every request.
#[derive(Debug, Clone)]
pub enum StubResponse {
    /// A single candidate whose only part is this text.
    Reply(String),
    /// A success response with an arbitrary body.
    Json(Value),
    /// A non-success status with a JSON error body.
    Error { status: u16, body: Value },
    /// 429 with a `Retry-After` header.
    RateLimited { retry_after: u64 },
    /// A success response whose body is not JSON.
    Malformed,
}

/// One request received by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// The `{model}:{method}` path segment.
    pub call: String,
    /// Value of the `x-goog-api-key` header.
    pub api_key: Option<String>,
    pub body: Value,
}

struct StubState {
    response: StubResponse,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// A local stand-in for the Gemini API.
pub struct StubGemini {
    addr: SocketAddr,
    state: Arc<StubState>,
}

impl StubGemini {
    /// Start the stub on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start(response: StubResponse) -> Self {
        let state = Arc::new(StubState {
            response,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1beta/models/{call}", post(generate))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub address");

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Stub Gemini server error");
            }
        });

        Self { addr, state }
    }

    /// Base URL to put in [`StylistConfig::api_base_url`].
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/v1beta", self.addr)
    }

    /// Stylist configuration pointing at this stub, with [`TEST_API_KEY`].
    #[must_use]
    pub fn config(&self) -> StylistConfig {
        StylistConfig {
            api_key: Some(SecretString::from(TEST_API_KEY)),
            api_base_url: self.base_url(),
            ..StylistConfig::default()
        }
    }

    /// A Gemini client pointing at this stub.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> GeminiClient {
        GeminiClient::new(&self.config()).expect("gemini client")
    }

    /// Requests received so far.
    ///
    /// # Panics
    ///
    /// Panics if the request log is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("request log").clone()
    }
}

async fn generate(
    State(state): State<Arc<StubState>>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let api_key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state
        .requests
        .lock()
        .expect("request log")
        .push(RecordedRequest { call, api_key, body });

    match &state.response {
        StubResponse::Reply(text) => Json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        }))
        .into_response(),
        StubResponse::Json(body) => Json(body.clone()).into_response(),
        StubResponse::Error { status, body } => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(body.clone()),
        )
            .into_response(),
        StubResponse::RateLimited { retry_after } => (
            StatusCode::TOO_MANY_REQUESTS,
            [("retry-after", retry_after.to_string())],
            Json(json!({
                "error": { "code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED" }
            })),
        )
            .into_response(),
        StubResponse::Malformed => (StatusCode::OK, "not json").into_response(),
    }
}
