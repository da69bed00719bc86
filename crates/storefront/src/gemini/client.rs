//! Gemini API client for stylist replies.
//!
//! One request per call: no caching, no retries, no streaming.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use crate::config::StylistConfig;

use super::error::{ApiErrorResponse, GeminiError};
use super::types::{GenerateContentRequest, GenerateContentResponse};

const API_KEY_HEADER: &str = "x-goog-api-key";
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Gemini API client.
///
/// Cheap to clone; clones share the underlying HTTP connection pool.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<GeminiClientInner>,
}

struct GeminiClientInner {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    model: String,
    endpoint: String,
    temperature: f32,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.inner.model)
            .field("endpoint", &self.inner.endpoint)
            .field("has_api_key", &self.inner.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// A missing API key is not an error here; every request made by the
    /// client then fails with [`GeminiError::MissingApiKey`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &StylistConfig) -> Result<Self, GeminiError> {
        let client = reqwest::Client::builder().build()?;
        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.api_base_url.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            inner: Arc::new(GeminiClientInner {
                client,
                api_key: config.api_key.clone(),
                model: config.model.clone(),
                endpoint,
                temperature: config.temperature,
            }),
        })
    }

    /// Model this client targets.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.inner.model
    }

    /// Full `generateContent` URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Sampling temperature sent with each request.
    #[must_use]
    pub fn temperature(&self) -> f32 {
        self.inner.temperature
    }

    /// Send a `generateContent` request.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured, the request fails, the
    /// API answers with a non-success status, or the body cannot be parsed.
    #[instrument(skip(self, request), fields(model = %self.inner.model))]
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let api_key = self
            .inner
            .api_key
            .as_ref()
            .ok_or(GeminiError::MissingApiKey)?;

        let response = self
            .inner
            .client
            .post(self.inner.endpoint.as_str())
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, api_key.expose_secret())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| GeminiError::Parse(format!("Failed to parse response: {e}")))
        } else {
            Err(handle_error_status(status, response).await)
        }
    }
}

/// Map a non-success response to an error.
async fn handle_error_status(status: StatusCode, response: reqwest::Response) -> GeminiError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return GeminiError::RateLimited(retry_after);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return GeminiError::Http(e),
    };
    let parsed = serde_json::from_str::<ApiErrorResponse>(&body).ok();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        let message = parsed.map_or_else(|| "Invalid API key".to_string(), |e| e.error.message);
        return GeminiError::Unauthorized(message);
    }

    match parsed {
        Some(api_error) => GeminiError::Api {
            status: if api_error.error.status.is_empty() {
                status.to_string()
            } else {
                api_error.error.status
            },
            message: api_error.error.message,
        },
        None => GeminiError::Api {
            status: status.to_string(),
            message: body,
        },
    }
}
