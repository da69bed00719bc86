//! Gemini integration for the AI stylist.
//!
//! The stylist talks to Google's `generateContent` endpoint. Failures never
//! reach the shopper as errors: [`GeminiClient`] implements
//! [`ReplyGenerator`] by logging the failure and answering with a fixed
//! apology instead.
//!
//! # Request Shape
//!
//! ```json
//! {
//!   "systemInstruction": { "parts": [{ "text": "You are \"Kingsley\"..." }] },
//!   "contents": [{ "role": "user", "parts": [
//!     { "inlineData": { "mimeType": "image/jpeg", "data": "<base64>" } },
//!     { "text": "Does this work for a gala?" }
//!   ]}],
//!   "generationConfig": { "temperature": 0.7 }
//! }
//! ```

mod client;
mod error;
pub mod prompt;
pub mod types;

pub use client::GeminiClient;
pub use error::{ApiError, ApiErrorResponse, GeminiError};

use tracing::instrument;

use crate::stylist::{ChatTurn, GenerateError, ImageAttachment, ReplyGenerator};

/// Reply used when the API answers without any text.
pub const EMPTY_REPLY_FALLBACK: &str =
    "I apologize, I am currently unable to curate a response. Please try again.";

/// Reply used when the request fails for any reason.
pub const CONNECTION_FALLBACK: &str =
    "I am experiencing a momentary lapse in connection. Please try again shortly.";

impl GeminiClient {
    /// Produce the stylist's reply to `message`.
    ///
    /// Never fails: missing credentials, transport errors and API errors are
    /// logged and replaced by [`CONNECTION_FALLBACK`]; an empty reply becomes
    /// [`EMPTY_REPLY_FALLBACK`].
    #[instrument(
        skip(self, history, message, image),
        fields(model = %self.model(), history_len = history.len(), has_image = image.is_some())
    )]
    pub async fn stylist_reply(
        &self,
        history: &[ChatTurn],
        message: &str,
        image: Option<&ImageAttachment>,
    ) -> String {
        let request = prompt::build_request(history, message, image, self.temperature());

        match self.generate_content(&request).await {
            Ok(response) => response.text().unwrap_or_else(|| {
                tracing::warn!("Gemini returned no reply text");
                EMPTY_REPLY_FALLBACK.to_string()
            }),
            Err(e) => {
                tracing::error!(error = %e, "Gemini API error");
                CONNECTION_FALLBACK.to_string()
            }
        }
    }
}

impl ReplyGenerator for GeminiClient {
    async fn generate(
        &self,
        history: &[ChatTurn],
        message: &str,
        image: Option<&ImageAttachment>,
    ) -> Result<String, GenerateError> {
        Ok(self.stylist_reply(history, message, image).await)
    }
}
