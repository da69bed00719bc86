//! Stylist prompt construction.
//!
//! Text-only messages carry a short memory of the conversation: the last
//! [`HISTORY_WINDOW`] turns are folded into a labeled transcript ahead of the
//! new message. Messages with an image are sent on their own, with no
//! history, as a single-shot visual request.

use kingsley_core::ChatRole;

use super::types::{Content, GenerateContentRequest, GenerationConfig, Part};
use crate::stylist::{ChatTurn, ImageAttachment};

/// Persona applied to every stylist request.
pub const SYSTEM_INSTRUCTION: &str = "You are \"Kingsley\", a high-end, sophisticated AI fashion stylist for the brand Kingsley Style.
Your tone is elegant, helpful, and knowledgeable about fashion trends, color theory, and fabrics.
You help users choose outfits, understand dress codes, and match accessories.
If the user shows an image, analyze it for style, fit, and occasion, and offer specific recommendations from a modern luxury perspective.
Keep responses concise but polite.";

/// Number of prior turns folded into a text-only prompt.
pub const HISTORY_WINDOW: usize = 4;

/// Media type declared for every attached image.
pub const ASSUMED_IMAGE_MEDIA_TYPE: &str = "image/jpeg";

const fn speaker(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "Client",
        ChatRole::Model => "Kingsley",
    }
}

/// Fold recent history into the prompt for a text-only message.
///
/// With no prior turns the message is returned unchanged.
#[must_use]
pub fn compose_prompt(history: &[ChatTurn], message: &str) -> String {
    if history.is_empty() {
        return message.to_string();
    }

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    let transcript = history
        .iter()
        .skip(start)
        .map(|turn| format!("{}: {}", speaker(turn.role), turn.text))
        .collect::<Vec<_>>()
        .join("\n");

    format!("Previous conversation:\n{transcript}\n\nCurrent Client Request: {message}")
}

/// Build the `generateContent` request for one stylist message.
#[must_use]
pub fn build_request(
    history: &[ChatTurn],
    message: &str,
    image: Option<&ImageAttachment>,
    temperature: f32,
) -> GenerateContentRequest {
    let parts = match image {
        Some(image) => vec![
            Part::inline_data(ASSUMED_IMAGE_MEDIA_TYPE, image.base64_payload()),
            Part::text(message),
        ],
        None => vec![Part::text(compose_prompt(history, message))],
    };

    GenerateContentRequest {
        system_instruction: Content::system(SYSTEM_INSTRUCTION),
        contents: vec![Content::user(parts)],
        generation_config: GenerationConfig { temperature },
    }
}
