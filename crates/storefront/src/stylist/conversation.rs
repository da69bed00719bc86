//! Conversation state for a stylist session.

use chrono::{DateTime, Utc};
use kingsley_core::{ChatRole, ChatTurnId};

use super::image::ImageAttachment;

/// Opening turn of every new session.
pub const GREETING: &str = "Welcome to the Private Concierge. I am Kingsley, your personal stylist. How may I assist you with your wardrobe today? You can show me an outfit or ask for advice.";

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub id: ChatTurnId,
    pub role: ChatRole,
    pub text: String,
    /// Image sent with a user turn.
    pub image: Option<ImageAttachment>,
    /// Set on the apology turn appended when generation fails.
    pub is_error: bool,
    /// When the turn was appended; shown beside it on screen.
    pub created_at: DateTime<Utc>,
}

/// Why a send was not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejected {
    /// Blank text and no staged image.
    Empty,
    /// A previous send has not completed.
    Busy,
}

/// A send that has been accepted and is awaiting its reply.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    /// Turns before the new user turn.
    pub history: Vec<ChatTurn>,
    pub text: String,
    pub image: Option<ImageAttachment>,
}

/// Ordered turns plus the pending flag and the staged image.
///
/// Turn ids increase strictly in append order.
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
    pending: bool,
    staged_image: Option<ImageAttachment>,
    next_id: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// A new conversation opened by the stylist's greeting.
    #[must_use]
    pub fn new() -> Self {
        let mut conversation = Self::empty();
        conversation.push_turn(ChatRole::Model, GREETING.to_string(), None, false);
        conversation
    }

    /// A conversation with no turns.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            turns: Vec::new(),
            pending: false,
            staged_image: None,
            next_id: 1,
        }
    }

    pub(crate) fn push_turn(
        &mut self,
        role: ChatRole,
        text: String,
        image: Option<ImageAttachment>,
        is_error: bool,
    ) {
        let id = ChatTurnId::new(self.next_id);
        self.next_id += 1;
        self.turns.push(ChatTurn {
            id,
            role,
            text,
            image,
            is_error,
            created_at: Utc::now(),
        });
    }

    #[must_use]
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Most recent turn.
    #[must_use]
    pub fn last_turn(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    /// Whether a send is awaiting its reply.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    #[must_use]
    pub const fn staged_image(&self) -> Option<&ImageAttachment> {
        self.staged_image.as_ref()
    }

    /// Stage an image for the next send, replacing any previous one.
    pub fn stage_image(&mut self, image: ImageAttachment) {
        self.staged_image = Some(image);
    }

    /// Drop the staged image, returning it if there was one.
    pub fn clear_staged_image(&mut self) -> Option<ImageAttachment> {
        self.staged_image.take()
    }

    /// Start a send.
    ///
    /// Appends the user turn with `text` and the staged image, clears the
    /// staged image and sets the pending flag, all in one step.
    ///
    /// # Errors
    ///
    /// Rejects blank text with no staged image, and any send while another
    /// is pending. A rejected send leaves the conversation untouched.
    pub fn begin_send(&mut self, text: &str) -> Result<PendingRequest, SendRejected> {
        if text.trim().is_empty() && self.staged_image.is_none() {
            return Err(SendRejected::Empty);
        }
        if self.pending {
            return Err(SendRejected::Busy);
        }

        let history = self.turns.clone();
        let image = self.staged_image.take();
        self.push_turn(ChatRole::User, text.to_string(), image.clone(), false);
        self.pending = true;

        Ok(PendingRequest {
            history,
            text: text.to_string(),
            image,
        })
    }

    /// Complete the pending send with the model's turn.
    pub fn finish_send(&mut self, text: String, is_error: bool) {
        self.push_turn(ChatRole::Model, text, None, is_error);
        self.pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_conversation_starts_with_greeting() {
        let conversation = Conversation::new();
        assert_eq!(conversation.turns().len(), 1);
        let greeting = &conversation.turns()[0];
        assert_eq!(greeting.role, ChatRole::Model);
        assert_eq!(greeting.text, GREETING);
        assert!(!greeting.is_error);
        assert!(!conversation.is_pending());
    }

    #[test]
    fn test_turn_ids_increase() {
        let mut conversation = Conversation::new();
        conversation.push_turn(ChatRole::User, "a".to_string(), None, false);
        conversation.push_turn(ChatRole::Model, "b".to_string(), None, false);

        let ids: Vec<u64> = conversation.turns().iter().map(|t| t.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_begin_send_appends_user_turn() {
        let mut conversation = Conversation::new();
        let request = conversation.begin_send("hello").expect("accepted");

        assert_eq!(request.history.len(), 1);
        assert_eq!(request.text, "hello");
        assert!(request.image.is_none());
        assert_eq!(conversation.turns().len(), 2);
        assert_eq!(conversation.last_turn().map(|t| t.role), Some(ChatRole::User));
        assert!(conversation.is_pending());
    }

    #[test]
    fn test_begin_send_rejects_blank_text() {
        let mut conversation = Conversation::new();
        assert_eq!(conversation.begin_send("   ").err(), Some(SendRejected::Empty));
        assert_eq!(conversation.begin_send("").err(), Some(SendRejected::Empty));
        assert_eq!(conversation.turns().len(), 1);
        assert!(!conversation.is_pending());
    }

    #[test]
    fn test_begin_send_accepts_image_without_text() {
        let mut conversation = Conversation::new();
        let image = ImageAttachment::from_data_url("data:image/png;base64,AAAA");
        conversation.stage_image(image.clone());

        let request = conversation.begin_send("").expect("accepted");
        assert_eq!(request.image.as_ref(), Some(&image));
        assert!(conversation.staged_image().is_none());
        assert_eq!(conversation.last_turn().and_then(|t| t.image.as_ref()), Some(&image));
    }

    #[test]
    fn test_begin_send_rejects_while_pending() {
        let mut conversation = Conversation::new();
        conversation.begin_send("first").expect("accepted");

        assert_eq!(conversation.begin_send("second").err(), Some(SendRejected::Busy));
        assert_eq!(conversation.turns().len(), 2);
    }

    #[test]
    fn test_busy_send_keeps_staged_image() {
        let mut conversation = Conversation::new();
        conversation.begin_send("first").expect("accepted");
        conversation.stage_image(ImageAttachment::from_data_url("data:image/png;base64,AAAA"));

        assert_eq!(conversation.begin_send("second").err(), Some(SendRejected::Busy));
        assert!(conversation.staged_image().is_some());
    }

    #[test]
    fn test_finish_send_clears_pending() {
        let mut conversation = Conversation::new();
        conversation.begin_send("hello").expect("accepted");
        conversation.finish_send("Great choice!".to_string(), false);

        assert!(!conversation.is_pending());
        let last = conversation.last_turn().expect("reply");
        assert_eq!(last.role, ChatRole::Model);
        assert_eq!(last.text, "Great choice!");
        assert!(conversation.begin_send("again").is_ok());
    }

    #[test]
    fn test_stage_image_replaces_previous() {
        let mut conversation = Conversation::new();
        conversation.stage_image(ImageAttachment::from_data_url("data:image/png;base64,AAAA"));
        conversation.stage_image(ImageAttachment::from_data_url("data:image/png;base64,BBBB"));

        assert_eq!(
            conversation.staged_image().map(ImageAttachment::base64_payload),
            Some("BBBB")
        );
        assert!(conversation.clear_staged_image().is_some());
        assert!(conversation.clear_staged_image().is_none());
    }
}
