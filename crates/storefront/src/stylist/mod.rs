//! AI stylist conversation controller.
//!
//! A [`StylistSession`] owns one conversation and publishes every change
//! through a `tokio::sync::watch` channel, so front-ends re-render from
//! [`StylistSession::subscribe`] instead of polling.
//!
//! Only one send may be in flight per session. The pending flag is checked
//! and set in the same state update that appends the user turn, so turn
//! order never depends on reply timing.

mod conversation;
mod image;

pub use conversation::{ChatTurn, Conversation, GREETING, PendingRequest, SendRejected};
pub use image::{ImageAttachment, ImageError, media_type_for_path};

use std::error::Error as StdError;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::instrument;
use uuid::Uuid;

/// Model turn appended when the generator fails.
pub const STYLIST_APOLOGY: &str =
    "I apologize, but I am unable to process your request at the moment.";

/// Failure reported by a [`ReplyGenerator`].
#[derive(Debug, thiserror::Error)]
#[error("reply generation failed: {source}")]
pub struct GenerateError {
    #[source]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

impl GenerateError {
    pub fn new(source: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Produces the stylist's reply to a message.
pub trait ReplyGenerator: Send + Sync {
    /// Generate a reply.
    ///
    /// `history` holds the turns before the new message.
    fn generate(
        &self,
        history: &[ChatTurn],
        message: &str,
        image: Option<&ImageAttachment>,
    ) -> impl Future<Output = Result<String, GenerateError>> + Send;
}

/// Result of [`StylistSession::send_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The generator's reply was appended.
    Replied,
    /// The generator failed and the apology was appended.
    Failed,
    /// Nothing to send; the conversation is unchanged.
    Empty,
    /// Another send is still pending; the conversation is unchanged.
    Busy,
}

/// A stylist conversation bound to a reply generator.
///
/// Cheap to clone; clones share the same conversation.
pub struct StylistSession<G> {
    inner: Arc<SessionInner<G>>,
}

struct SessionInner<G> {
    id: Uuid,
    generator: G,
    state: watch::Sender<Conversation>,
}

impl<G> Clone for StylistSession<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G> std::fmt::Debug for StylistSession<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let conversation = self.inner.state.borrow();
        f.debug_struct("StylistSession")
            .field("id", &self.inner.id)
            .field("turns", &conversation.turns().len())
            .field("pending", &conversation.is_pending())
            .finish_non_exhaustive()
    }
}

impl<G: ReplyGenerator> StylistSession<G> {
    /// Open a session that starts with the stylist's greeting.
    pub fn new(generator: G) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session_id = %id, "Opened stylist session");
        Self {
            inner: Arc::new(SessionInner {
                id,
                generator,
                state: watch::Sender::new(Conversation::new()),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Watch the conversation for changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Conversation> {
        self.inner.state.subscribe()
    }

    /// Copy of the current conversation.
    #[must_use]
    pub fn conversation(&self) -> Conversation {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.state.borrow().is_pending()
    }

    /// Stage an image for the next message, replacing any staged image.
    pub fn stage_image(&self, image: ImageAttachment) {
        self.inner.state.send_modify(|c| c.stage_image(image));
    }

    /// Drop the staged image. Returns whether one was staged.
    pub fn cancel_image(&self) -> bool {
        self.inner
            .state
            .send_if_modified(|c| c.clear_staged_image().is_some())
    }

    /// Send a message, with the staged image if there is one.
    ///
    /// The user turn is appended before the generator is called and the
    /// model turn after it returns. Generator failures become the apology
    /// turn and are never returned to the caller.
    #[instrument(skip(self, text), fields(session_id = %self.inner.id))]
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        match self.begin_send(text) {
            Ok(request) => self.complete_send(request).await,
            Err(SendRejected::Empty) => SendOutcome::Empty,
            Err(SendRejected::Busy) => SendOutcome::Busy,
        }
    }

    /// Accept a message without waiting for the reply.
    ///
    /// On success the user turn is already appended and the session is
    /// pending until [`StylistSession::complete_send`] runs.
    ///
    /// # Errors
    ///
    /// Returns [`SendRejected`] for a blank message with no staged image,
    /// or while another send is pending.
    pub fn begin_send(&self, text: &str) -> Result<PendingRequest, SendRejected> {
        let mut begun = Err(SendRejected::Empty);
        self.inner.state.send_if_modified(|c| {
            begun = c.begin_send(text);
            begun.is_ok()
        });
        if matches!(begun, Err(SendRejected::Busy)) {
            tracing::debug!(session_id = %self.inner.id, "Send rejected while a reply is pending");
        }
        begun
    }

    /// Generate the reply for an accepted message and append it.
    pub async fn complete_send(&self, request: PendingRequest) -> SendOutcome {
        let reply = self
            .inner
            .generator
            .generate(&request.history, &request.text, request.image.as_ref())
            .await;

        match reply {
            Ok(text) => {
                self.inner.state.send_modify(|c| c.finish_send(text, false));
                SendOutcome::Replied
            }
            Err(e) => {
                tracing::error!(session_id = %self.inner.id, error = %e, "Stylist reply failed");
                self.inner
                    .state
                    .send_modify(|c| c.finish_send(STYLIST_APOLOGY.to_string(), true));
                SendOutcome::Failed
            }
        }
    }
}
