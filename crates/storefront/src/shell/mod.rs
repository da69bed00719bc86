//! Interactive terminal front-end.
//!
//! Reads commands line by line and re-renders whenever the storefront or the
//! open stylist conversation reports a change. Stylist replies are generated
//! on their own tasks so the shell keeps accepting input while a reply is
//! pending. Input ending never abandons a reply: the shell waits for every
//! in-flight send before it exits.

pub mod command;
pub mod render;

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::error::{Result, add_breadcrumb};
use crate::state::Storefront;
use crate::stylist::{
    Conversation, ImageAttachment, ReplyGenerator, SendOutcome, SendRejected, StylistSession,
};
use crate::view::ViewState;

use command::{Command, HELP};

/// The stylist session opened by the current visit to the stylist view.
struct ActiveStylist<G> {
    session: StylistSession<G>,
    rx: watch::Receiver<Conversation>,
}

enum Flow {
    Continue,
    Quit,
}

/// Terminal shell over a storefront.
pub struct Shell<G, W> {
    storefront: Storefront,
    generator: G,
    stylist: Option<ActiveStylist<G>>,
    sends: JoinSet<SendOutcome>,
    out: W,
}

impl<G, W> Shell<G, W>
where
    G: ReplyGenerator + Clone + 'static,
    W: Write,
{
    pub fn new(storefront: Storefront, generator: G, out: W) -> Self {
        Self {
            storefront,
            generator,
            stylist: None,
            sends: JoinSet::new(),
            out,
        }
    }

    /// Run until `/quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub async fn run<R>(mut self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut store_rx = self.storefront.subscribe();

        if self.storefront.view() == ViewState::Stylist {
            self.open_stylist();
        }
        self.render()?;
        writeln!(self.out, "Type /help for commands.")?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if matches!(self.handle_line(&line).await?, Flow::Quit) {
                        break;
                    }
                }
                Ok(()) = store_rx.changed() => {
                    self.render()?;
                }
                Some(()) = conversation_changed(self.stylist.as_mut()) => {
                    if self.storefront.view() == ViewState::Stylist {
                        self.render()?;
                    }
                }
                Some(joined) = self.sends.join_next() => log_send(joined),
            }
        }

        if !self.sends.is_empty() {
            tracing::debug!(in_flight = self.sends.len(), "Waiting for stylist replies");
            while let Some(joined) = self.sends.join_next().await {
                log_send(joined);
            }
            let replied = self
                .stylist
                .as_ref()
                .is_some_and(|active| active.rx.has_changed().unwrap_or(false));
            if replied {
                self.render()?;
            }
        }

        writeln!(self.out, "Thank you for visiting Kingsley Style.")?;
        self.out.flush()?;
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let command = match command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(e) => {
                writeln!(self.out, "{e}")?;
                return Ok(Flow::Continue);
            }
        };

        match command {
            Command::View(view) => self.navigate(view),
            Command::Add(id) => {
                if self.storefront.add_to_cart_by_id(id) {
                    let id = id.to_string();
                    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id.as_str())]));
                } else {
                    writeln!(self.out, "No product with id {id}.")?;
                }
            }
            Command::Remove(position) => {
                if !self.storefront.remove_from_cart(position - 1) {
                    writeln!(self.out, "Your bag has no item {position}.")?;
                }
            }
            Command::Attach(path) => match &self.stylist {
                Some(active) => match ImageAttachment::from_path(&path).await {
                    Ok(image) => active.session.stage_image(image),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to attach image");
                        writeln!(self.out, "{e}")?;
                    }
                },
                None => writeln!(self.out, "Open /stylist to show Kingsley a photo.")?,
            },
            Command::Detach => {
                let detached = self
                    .stylist
                    .as_ref()
                    .is_some_and(|active| active.session.cancel_image());
                if !detached {
                    writeln!(self.out, "No photo is attached.")?;
                }
            }
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
            Command::Message(text) => self.send(text)?,
        }

        Ok(Flow::Continue)
    }

    fn navigate(&mut self, view: ViewState) {
        let current = self.storefront.view();
        if view == ViewState::Stylist && current != ViewState::Stylist {
            self.open_stylist();
        } else if view != ViewState::Stylist {
            self.stylist = None;
        }
        add_breadcrumb("navigation", view.as_str(), None);
        self.storefront.set_view(view);
    }

    fn open_stylist(&mut self) {
        let session = StylistSession::new(self.generator.clone());
        let rx = session.subscribe();
        tracing::info!(session_id = %session.id(), "Stylist opened");
        self.stylist = Some(ActiveStylist { session, rx });
    }

    fn send(&mut self, text: String) -> Result<()> {
        let Some(active) = &self.stylist else {
            writeln!(self.out, "Open /stylist to chat with Kingsley.")?;
            return Ok(());
        };

        match active.session.begin_send(&text) {
            Ok(request) => {
                let session = active.session.clone();
                self.sends
                    .spawn(async move { session.complete_send(request).await });
            }
            Err(SendRejected::Busy) => writeln!(self.out, "Kingsley is still composing a reply.")?,
            Err(SendRejected::Empty) => {}
        }
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let state = self.storefront.snapshot();
        let conversation = self
            .stylist
            .as_mut()
            .map(|active| active.rx.borrow_and_update().clone());
        render::render(
            &mut self.out,
            self.storefront.catalog(),
            &state,
            conversation.as_ref(),
        )?;
        self.out.flush()?;
        Ok(())
    }
}

fn log_send(joined: std::result::Result<SendOutcome, tokio::task::JoinError>) {
    match joined {
        Ok(outcome) => tracing::debug!(?outcome, "Stylist send finished"),
        Err(e) => tracing::error!(error = %e, "Stylist send task failed"),
    }
}

/// Resolves when the open conversation changes; never resolves without one.
async fn conversation_changed<G>(stylist: Option<&mut ActiveStylist<G>>) -> Option<()> {
    match stylist {
        Some(active) => active.rx.changed().await.ok(),
        None => std::future::pending().await,
    }
}
