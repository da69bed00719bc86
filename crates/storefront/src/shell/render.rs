//! Plain-text rendering of each view.

use std::io::{self, Write};

use kingsley_core::{ChatRole, Product};

use crate::catalog::Catalog;
use crate::state::StorefrontState;
use crate::stylist::Conversation;
use crate::view::ViewState;

const RULE: &str = "------------------------------------------------------------";

/// Render the active view.
///
/// `conversation` is only used on the stylist view.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render(
    out: &mut impl Write,
    catalog: &Catalog,
    state: &StorefrontState,
    conversation: Option<&Conversation>,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{RULE}")?;
    writeln!(
        out,
        "KINGSLEY STYLE  |  {}  |  Bag ({})",
        state.view.as_str().to_uppercase(),
        state.cart.len()
    )?;
    writeln!(out, "{RULE}")?;

    match state.view {
        ViewState::Home => render_home(out, catalog),
        ViewState::Shop => render_shop(out, catalog),
        ViewState::Cart => render_cart(out, state),
        ViewState::Stylist => match conversation {
            Some(conversation) => render_conversation(out, conversation),
            None => Ok(()),
        },
    }
}

fn render_home(out: &mut impl Write, catalog: &Catalog) -> io::Result<()> {
    writeln!(out, "Timeless elegance, curated for you.")?;
    writeln!(out)?;
    writeln!(out, "Featured")?;
    for product in catalog.featured() {
        render_product_line(out, product)?;
    }
    writeln!(out)?;
    writeln!(out, "Type /shop for the full collection or /stylist to meet Kingsley.")
}

fn render_shop(out: &mut impl Write, catalog: &Catalog) -> io::Result<()> {
    writeln!(out, "The Collection")?;
    for product in catalog.products() {
        render_product_line(out, product)?;
        writeln!(out, "        {}", product.description)?;
    }
    writeln!(out)?;
    writeln!(out, "Type /add <id> to add a piece to your bag.")
}

fn render_product_line(out: &mut impl Write, product: &Product) -> io::Result<()> {
    writeln!(
        out,
        "  [{}] {}  ({})  {}",
        product.id, product.name, product.category, product.price
    )
}

fn render_cart(out: &mut impl Write, state: &StorefrontState) -> io::Result<()> {
    if state.cart.is_empty() {
        writeln!(out, "Your bag is empty.")?;
        return writeln!(out, "Type /shop to browse the collection.");
    }

    for (position, product) in state.cart.entries().iter().enumerate() {
        writeln!(
            out,
            "  {}. {}  {}",
            position + 1,
            product.name,
            product.price
        )?;
    }
    writeln!(out)?;
    writeln!(out, "  Total: {}", state.cart.total())?;
    writeln!(out, "Type /remove <n> to remove an item.")
}

/// Render the stylist conversation.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render_conversation(out: &mut impl Write, conversation: &Conversation) -> io::Result<()> {
    for turn in conversation.turns() {
        let speaker = match turn.role {
            ChatRole::User => "You",
            ChatRole::Model => "Kingsley",
        };
        let marker = if turn.is_error { " (!)" } else { "" };
        writeln!(
            out,
            "[{}] {speaker}{marker}: {}",
            turn.created_at.format("%H:%M"),
            turn.text
        )?;
        if let Some(image) = &turn.image {
            writeln!(out, "    [photo: {}]", image.media_type().unwrap_or("image"))?;
        }
    }

    if let Some(image) = conversation.staged_image() {
        writeln!(
            out,
            "Attached: {} (~{} bytes). Send a message to share it, or /detach.",
            image.media_type().unwrap_or("image"),
            image.approx_size()
        )?;
    }
    if conversation.is_pending() {
        writeln!(out, "Kingsley is composing a reply...")?;
    }
    Ok(())
}
