//! Shell command parsing.

use std::path::PathBuf;

use kingsley_core::ProductId;
use thiserror::Error;

use crate::view::ViewState;

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Switch to a view.
    View(ViewState),
    /// Add a catalog product to the cart.
    Add(ProductId),
    /// Remove a cart entry by its 1-based position.
    Remove(usize),
    /// Stage an image file for the next stylist message.
    Attach(PathBuf),
    /// Drop the staged image.
    Detach,
    Help,
    Quit,
    /// Anything that is not a command; sent to the stylist.
    Message(String),
}

/// Errors from parsing a command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command: /{0}. Type /help for a list of commands.")]
    Unknown(String),
    #[error("/{0} needs an argument: /{0} {1}")]
    MissingArgument(&'static str, &'static str),
    #[error("Invalid argument for /{command}: {value}")]
    InvalidArgument { command: &'static str, value: String },
}

/// Help text listing every command.
pub const HELP: &str = "\
Commands:
  /home              Featured pieces
  /shop              The full collection
  /stylist           Consult Kingsley, your personal stylist
  /cart              Your shopping bag
  /view <name>       Switch to home, shop, stylist or cart
  /add <id>          Add a product to the cart
  /remove <n>        Remove the n-th cart entry
  /attach <path>     Show Kingsley an outfit photo
  /detach            Discard the attached photo
  /help              This list
  /quit              Leave the store
Any other text is sent to Kingsley while the stylist is open.";

/// Parse one line of input. Blank lines yield `None`.
///
/// # Errors
///
/// Returns an error for unknown commands and missing or malformed arguments.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let Some(rest) = trimmed.strip_prefix('/') else {
        return Ok(Some(Command::Message(line.to_string())));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "home" => Command::View(ViewState::Home),
        "shop" => Command::View(ViewState::Shop),
        "stylist" => Command::View(ViewState::Stylist),
        "cart" => Command::View(ViewState::Cart),
        "view" => {
            let arg = required(arg, "view", "<name>")?;
            let view = arg.parse().map_err(|_| CommandError::InvalidArgument {
                command: "view",
                value: arg.to_string(),
            })?;
            Command::View(view)
        }
        "add" => {
            let arg = required(arg, "add", "<id>")?;
            let id: i32 = arg.parse().map_err(|_| CommandError::InvalidArgument {
                command: "add",
                value: arg.to_string(),
            })?;
            Command::Add(ProductId::new(id))
        }
        "remove" => {
            let arg = required(arg, "remove", "<n>")?;
            let position = arg
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| CommandError::InvalidArgument {
                    command: "remove",
                    value: arg.to_string(),
                })?;
            Command::Remove(position)
        }
        "attach" => Command::Attach(PathBuf::from(required(arg, "attach", "<path>")?)),
        "detach" => Command::Detach,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

const fn required<'a>(
    arg: &'a str,
    command: &'static str,
    usage: &'static str,
) -> Result<&'a str, CommandError> {
    if arg.is_empty() {
        Err(CommandError::MissingArgument(command, usage))
    } else {
        Ok(arg)
    }
}
