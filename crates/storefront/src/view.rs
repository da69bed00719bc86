//! Screen selection.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The screen currently shown to the shopper.
///
/// Any view is reachable from any other; there are no guards and no history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewState {
    #[default]
    Home,
    Shop,
    Stylist,
    Cart,
}

/// Returned when a view name is not recognized.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown view: {0}")]
pub struct UnknownView(pub String);

impl ViewState {
    pub const ALL: [Self; 4] = [Self::Home, Self::Shop, Self::Stylist, Self::Cart];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Shop => "shop",
            Self::Stylist => "stylist",
            Self::Cart => "cart",
        }
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewState {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|view| view.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownView(s.to_string()))
    }
}
