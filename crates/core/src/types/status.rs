//! Status and role enums.

use serde::{Deserialize, Serialize};

/// Author of a stylist conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    /// The shopper.
    User,
    /// The generative model acting as the stylist.
    Model,
}

impl ChatRole {
    /// Wire name of the role, as used by the generation API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}
