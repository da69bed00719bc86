//! Kingsley Style storefront library.
//!
//! Catalog, cart and view state for the storefront, plus the AI stylist
//! conversation and its Gemini client. The `kingsley-storefront` binary
//! drives these through an interactive terminal shell.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gemini;
pub mod shell;
pub mod state;
pub mod stylist;
pub mod view;
