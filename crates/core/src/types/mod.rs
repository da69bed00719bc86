//! Core types for the Kingsley Style storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod product;
pub mod status;

pub use id::*;
pub use price::{CurrencyCode, Price, PriceError};
pub use product::{Category, Product};
pub use status::*;
