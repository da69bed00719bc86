//! Catalog product types.

use core::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use super::id::ProductId;
use super::price::Price;

/// A product category such as `Men` or `Accessories`.
///
/// Categories are an open set; any non-empty label is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A product in the catalog.
///
/// Products are immutable once loaded and shared by reference between the
/// catalog and the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Stable, unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Product category.
    pub category: Category,
    /// Product image location.
    pub image: Url,
    /// Short marketing description.
    pub description: String,
}
