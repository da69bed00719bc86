//! Shopping cart state.
//!
//! The cart is an ordered list of product references in the order they were
//! added. The same product may appear more than once; each add is its own
//! entry and entries are removed by position.

use std::sync::Arc;

use kingsley_core::{CurrencyCode, Price, Product};

/// In-memory shopping cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    currency_code: CurrencyCode,
    entries: Vec<Arc<Product>>,
}

impl Cart {
    /// Create an empty cart that totals in `currency_code`.
    #[must_use]
    pub const fn new(currency_code: CurrencyCode) -> Self {
        Self {
            currency_code,
            entries: Vec::new(),
        }
    }

    /// Append `product` to the end of the cart.
    ///
    /// Products priced in another currency are rejected and leave the cart
    /// unchanged. Returns whether the product was added.
    pub fn add(&mut self, product: Arc<Product>) -> bool {
        if product.price.currency_code() != self.currency_code {
            return false;
        }
        self.entries.push(product);
        true
    }

    /// Remove the entry at `position`.
    ///
    /// Out-of-range positions leave the cart unchanged and return `None`.
    pub fn remove(&mut self, position: usize) -> Option<Arc<Product>> {
        (position < self.entries.len()).then(|| self.entries.remove(position))
    }

    /// Entries in add order.
    #[must_use]
    pub fn entries(&self) -> &[Arc<Product>] {
        &self.entries
    }

    /// Number of entries (the badge count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of entry prices.
    ///
    /// Every entry shares the cart's currency, enforced by [`Cart::add`].
    #[must_use]
    pub fn total(&self) -> Price {
        self.entries
            .iter()
            .fold(Price::zero(self.currency_code), |acc, product| {
                acc.saturating_add(product.price)
            })
    }
}
