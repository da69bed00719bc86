//! Shared storefront state: the active view and the cart.
//!
//! Every mutation goes through a `tokio::sync::watch` sender, so subscribers
//! are notified of each change and always observe a consistent snapshot.

use std::sync::Arc;

use kingsley_core::{Price, Product, ProductId};
use tokio::sync::watch;

use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::view::ViewState;

/// Snapshot of the page-level state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontState {
    pub view: ViewState,
    pub cart: Cart,
}

/// Catalog plus observable page state.
///
/// Cheap to clone via `Arc`; clones share the same state.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    catalog: Catalog,
    state: watch::Sender<StorefrontState>,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Storefront")
            .field("products", &self.inner.catalog.len())
            .field("view", &state.view)
            .field("cart_count", &state.cart.len())
            .finish()
    }
}

impl Storefront {
    /// Create a storefront on the home view with an empty cart.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        let initial = StorefrontState {
            view: ViewState::default(),
            cart: Cart::new(catalog.currency_code()),
        };

        Self {
            inner: Arc::new(StorefrontInner {
                catalog,
                state: watch::Sender::new(initial),
            }),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Watch the view and cart for changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StorefrontState> {
        self.inner.state.subscribe()
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> StorefrontState {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn view(&self) -> ViewState {
        self.inner.state.borrow().view
    }

    /// Switch to `view`.
    ///
    /// Subscribers are only notified when the view actually changes.
    pub fn set_view(&self, view: ViewState) {
        let changed = self.inner.state.send_if_modified(|state| {
            let changed = state.view != view;
            state.view = view;
            changed
        });
        if changed {
            tracing::debug!(%view, "View changed");
        }
    }

    /// Append `product` to the end of the cart.
    ///
    /// Returns `false`, without notifying subscribers, when the product is
    /// priced in a currency other than the catalog's.
    pub fn add_to_cart(&self, product: Arc<Product>) -> bool {
        let product_id = product.id;
        let added = self
            .inner
            .state
            .send_if_modified(|state| state.cart.add(product));
        if added {
            tracing::debug!(%product_id, "Added to cart");
        } else {
            tracing::warn!(%product_id, "Rejected product priced in another currency");
        }
        added
    }

    /// Add the catalog product with `id`. Returns `false` for unknown ids.
    pub fn add_to_cart_by_id(&self, id: ProductId) -> bool {
        match self.inner.catalog.get(id) {
            Some(product) => self.add_to_cart(Arc::clone(product)),
            None => {
                tracing::debug!(product_id = %id, "Unknown product");
                false
            }
        }
    }

    /// Remove the cart entry at `position`. Returns `false` when out of range.
    pub fn remove_from_cart(&self, position: usize) -> bool {
        self.inner
            .state
            .send_if_modified(|state| state.cart.remove(position).is_some())
    }

    #[must_use]
    pub fn cart_count(&self) -> usize {
        self.inner.state.borrow().cart.len()
    }

    #[must_use]
    pub fn cart_total(&self) -> Price {
        self.inner.state.borrow().cart.total()
    }
}
