//! Integration tests for catalog loading, navigation and the cart.

use std::path::PathBuf;

use kingsley_core::ProductId;
use kingsley_storefront::catalog::{Catalog, CatalogError};
use kingsley_storefront::shell::Shell;
use kingsley_storefront::state::Storefront;
use kingsley_storefront::stylist::{ChatTurn, GenerateError, ImageAttachment, ReplyGenerator};
use kingsley_storefront::view::ViewState;

const CATALOG: &str = r#"{
  "currency_code": "GBP",
  "products": [
    { "id": 10, "name": "Tweed Jacket", "price": "240.50", "category": "Men",
      "image": "https://example.com/tweed.jpg", "description": "Harris tweed." },
    { "id": 11, "name": "Cashmere Wrap", "price": "180", "category": "Women",
      "image": "https://example.com/wrap.jpg", "description": "Soft and warm." },
    { "id": 12, "name": "Leather Belt", "price": "65", "category": "Accessories",
      "image": "https://example.com/belt.jpg", "description": "Full grain." },
    { "id": 13, "name": "Silk Tie", "price": "45", "category": "Accessories",
      "image": "https://example.com/tie.jpg", "description": "Hand rolled." }
  ]
}"#;

#[derive(Clone)]
struct Unused;

impl ReplyGenerator for Unused {
    async fn generate(
        &self,
        _history: &[ChatTurn],
        _message: &str,
        _image: Option<&ImageAttachment>,
    ) -> Result<String, GenerateError> {
        Err(GenerateError::new("not expected"))
    }
}

fn temp_catalog(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("kingsley-{name}-{}.json", std::process::id()));
    std::fs::write(&path, content).expect("write catalog");
    path
}

// =============================================================================
// Catalog
// =============================================================================

#[test]
fn test_load_catalog_from_file() {
    let path = temp_catalog("catalog", CATALOG);
    let catalog = Catalog::load(&path).expect("load catalog");
    std::fs::remove_file(&path).expect("cleanup");

    assert_eq!(catalog.len(), 4);
    let featured: Vec<i32> = catalog.featured().iter().map(|p| p.id.get()).collect();
    assert_eq!(featured, vec![10, 11, 12]);
}

#[test]
fn test_load_missing_catalog() {
    let err = Catalog::load(&PathBuf::from("/no/such/catalog.json")).expect_err("missing");
    assert!(matches!(err, CatalogError::Io(_)));
}

// =============================================================================
// Cart and Navigation
// =============================================================================

#[test]
fn test_cart_totals_in_catalog_currency() {
    let storefront = Storefront::new(Catalog::from_json(CATALOG).expect("catalog"));

    for id in [10, 12, 12, 13] {
        assert!(storefront.add_to_cart_by_id(ProductId::new(id)));
    }
    assert_eq!(storefront.cart_count(), 4);
    assert_eq!(storefront.cart_total().to_string(), "£415.50");

    assert!(storefront.remove_from_cart(1));
    assert!(!storefront.remove_from_cart(3));
    assert_eq!(storefront.cart_total().to_string(), "£350.50");

    let names: Vec<String> = storefront
        .snapshot()
        .cart
        .entries()
        .iter()
        .map(|p| p.name.clone())
        .collect();
    assert_eq!(names, vec!["Tweed Jacket", "Leather Belt", "Silk Tie"]);
}

#[tokio::test]
async fn test_subscribers_observe_each_change() {
    let storefront = Storefront::new(Catalog::from_json(CATALOG).expect("catalog"));
    let mut rx = storefront.subscribe();

    storefront.set_view(ViewState::Shop);
    rx.changed().await.expect("view change");
    assert_eq!(rx.borrow_and_update().view, ViewState::Shop);

    storefront.add_to_cart_by_id(ProductId::new(11));
    rx.changed().await.expect("cart change");
    assert_eq!(rx.borrow_and_update().cart.len(), 1);

    storefront.set_view(ViewState::Shop);
    assert!(!rx.has_changed().expect("sender alive"));
}

// =============================================================================
// Terminal Shell
// =============================================================================

#[tokio::test]
async fn test_shell_script() {
    let storefront = Storefront::new(Catalog::from_json(CATALOG).expect("catalog"));
    let script = "/shop\n/add 10\n/add 13\n/add 42\n/view cart\n/remove 1\n/quit\n/add 11\n";

    let mut out = Vec::new();
    Shell::new(storefront.clone(), Unused, &mut out)
        .run(script.as_bytes())
        .await
        .expect("shell run");
    let out = String::from_utf8(out).expect("utf-8");

    assert!(out.contains("No product with id 42."));
    assert_eq!(storefront.view(), ViewState::Cart);
    // Input after /quit is ignored.
    let names: Vec<String> = storefront
        .snapshot()
        .cart
        .entries()
        .iter()
        .map(|p| p.name.clone())
        .collect();
    assert_eq!(names, vec!["Silk Tie"]);
}
