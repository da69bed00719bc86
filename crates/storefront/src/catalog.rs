//! Read-only product catalog.
//!
//! The catalog is loaded once at startup, either from the JSON file named by
//! `KINGSLEY_CATALOG_PATH` or from the built-in catalog compiled into the
//! binary. Products are shared as `Arc<Product>` so cart entries can reference
//! them without copying.
//!
//! # File Format
//!
//! ```json
//! {
//!   "currency_code": "USD",
//!   "products": [
//!     { "id": 1, "name": "The Oxford Executive", "price": "185",
//!       "category": "Men", "image": "https://...", "description": "..." }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use kingsley_core::{Category, CurrencyCode, Price, PriceError, Product, ProductId};

const BUILTIN_CATALOG: &str = include_str!("../content/catalog.json");

/// Number of products featured on the home view.
pub const FEATURED_COUNT: usize = 3;

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate product id {0}")]
    DuplicateId(ProductId),

    #[error("invalid price for product {id}: {source}")]
    InvalidPrice {
        id: ProductId,
        #[source]
        source: PriceError,
    },
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    currency_code: CurrencyCode,
    products: Vec<ProductRecord>,
}

#[derive(Debug, Deserialize)]
struct ProductRecord {
    id: ProductId,
    name: String,
    price: Decimal,
    category: Category,
    image: Url,
    description: String,
}

/// In-memory product catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    currency_code: CurrencyCode,
    products: Arc<Vec<Arc<Product>>>,
}

impl Catalog {
    /// Load the catalog compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded catalog is malformed.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Io(format!("{}: {e}", path.display())))?;
        let catalog = Self::from_json(&content)?;
        tracing::info!(path = %path.display(), products = catalog.len(), "Loaded catalog");
        Ok(catalog)
    }

    /// Parse and validate a catalog document.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON, duplicate product IDs, or
    /// negative prices.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_records(file.currency_code, file.products)
    }

    fn from_records(
        currency_code: CurrencyCode,
        records: Vec<ProductRecord>,
    ) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(records.len());
        let mut products = Vec::with_capacity(records.len());

        for record in records {
            if !seen.insert(record.id) {
                return Err(CatalogError::DuplicateId(record.id));
            }
            let price = Price::new(record.price, currency_code).map_err(|source| {
                CatalogError::InvalidPrice {
                    id: record.id,
                    source,
                }
            })?;
            products.push(Arc::new(Product {
                id: record.id,
                name: record.name,
                price,
                category: record.category,
                image: record.image,
                description: record.description,
            }));
        }

        Ok(Self {
            currency_code,
            products: Arc::new(products),
        })
    }

    /// All products, in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Arc<Product>] {
        &self.products
    }

    /// The products featured on the home view.
    #[must_use]
    pub fn featured(&self) -> &[Arc<Product>] {
        let end = FEATURED_COUNT.min(self.products.len());
        self.products.get(..end).unwrap_or_default()
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Arc<Product>> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Currency shared by every product in the catalog.
    #[must_use]
    pub const fn currency_code(&self) -> CurrencyCode {
        self.currency_code
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().expect("builtin catalog");
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.currency_code(), CurrencyCode::USD);

        let oxford = catalog.get(ProductId::new(1)).expect("product 1");
        assert_eq!(oxford.name, "The Oxford Executive");
        assert_eq!(oxford.price.amount(), Decimal::new(185, 0));
        assert_eq!(oxford.category.as_str(), "Men");
    }

    #[test]
    fn test_featured_is_first_three() {
        let catalog = Catalog::builtin().expect("builtin catalog");
        let ids: Vec<i32> = catalog.featured().iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_featured_on_small_catalog() {
        let json = r#"{"products": [
            {"id": 9, "name": "Scarf", "price": "40", "category": "Accessories",
             "image": "https://img.example.com/scarf.jpg", "description": "Wool."}
        ]}"#;
        let catalog = Catalog::from_json(json).expect("valid catalog");
        assert_eq!(catalog.featured().len(), 1);
        assert_eq!(catalog.currency_code(), CurrencyCode::USD);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let json = r#"{"currency_code": "USD", "products": [
            {"id": 1, "name": "A", "price": "10", "category": "Men",
             "image": "https://img.example.com/a.jpg", "description": ""},
            {"id": 1, "name": "B", "price": "20", "category": "Men",
             "image": "https://img.example.com/b.jpg", "description": ""}
        ]}"#;
        let err = Catalog::from_json(json).expect_err("duplicate id");
        assert!(matches!(err, CatalogError::DuplicateId(id) if id == ProductId::new(1)));
    }

    #[test]
    fn test_negative_price_rejected() {
        let json = r#"{"currency_code": "USD", "products": [
            {"id": 1, "name": "A", "price": "-5", "category": "Men",
             "image": "https://img.example.com/a.jpg", "description": ""}
        ]}"#;
        let err = Catalog::from_json(json).expect_err("negative price");
        assert!(matches!(err, CatalogError::InvalidPrice { .. }));
    }

    #[test]
    fn test_invalid_image_url_rejected() {
        let json = r#"{"currency_code": "USD", "products": [
            {"id": 1, "name": "A", "price": "5", "category": "Men",
             "image": "not a url", "description": ""}
        ]}"#;
        assert!(matches!(Catalog::from_json(json), Err(CatalogError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Catalog::load(Path::new("/definitely/not/here/catalog.json"))
            .expect_err("missing file");
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
