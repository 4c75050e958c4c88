use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ports::ProductCatalog;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: Uuid,
    pub name: String,
    pub barcode: String,
    pub unit_price: BigDecimal,
    pub category: String,
    pub stock_level: u32,
}

/// Catalog backed by a fixed product list supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<Product>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Products whose name contains `term` (case-insensitive) or whose
    /// barcode contains it, limited to `category` when one is given.
    pub fn search(&self, term: &str, category: Option<&str>) -> Vec<&Product> {
        let needle = term.trim().to_lowercase();
        self.products
            .iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .filter(|p| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.barcode.contains(&needle)
            })
            .collect()
    }

    /// Distinct categories in catalog order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for p in &self.products {
            if !seen.contains(&p.category.as_str()) {
                seen.push(&p.category);
            }
        }
        seen
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn find(&self, product_id: Uuid) -> Option<Product> {
        self.products
            .iter()
            .find(|p| p.product_id == product_id)
            .cloned()
    }

    fn products(&self) -> Vec<Product> {
        self.products.clone()
    }
}
