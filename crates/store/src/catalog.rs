//! Product catalog trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain::{Product, ProductId};
use tokio::sync::RwLock;

use crate::error::Result;

/// Read-only port onto the product catalog, used to snapshot product name
/// and price at sale-creation time.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Returns the products matching the given IDs. IDs without a matching
    /// product are simply absent from the result; the caller decides
    /// whether that is an error.
    async fn get_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>>;
}

/// In-memory product catalog for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductCatalog {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryProductCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product.
    pub async fn insert(&self, product: Product) {
        self.products
            .write()
            .await
            .insert(product.id.clone(), product);
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn get_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| products.get(id).cloned())
            .collect())
    }
}
