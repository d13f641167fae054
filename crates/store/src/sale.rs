//! Sale store trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::SaleId;
use domain::Sale;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};

/// Persistence port for sale aggregates.
///
/// `update` must be atomic with respect to other writers of the same sale:
/// the version carried by the update has to match the stored one, and a
/// successful write bumps it.
#[async_trait]
pub trait SaleStore: Send + Sync {
    /// Loads a sale by ID, `None` when absent.
    async fn get(&self, id: SaleId) -> Result<Option<Sale>>;

    /// Persists a new sale, returning the stored copy with its first
    /// version. Duplicate IDs are rejected.
    async fn create(&self, sale: Sale) -> Result<Sale>;

    /// Persists changes to an existing sale, returning the stored copy
    /// with its new version.
    async fn update(&self, sale: Sale) -> Result<Sale>;
}

#[derive(Debug, Default)]
struct InMemorySaleState {
    sales: HashMap<SaleId, Sale>,
    fail_on_create: bool,
    fail_on_update: bool,
}

/// In-memory sale store for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemorySaleStore {
    state: Arc<RwLock<InMemorySaleState>>,
}

impl InMemorySaleStore {
    /// Creates a new empty in-memory sale store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to fail create calls.
    pub async fn set_fail_on_create(&self, fail: bool) {
        self.state.write().await.fail_on_create = fail;
    }

    /// Configures the store to fail update calls.
    pub async fn set_fail_on_update(&self, fail: bool) {
        self.state.write().await.fail_on_update = fail;
    }

    /// Returns the number of stored sales.
    pub async fn sale_count(&self) -> usize {
        self.state.read().await.sales.len()
    }

    /// Returns a copy of every stored sale.
    pub async fn sales(&self) -> Vec<Sale> {
        self.state.read().await.sales.values().cloned().collect()
    }
}

#[async_trait]
impl SaleStore for InMemorySaleStore {
    async fn get(&self, id: SaleId) -> Result<Option<Sale>> {
        Ok(self.state.read().await.sales.get(&id).cloned())
    }

    async fn create(&self, sale: Sale) -> Result<Sale> {
        let mut state = self.state.write().await;

        if state.fail_on_create {
            return Err(StoreError::Unavailable("sale store offline".to_string()));
        }

        if state.sales.contains_key(&sale.id()) {
            return Err(StoreError::AlreadyExists {
                entity: "sale",
                id: sale.id().to_string(),
            });
        }

        let mut stored = sale;
        stored.set_version(stored.version().next());
        state.sales.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn update(&self, sale: Sale) -> Result<Sale> {
        let mut state = self.state.write().await;

        if state.fail_on_update {
            return Err(StoreError::Unavailable("sale store offline".to_string()));
        }

        let existing = state
            .sales
            .get(&sale.id())
            .ok_or_else(|| StoreError::Missing {
                entity: "sale",
                id: sale.id().to_string(),
            })?;

        if existing.version() != sale.version() {
            return Err(StoreError::ConcurrencyConflict {
                entity: "sale",
                id: sale.id().to_string(),
                expected: sale.version(),
                actual: existing.version(),
            });
        }

        let mut stored = sale;
        stored.set_version(stored.version().next());
        state.sales.insert(stored.id(), stored.clone());
        Ok(stored)
    }
}
