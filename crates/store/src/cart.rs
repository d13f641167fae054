//! Cart store trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::CartId;
use domain::Cart;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};

/// Persistence port for cart aggregates.
///
/// `save` must be atomic with respect to other writers of the same cart:
/// the version carried by the saved cart has to match the stored one, and a
/// successful save bumps it.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Loads a cart by ID, `None` when absent.
    async fn get(&self, id: CartId) -> Result<Option<Cart>>;

    /// Persists the cart, returning the stored copy with its new version.
    async fn save(&self, cart: Cart) -> Result<Cart>;

    /// Deletes a cart, returning whether it existed.
    async fn delete(&self, id: CartId) -> Result<bool>;
}

#[derive(Debug, Default)]
struct InMemoryCartState {
    carts: HashMap<CartId, Cart>,
    fail_on_save: bool,
    fail_on_delete: bool,
}

/// In-memory cart store for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartStore {
    state: Arc<RwLock<InMemoryCartState>>,
}

impl InMemoryCartStore {
    /// Creates a new empty in-memory cart store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to fail save calls.
    pub async fn set_fail_on_save(&self, fail: bool) {
        self.state.write().await.fail_on_save = fail;
    }

    /// Configures the store to fail delete calls.
    pub async fn set_fail_on_delete(&self, fail: bool) {
        self.state.write().await.fail_on_delete = fail;
    }

    /// Returns the number of stored carts.
    pub async fn cart_count(&self) -> usize {
        self.state.read().await.carts.len()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn get(&self, id: CartId) -> Result<Option<Cart>> {
        Ok(self.state.read().await.carts.get(&id).cloned())
    }

    async fn save(&self, cart: Cart) -> Result<Cart> {
        let mut state = self.state.write().await;

        if state.fail_on_save {
            return Err(StoreError::Unavailable("cart store offline".to_string()));
        }

        if let Some(existing) = state.carts.get(&cart.id())
            && existing.version() != cart.version()
        {
            return Err(StoreError::ConcurrencyConflict {
                entity: "cart",
                id: cart.id().to_string(),
                expected: cart.version(),
                actual: existing.version(),
            });
        }

        let mut stored = cart;
        stored.set_version(stored.version().next());
        state.carts.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: CartId) -> Result<bool> {
        let mut state = self.state.write().await;

        if state.fail_on_delete {
            return Err(StoreError::Unavailable("cart store offline".to_string()));
        }

        Ok(state.carts.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn cart() -> Cart {
        Cart::new(CartId::new(), Uuid::new_v4(), "Ada Lovelace")
    }

    #[tokio::test]
    async fn save_and_get_roundtrip() {
        let store = InMemoryCartStore::new();
        let cart = cart();
        let id = cart.id();

        let stored = store.save(cart).await.unwrap();
        assert_eq!(stored.version().as_i64(), 1);

        let loaded = store.get(id).await.unwrap().unwrap();
        assert_eq!(loaded.id(), id);
        assert_eq!(loaded.version(), stored.version());
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = InMemoryCartStore::new();
        assert!(store.get(CartId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stale_save_conflicts() {
        let store = InMemoryCartStore::new();
        let cart = cart();

        let stored = store.save(cart.clone()).await.unwrap();
        // A second writer saves the same version we already persisted.
        let err = store.save(cart).await.unwrap_err();
        assert!(matches!(err, StoreError::ConcurrencyConflict { .. }));

        // The fresh copy still saves fine.
        store.save(stored).await.unwrap();
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let store = InMemoryCartStore::new();
        let cart = cart();
        let id = cart.id();
        store.save(cart).await.unwrap();

        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
        assert_eq!(store.cart_count().await, 0);
    }

    #[tokio::test]
    async fn fail_toggles_surface_unavailability() {
        let store = InMemoryCartStore::new();
        let cart = cart();
        let id = cart.id();
        store.save(cart.clone()).await.unwrap();

        store.set_fail_on_delete(true).await;
        assert!(matches!(
            store.delete(id).await,
            Err(StoreError::Unavailable(_))
        ));

        store.set_fail_on_save(true).await;
        assert!(matches!(
            store.save(cart).await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
