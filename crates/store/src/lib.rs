//! Persistence ports for the storefront aggregates.
//!
//! The relational backends live outside this workspace; what the order
//! core needs is captured in the [`CartStore`], [`SaleStore`], and
//! [`ProductCatalog`] traits, each paired with an in-memory implementation
//! used by tests. The in-memory stores enforce the same
//! optimistic-concurrency contract a production backend must: a write
//! carrying a stale version is rejected with
//! [`StoreError::ConcurrencyConflict`].

mod cart;
mod catalog;
mod error;
mod sale;

pub use cart::{CartStore, InMemoryCartStore};
pub use catalog::{InMemoryProductCatalog, ProductCatalog};
pub use error::{Result, StoreError};
pub use sale::{InMemorySaleStore, SaleStore};
