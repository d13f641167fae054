//! Domain layer for the storefront order lifecycle.
//!
//! This crate holds the pure business rules with no I/O:
//! - `Money`, a non-negative fixed-point amount
//! - the quantity-tier discount policy
//! - the `Cart` aggregate and its status state machine
//! - the `Sale` aggregate, its item lifecycle, and the domain events
//!   emitted when sales change

pub mod cart;
pub mod discount;
pub mod money;
pub mod product;
pub mod sale;

pub use cart::{Cart, CartError, CartItem, CartStatus};
pub use discount::{DiscountConfig, DiscountError, DiscountPolicy, DiscountTier};
pub use money::{Money, MoneyError};
pub use product::{Product, ProductId};
pub use sale::{
    ItemCancelledData, Sale, SaleCancelledData, SaleCreatedData, SaleError, SaleEvent, SaleItem,
    SaleItemStatus, SaleModifiedData, SaleStatus,
};
