//! Cart aggregate and related types.

mod aggregate;
mod state;

pub use aggregate::{Cart, CartItem};
pub use state::CartStatus;

use thiserror::Error;

use crate::discount::DiscountError;
use crate::product::ProductId;

/// Errors that can occur during cart operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The cart's status forbids the requested action.
    #[error("invalid state transition: cannot {action} a {current_status} cart")]
    InvalidStateTransition {
        current_status: CartStatus,
        action: &'static str,
    },

    /// No line with this product exists in the cart.
    #[error("item not found in cart: {product_id}")]
    ItemNotFound { product_id: ProductId },

    /// Quantity must be at least one.
    #[error("invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// The discount policy rejected the line.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}
