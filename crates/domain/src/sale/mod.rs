//! Sale aggregate and related types.

mod aggregate;
mod events;
mod state;

pub use aggregate::{Sale, SaleItem};
pub use events::{
    ItemCancelledData, SaleCancelledData, SaleCreatedData, SaleEvent, SaleModifiedData,
};
pub use state::{SaleItemStatus, SaleStatus};

use common::SaleId;
use thiserror::Error;

use crate::discount::DiscountError;
use crate::product::ProductId;

/// Errors that can occur during sale operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleError {
    /// The sale has already been cancelled.
    #[error("sale {sale_id} is already cancelled")]
    AlreadyCancelled { sale_id: SaleId },

    /// The sale's status forbids the requested action.
    #[error("invalid state transition: cannot {action} a {current_status} sale")]
    InvalidStateTransition {
        current_status: SaleStatus,
        action: &'static str,
    },

    /// No item with this product exists in the sale.
    #[error("item not found in sale: {product_id}")]
    ItemNotFound { product_id: ProductId },

    /// The item's own status forbids cancelling it again.
    #[error("item {product_id} cannot be cancelled from the {status} status")]
    ItemAlreadyCancelled {
        product_id: ProductId,
        status: SaleItemStatus,
    },

    /// Quantity must be at least one.
    #[error("invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// The discount policy rejected the line.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}
