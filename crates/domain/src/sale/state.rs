//! Sale and sale-item status state machines.

use serde::{Deserialize, Serialize};

/// The status of a sale in its lifecycle.
///
/// Status transitions:
/// ```text
/// Pending ──► Confirmed ──► Completed ──► Shipped ──► Delivered
///    │            │
///    └────────────┴──► Cancelled
/// ```
///
/// Cancellation is only reachable from the early statuses; once fulfilment
/// has started (Completed onwards) the sale can no longer be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SaleStatus {
    /// Sale has been created and awaits confirmation.
    #[default]
    Pending,

    /// Sale has been confirmed for fulfilment.
    Confirmed,

    /// Payment settled and the sale closed out for dispatch.
    Completed,

    /// Goods have left the branch.
    Shipped,

    /// Goods reached the customer (terminal state).
    Delivered,

    /// Sale was cancelled (terminal state).
    Cancelled,
}

impl SaleStatus {
    /// Returns true if the item list can still be replaced.
    pub fn can_modify_items(&self) -> bool {
        matches!(self, SaleStatus::Pending)
    }

    /// Returns true if the sale can be confirmed.
    pub fn can_confirm(&self) -> bool {
        matches!(self, SaleStatus::Pending)
    }

    /// Returns true if the sale can be completed.
    pub fn can_complete(&self) -> bool {
        matches!(self, SaleStatus::Confirmed)
    }

    /// Returns true if the sale can be shipped.
    pub fn can_ship(&self) -> bool {
        matches!(self, SaleStatus::Completed)
    }

    /// Returns true if the sale can be delivered.
    pub fn can_deliver(&self) -> bool {
        matches!(self, SaleStatus::Shipped)
    }

    /// Returns true if the whole sale can still be cancelled.
    pub fn can_cancel(&self) -> bool {
        matches!(self, SaleStatus::Pending | SaleStatus::Confirmed)
    }

    /// Returns true if individual items can still be cancelled. Completed
    /// and Shipped sales forbid it.
    pub fn allows_item_cancellation(&self) -> bool {
        !matches!(self, SaleStatus::Completed | SaleStatus::Shipped)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SaleStatus::Delivered | SaleStatus::Cancelled)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pending => "Pending",
            SaleStatus::Confirmed => "Confirmed",
            SaleStatus::Completed => "Completed",
            SaleStatus::Shipped => "Shipped",
            SaleStatus::Delivered => "Delivered",
            SaleStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The status of a single line item within a sale, independent of the
/// parent sale's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SaleItemStatus {
    /// Item counts toward the sale total.
    #[default]
    Active,

    /// Item was cancelled before fulfilment.
    Cancelled,

    /// Item was returned by the customer.
    Returned,

    /// Item could not be fulfilled from stock.
    OutOfStock,

    /// Item has left the branch.
    Shipped,

    /// Item reached the customer.
    Delivered,
}

impl SaleItemStatus {
    /// Returns true if the item can still be cancelled. Cancellation is
    /// one-way; cancelled and returned items cannot be cancelled again.
    pub fn can_cancel(&self) -> bool {
        !matches!(self, SaleItemStatus::Cancelled | SaleItemStatus::Returned)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleItemStatus::Active => "Active",
            SaleItemStatus::Cancelled => "Cancelled",
            SaleItemStatus::Returned => "Returned",
            SaleItemStatus::OutOfStock => "OutOfStock",
            SaleItemStatus::Shipped => "Shipped",
            SaleItemStatus::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for SaleItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
