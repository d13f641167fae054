//! Sale aggregate implementation.

use chrono::{DateTime, Utc};
use common::{SaleId, Version};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::discount::DiscountPolicy;
use crate::money::Money;
use crate::product::ProductId;

use super::{SaleError, SaleItemStatus, SaleStatus};

/// A line item within a sale, with its own cancellation lifecycle.
///
/// `discount` is the line-level discount (per-unit discount × quantity), so
/// `total == unit_price × quantity − discount` holds by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItem {
    /// Unique item identifier.
    pub id: Uuid,

    /// The sale this item belongs to.
    pub sale_id: SaleId,

    /// The product sold.
    pub product_id: ProductId,

    /// Product name frozen at sale-creation time.
    pub product_name: String,

    /// Quantity sold.
    pub quantity: u32,

    /// Unit price frozen at sale-creation time.
    pub unit_price: Money,

    /// Line-level discount.
    pub discount: Money,

    /// Discounted line total.
    pub total: Money,

    /// Current status, independent of the parent sale's status.
    pub status: SaleItemStatus,
}

impl SaleItem {
    /// Builds a priced line for a sale. The discount policy validates the
    /// quantity and fixes the line discount and total.
    pub fn new(
        sale_id: SaleId,
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
        policy: &DiscountPolicy,
    ) -> Result<Self, SaleError> {
        if quantity == 0 {
            return Err(SaleError::InvalidQuantity { quantity });
        }
        let total = policy.line_total(quantity, unit_price)?;
        let discount = (unit_price * quantity).subtract(total).unwrap_or_default();
        Ok(Self {
            id: Uuid::new_v4(),
            sale_id,
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity,
            unit_price,
            discount,
            total,
            status: SaleItemStatus::Active,
        })
    }

    /// Cancels the item. One-way: an already cancelled or returned item is
    /// rejected.
    pub fn cancel(&mut self) -> Result<(), SaleError> {
        if !self.status.can_cancel() {
            return Err(SaleError::ItemAlreadyCancelled {
                product_id: self.product_id.clone(),
                status: self.status,
            });
        }
        self.status = SaleItemStatus::Cancelled;
        Ok(())
    }

    /// Marks the item as returned by the customer.
    pub fn mark_returned(&mut self) -> Result<(), SaleError> {
        if matches!(
            self.status,
            SaleItemStatus::Cancelled | SaleItemStatus::Returned
        ) {
            return Err(SaleError::ItemAlreadyCancelled {
                product_id: self.product_id.clone(),
                status: self.status,
            });
        }
        self.status = SaleItemStatus::Returned;
        Ok(())
    }

    /// Marks the item as unfulfillable from stock.
    pub fn mark_out_of_stock(&mut self) -> Result<(), SaleError> {
        if self.status != SaleItemStatus::Active {
            return Err(SaleError::ItemAlreadyCancelled {
                product_id: self.product_id.clone(),
                status: self.status,
            });
        }
        self.status = SaleItemStatus::OutOfStock;
        Ok(())
    }

    /// Returns true if the item has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.status == SaleItemStatus::Cancelled
    }
}

/// Sale aggregate root.
///
/// The record of a completed checkout. Item data is frozen at creation,
/// and the fields are private: the only mutations after creation are the
/// status transitions below and the total recomputation they trigger.
/// Cancelled items stay in `items` so the history remains auditable; only
/// their status changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    /// Unique sale identifier.
    id: SaleId,

    /// Human-readable sale number.
    sale_number: String,

    /// Customer who made the purchase.
    customer_id: Uuid,

    /// Customer name frozen at sale-creation time.
    customer_name: String,

    /// When the sale was made.
    sale_date: DateTime<Utc>,

    /// Branch the sale was made at.
    branch: String,

    /// Line items, cancelled ones included.
    items: Vec<SaleItem>,

    /// Sum of the non-cancelled line totals.
    total_value: Money,

    /// Current status.
    status: SaleStatus,

    /// Version for optimistic concurrency.
    #[serde(default)]
    version: Version,
}

// Query methods
impl Sale {
    /// Returns the sale ID.
    pub fn id(&self) -> SaleId {
        self.id
    }

    /// Returns the human-readable sale number.
    pub fn sale_number(&self) -> &str {
        &self.sale_number
    }

    /// Returns the purchasing customer's ID.
    pub fn customer_id(&self) -> Uuid {
        self.customer_id
    }

    /// Returns the customer name captured at sale time.
    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    /// Returns when the sale was made.
    pub fn sale_date(&self) -> DateTime<Utc> {
        self.sale_date
    }

    /// Returns the branch the sale was made at.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Returns the line items, cancelled ones included.
    pub fn items(&self) -> &[SaleItem] {
        &self.items
    }

    /// Returns the sum of the non-cancelled line totals.
    pub fn total_value(&self) -> Money {
        self.total_value
    }

    /// Returns the current status.
    pub fn status(&self) -> SaleStatus {
        self.status
    }

    /// Returns the current version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Sets the version. Only stores should call this, after a successful
    /// persist.
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    /// Returns true if the sale has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.status == SaleStatus::Cancelled
    }

    /// Returns an item by product ID.
    pub fn find_item(&self, product_id: &ProductId) -> Option<&SaleItem> {
        self.items.iter().find(|i| i.product_id == *product_id)
    }

    /// Returns the items still counting toward the total.
    pub fn active_items(&self) -> impl Iterator<Item = &SaleItem> {
        self.items
            .iter()
            .filter(|i| i.status != SaleItemStatus::Cancelled)
    }
}

// Command methods
impl Sale {
    /// Creates a pending sale from already-priced items.
    pub fn new(
        id: SaleId,
        sale_number: impl Into<String>,
        customer_id: Uuid,
        customer_name: impl Into<String>,
        sale_date: DateTime<Utc>,
        branch: impl Into<String>,
        items: Vec<SaleItem>,
    ) -> Self {
        let mut sale = Self {
            id,
            sale_number: sale_number.into(),
            customer_id,
            customer_name: customer_name.into(),
            sale_date,
            branch: branch.into(),
            items,
            total_value: Money::zero(),
            status: SaleStatus::Pending,
            version: Version::initial(),
        };
        sale.recalculate_total();
        sale
    }

    /// Cancels the whole sale, cascading cancellation to every item that
    /// can still be cancelled. Items already cancelled or returned keep
    /// their status.
    pub fn cancel(&mut self) -> Result<(), SaleError> {
        if self.is_cancelled() {
            return Err(SaleError::AlreadyCancelled { sale_id: self.id });
        }
        if !self.status.can_cancel() {
            return Err(SaleError::InvalidStateTransition {
                current_status: self.status,
                action: "cancel",
            });
        }
        self.status = SaleStatus::Cancelled;
        for item in &mut self.items {
            if item.status.can_cancel() {
                item.status = SaleItemStatus::Cancelled;
            }
        }
        self.recalculate_total();
        Ok(())
    }

    /// Cancels a single item and recomputes the sale total from the
    /// remaining non-cancelled items. Returns a snapshot of the cancelled
    /// item.
    pub fn cancel_item(&mut self, product_id: &ProductId) -> Result<SaleItem, SaleError> {
        if !self.status.allows_item_cancellation() {
            return Err(SaleError::InvalidStateTransition {
                current_status: self.status,
                action: "cancel item",
            });
        }

        let item = self.find_item_mut(product_id)?;
        item.cancel()?;
        let cancelled = item.clone();
        self.recalculate_total();
        Ok(cancelled)
    }

    /// Marks a single item as returned. Returned items keep counting
    /// toward the total.
    pub fn return_item(&mut self, product_id: &ProductId) -> Result<SaleItem, SaleError> {
        let item = self.find_item_mut(product_id)?;
        item.mark_returned()?;
        let returned = item.clone();
        self.recalculate_total();
        Ok(returned)
    }

    /// Marks a single item as unfulfillable from stock.
    pub fn mark_item_out_of_stock(&mut self, product_id: &ProductId) -> Result<SaleItem, SaleError> {
        let item = self.find_item_mut(product_id)?;
        item.mark_out_of_stock()?;
        let marked = item.clone();
        self.recalculate_total();
        Ok(marked)
    }

    /// Replaces the item list. Only pending sales can still be reshaped.
    pub fn replace_items(&mut self, items: Vec<SaleItem>) -> Result<(), SaleError> {
        if !self.status.can_modify_items() {
            return Err(SaleError::InvalidStateTransition {
                current_status: self.status,
                action: "replace items",
            });
        }
        self.items = items;
        self.recalculate_total();
        Ok(())
    }

    /// Confirms the sale for fulfilment.
    pub fn confirm(&mut self) -> Result<(), SaleError> {
        self.transition(SaleStatus::Confirmed, SaleStatus::can_confirm, "confirm")
    }

    /// Closes the sale out for dispatch.
    pub fn complete(&mut self) -> Result<(), SaleError> {
        self.transition(SaleStatus::Completed, SaleStatus::can_complete, "complete")
    }

    /// Marks the sale as shipped, moving every active item along with it.
    pub fn ship(&mut self) -> Result<(), SaleError> {
        self.transition(SaleStatus::Shipped, SaleStatus::can_ship, "ship")?;
        for item in &mut self.items {
            if item.status == SaleItemStatus::Active {
                item.status = SaleItemStatus::Shipped;
            }
        }
        Ok(())
    }

    /// Marks the sale as delivered, moving every shipped item along with it.
    pub fn deliver(&mut self) -> Result<(), SaleError> {
        self.transition(SaleStatus::Delivered, SaleStatus::can_deliver, "deliver")?;
        for item in &mut self.items {
            if item.status == SaleItemStatus::Shipped {
                item.status = SaleItemStatus::Delivered;
            }
        }
        Ok(())
    }

    /// Recomputes `total_value` as the sum of the non-cancelled items'
    /// totals. Returned and out-of-stock items still count.
    pub fn recalculate_total(&mut self) {
        self.total_value = self
            .items
            .iter()
            .filter(|i| i.status != SaleItemStatus::Cancelled)
            .map(|i| i.total)
            .sum();
    }

    fn find_item_mut(&mut self, product_id: &ProductId) -> Result<&mut SaleItem, SaleError> {
        self.items
            .iter_mut()
            .find(|i| i.product_id == *product_id)
            .ok_or_else(|| SaleError::ItemNotFound {
                product_id: product_id.clone(),
            })
    }

    fn transition(
        &mut self,
        to: SaleStatus,
        allowed: fn(&SaleStatus) -> bool,
        action: &'static str,
    ) -> Result<(), SaleError> {
        if !allowed(&self.status) {
            return Err(SaleError::InvalidStateTransition {
                current_status: self.status,
                action,
            });
        }
        self.status = to;
        Ok(())
    }
}
