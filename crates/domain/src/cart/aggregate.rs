//! Cart aggregate implementation.

use chrono::{DateTime, Utc};
use common::{CartId, Version};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::discount::DiscountPolicy;
use crate::money::Money;
use crate::product::ProductId;

use super::{CartError, CartStatus};

/// A line item in a cart.
///
/// Product name and unit price are frozen at add-time; later catalog price
/// changes must not retroactively reprice a cart. `discount` is the line
/// discount, so `total == unit_price × quantity − discount` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// The product this line refers to.
    pub product_id: ProductId,

    /// Product name at add-time.
    pub product_name: String,

    /// Unit price at add-time.
    pub unit_price: Money,

    /// Quantity in the cart.
    pub quantity: u32,

    /// Line-level discount earned at this quantity.
    pub discount: Money,

    /// Discounted line total.
    pub total: Money,
}

impl CartItem {
    /// Builds a priced line: the discount policy decides the per-unit
    /// discount, which is scaled up to the line.
    pub fn new(
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
        policy: &DiscountPolicy,
    ) -> Result<Self, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity });
        }
        let total = policy.line_total(quantity, unit_price)?;
        let discount = (unit_price * quantity).subtract(total).unwrap_or_default();
        Ok(Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            unit_price,
            quantity,
            discount,
            total,
        })
    }
}

/// Cart aggregate root.
///
/// A customer's mutable pre-purchase collection of line items. The fields
/// are private on purpose: every item mutation goes through the aggregate,
/// which reprices the affected line and keeps `total_price` equal to the
/// sum of the line totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    /// Unique cart identifier.
    id: CartId,

    /// Customer who owns the cart.
    customer_id: Uuid,

    /// Customer name at creation time.
    customer_name: String,

    /// When the cart was created.
    created_at: DateTime<Utc>,

    /// Current status.
    status: CartStatus,

    /// Line items, unique by product.
    items: Vec<CartItem>,

    /// Sum of the line totals.
    total_price: Money,

    /// Version for optimistic concurrency.
    #[serde(default)]
    version: Version,
}

// Query methods
impl Cart {
    /// Returns the cart ID.
    pub fn id(&self) -> CartId {
        self.id
    }

    /// Returns the owning customer's ID.
    pub fn customer_id(&self) -> Uuid {
        self.customer_id
    }

    /// Returns the customer name captured at creation time.
    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    /// Returns when the cart was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the current status.
    pub fn status(&self) -> CartStatus {
        self.status
    }

    /// Returns the line items.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns the sum of the line totals.
    pub fn total_price(&self) -> Money {
        self.total_price
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

    /// Returns an item by product ID.
    pub fn find_item(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == *product_id)
    }

    /// Returns the number of lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the cart has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns true if the cart may be deleted through the cart path.
    pub fn can_be_deleted(&self) -> bool {
        self.status.can_be_deleted()
    }

    /// Returns each line as a `(quantity, unit_price)` pair for policy
    /// validation.
    pub fn lines(&self) -> Vec<(u32, Money)> {
        self.items
            .iter()
            .map(|item| (item.quantity, item.unit_price))
            .collect()
    }
}

// Command methods
impl Cart {
    /// Creates a new active, empty cart.
    pub fn new(id: CartId, customer_id: Uuid, customer_name: impl Into<String>) -> Self {
        Self {
            id,
            customer_id,
            customer_name: customer_name.into(),
            created_at: Utc::now(),
            status: CartStatus::Active,
            items: Vec::new(),
            total_price: Money::zero(),
            version: Version::initial(),
        }
    }

    /// Adds a product line, merging quantities when the product is already
    /// in the cart. The merged quantity is re-validated against the policy
    /// and the line repriced.
    pub fn add_item(
        &mut self,
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
        policy: &DiscountPolicy,
    ) -> Result<(), CartError> {
        self.ensure_modifiable("add item")?;

        let product_id = product_id.into();
        let merged_quantity = match self.find_item(&product_id) {
            Some(existing) => existing.quantity + quantity,
            None => quantity,
        };

        let item = CartItem::new(
            product_id.clone(),
            product_name,
            unit_price,
            merged_quantity,
            policy,
        )?;

        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
        self.recalculate_total();
        Ok(())
    }

    /// Sets the quantity of an existing line, repricing it. Quantity zero
    /// removes the line.
    pub fn update_item_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
        policy: &DiscountPolicy,
    ) -> Result<(), CartError> {
        self.ensure_modifiable("update item quantity")?;

        if quantity == 0 {
            return self.remove_item_unchecked(product_id);
        }

        let existing = self
            .items
            .iter_mut()
            .find(|i| i.product_id == *product_id)
            .ok_or_else(|| CartError::ItemNotFound {
                product_id: product_id.clone(),
            })?;

        let repriced = CartItem::new(
            existing.product_id.clone(),
            existing.product_name.clone(),
            existing.unit_price,
            quantity,
            policy,
        )?;
        *existing = repriced;
        self.recalculate_total();
        Ok(())
    }

    /// Removes a product line.
    pub fn remove_item(&mut self, product_id: &ProductId) -> Result<(), CartError> {
        self.ensure_modifiable("remove item")?;
        self.remove_item_unchecked(product_id)
    }

    /// Marks the cart as converted into a sale.
    pub fn complete(&mut self) -> Result<(), CartError> {
        if !self.status.can_modify_items() {
            return Err(CartError::InvalidStateTransition {
                current_status: self.status,
                action: "complete",
            });
        }
        self.status = CartStatus::Completed;
        Ok(())
    }

    /// Marks the cart as abandoned.
    pub fn cancel(&mut self) -> Result<(), CartError> {
        if !self.status.can_modify_items() {
            return Err(CartError::InvalidStateTransition {
                current_status: self.status,
                action: "cancel",
            });
        }
        self.status = CartStatus::Cancelled;
        Ok(())
    }

    fn ensure_modifiable(&self, action: &'static str) -> Result<(), CartError> {
        if self.status.can_modify_items() {
            Ok(())
        } else {
            Err(CartError::InvalidStateTransition {
                current_status: self.status,
                action,
            })
        }
    }

    fn remove_item_unchecked(&mut self, product_id: &ProductId) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != *product_id);
        if self.items.len() == before {
            return Err(CartError::ItemNotFound {
                product_id: product_id.clone(),
            });
        }
        self.recalculate_total();
        Ok(())
    }

    fn recalculate_total(&mut self) {
        self.total_price = self.items.iter().map(|i| i.total).sum();
    }
}
