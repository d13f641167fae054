//! Sale domain events.
//!
//! Every committed state change on a sale is announced downstream through
//! exactly one of these events. Payloads are deep copies taken at emission
//! time; mutating the aggregate afterwards cannot alter an event already
//! handed to the bus.

use chrono::{DateTime, Utc};
use common::SaleId;
use serde::{Deserialize, Serialize};

use super::{Sale, SaleItem};

/// Events describing committed changes to sales.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SaleEvent {
    /// A checkout produced a new sale.
    SaleCreated(SaleCreatedData),

    /// An existing sale changed (items replaced, item cancelled).
    SaleModified(SaleModifiedData),

    /// The whole sale was cancelled.
    SaleCancelled(SaleCancelledData),

    /// A single item within a sale was cancelled.
    ItemCancelled(ItemCancelledData),
}

impl SaleEvent {
    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            SaleEvent::SaleCreated(_) => "SaleCreated",
            SaleEvent::SaleModified(_) => "SaleModified",
            SaleEvent::SaleCancelled(_) => "SaleCancelled",
            SaleEvent::ItemCancelled(_) => "ItemCancelled",
        }
    }

    /// Returns the ID of the sale the event refers to.
    pub fn sale_id(&self) -> SaleId {
        match self {
            SaleEvent::SaleCreated(data) => data.sale.id(),
            SaleEvent::SaleModified(data) => data.sale.id(),
            SaleEvent::SaleCancelled(data) => data.sale.id(),
            SaleEvent::ItemCancelled(data) => data.sale_id,
        }
    }

    /// Creates a SaleCreated event from a snapshot of the sale.
    pub fn sale_created(sale: &Sale) -> Self {
        SaleEvent::SaleCreated(SaleCreatedData {
            sale: sale.clone(),
            occurred_at: Utc::now(),
        })
    }

    /// Creates a SaleModified event from a snapshot of the sale.
    pub fn sale_modified(sale: &Sale) -> Self {
        SaleEvent::SaleModified(SaleModifiedData {
            sale: sale.clone(),
            occurred_at: Utc::now(),
        })
    }

    /// Creates a SaleCancelled event from a snapshot of the sale.
    pub fn sale_cancelled(sale: &Sale) -> Self {
        SaleEvent::SaleCancelled(SaleCancelledData {
            sale: sale.clone(),
            occurred_at: Utc::now(),
        })
    }

    /// Creates an ItemCancelled event from a snapshot of the item.
    pub fn item_cancelled(sale: &Sale, item: SaleItem) -> Self {
        SaleEvent::ItemCancelled(ItemCancelledData {
            sale_id: sale.id(),
            sale_number: sale.sale_number().to_string(),
            item,
            occurred_at: Utc::now(),
        })
    }
}

/// Data for the SaleCreated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleCreatedData {
    /// The sale as created.
    pub sale: Sale,

    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}

/// Data for the SaleModified event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleModifiedData {
    /// The sale after the change.
    pub sale: Sale,

    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}

/// Data for the SaleCancelled event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleCancelledData {
    /// The sale after cancellation, cascaded item statuses included.
    pub sale: Sale,

    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}

/// Data for the ItemCancelled event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCancelledData {
    /// The sale the item belongs to.
    pub sale_id: SaleId,

    /// The sale's human-readable number.
    pub sale_number: String,

    /// The cancelled item.
    pub item: SaleItem,

    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}
