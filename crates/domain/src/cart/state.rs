//! Cart status state machine.

use serde::{Deserialize, Serialize};

/// The status of a shopping cart.
///
/// Status transitions:
/// ```text
/// Active ──┬──► Completed   (checkout)
///          └──► Cancelled   (abandoned)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CartStatus {
    /// The customer is still shopping; items can change.
    #[default]
    Active,

    /// The cart was converted into a sale (terminal state).
    Completed,

    /// The cart was abandoned (terminal state).
    Cancelled,
}

impl CartStatus {
    /// Returns true if items can be added, updated, or removed.
    pub fn can_modify_items(&self) -> bool {
        matches!(self, CartStatus::Active)
    }

    /// Returns true if a cart in this status may be deleted through the
    /// cart path. A completed cart has already become a sale and must not
    /// be independently deletable.
    pub fn can_be_deleted(&self) -> bool {
        matches!(self, CartStatus::Active | CartStatus::Cancelled)
    }

    /// Returns true if a cart in this status should be shown to callers.
    /// Completed carts live on only as sales.
    pub fn can_be_retrieved(&self) -> bool {
        !matches!(self, CartStatus::Completed)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CartStatus::Completed | CartStatus::Cancelled)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CartStatus::Active => "Active",
            CartStatus::Completed => "Completed",
            CartStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for CartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
