//! Use-case error types.

use common::{CartId, SaleId};
use domain::{CartError, DiscountError, ProductId, SaleError};
use store::StoreError;
use thiserror::Error;

/// Machine-readable classification of a use-case failure, stable across
/// releases. The `Display` string of the error carries the human-readable
/// detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The referenced cart, sale, item, or product does not exist.
    NotFound,
    /// A business rule rejected the operation.
    BusinessRuleViolation,
    /// A concurrent writer won; the caller may reload and retry.
    ConcurrencyConflict,
    /// A collaborator (store, catalog) was unreachable.
    DependencyFailure,
}

impl ErrorKind {
    /// Returns the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::BusinessRuleViolation => "business_rule_violation",
            ErrorKind::ConcurrencyConflict => "concurrency_conflict",
            ErrorKind::DependencyFailure => "dependency_failure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur while running an order lifecycle use case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderFlowError {
    /// No cart with this ID exists.
    #[error("cart not found: {0}")]
    CartNotFound(CartId),

    /// The cart was taken by a concurrent checkout or deletion.
    #[error("cart {0} was taken by a concurrent operation")]
    CartConflict(CartId),

    /// No sale with this ID exists.
    #[error("sale not found: {0}")]
    SaleNotFound(SaleId),

    /// The catalog has no product with this ID.
    #[error("product not found in catalog: {0}")]
    ProductNotFound(ProductId),

    /// A cart rule rejected the operation.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// A sale rule rejected the operation.
    #[error(transparent)]
    Sale(#[from] SaleError),

    /// The discount policy rejected the operation.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OrderFlowError {
    /// Classifies the error into the stable taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderFlowError::CartNotFound(_)
            | OrderFlowError::SaleNotFound(_)
            | OrderFlowError::ProductNotFound(_) => ErrorKind::NotFound,

            OrderFlowError::CartConflict(_) => ErrorKind::ConcurrencyConflict,

            OrderFlowError::Cart(CartError::ItemNotFound { .. })
            | OrderFlowError::Sale(SaleError::ItemNotFound { .. }) => ErrorKind::NotFound,

            OrderFlowError::Cart(_) | OrderFlowError::Sale(_) | OrderFlowError::Discount(_) => {
                ErrorKind::BusinessRuleViolation
            }

            OrderFlowError::Store(StoreError::ConcurrencyConflict { .. })
            | OrderFlowError::Store(StoreError::AlreadyExists { .. }) => {
                ErrorKind::ConcurrencyConflict
            }
            OrderFlowError::Store(StoreError::Missing { .. }) => ErrorKind::NotFound,
            OrderFlowError::Store(StoreError::Unavailable(_)) => ErrorKind::DependencyFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_kinds() {
        assert_eq!(
            OrderFlowError::CartNotFound(CartId::new()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            OrderFlowError::SaleNotFound(SaleId::new()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            OrderFlowError::Sale(SaleError::ItemNotFound {
                product_id: ProductId::new("SKU-404"),
            })
            .kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn business_rule_kinds() {
        assert_eq!(
            OrderFlowError::Discount(DiscountError::EmptyCheckout).kind(),
            ErrorKind::BusinessRuleViolation
        );
        assert_eq!(
            OrderFlowError::Sale(SaleError::AlreadyCancelled {
                sale_id: SaleId::new(),
            })
            .kind(),
            ErrorKind::BusinessRuleViolation
        );
    }

    #[test]
    fn store_kinds() {
        assert_eq!(
            OrderFlowError::Store(StoreError::Unavailable("down".to_string())).kind(),
            ErrorKind::DependencyFailure
        );
        assert_eq!(
            OrderFlowError::Store(StoreError::ConcurrencyConflict {
                entity: "sale",
                id: "x".to_string(),
                expected: common::Version::initial(),
                actual: common::Version::new(2),
            })
            .kind(),
            ErrorKind::ConcurrencyConflict
        );
    }

    #[test]
    fn kind_strings_are_stable() {
        assert_eq!(ErrorKind::NotFound.as_str(), "not_found");
        assert_eq!(
            ErrorKind::BusinessRuleViolation.as_str(),
            "business_rule_violation"
        );
        assert_eq!(
            ErrorKind::ConcurrencyConflict.as_str(),
            "concurrency_conflict"
        );
        assert_eq!(ErrorKind::DependencyFailure.as_str(), "dependency_failure");
    }
}
