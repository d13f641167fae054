//! Quantity-tier discount policy.
//!
//! Discounts depend only on the quantity purchased of a single product:
//! crossing a tier's minimum quantity earns that tier's percentage off the
//! unit price, and quantities above the per-product cap are rejected
//! outright. All functions here are pure; the thresholds come from a
//! [`DiscountConfig`] so deployments can tune them without code changes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Money;

/// Errors produced by quantity validation and discount application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscountError {
    /// Quantity exceeds the per-product cap.
    #[error("cannot sell more than {max} units of a product (got {quantity})")]
    QuantityAboveLimit { quantity: u32, max: u32 },

    /// Quantity must be at least one.
    #[error("quantity must be greater than zero")]
    QuantityNotPositive,

    /// Checkout requires at least one line item.
    #[error("cannot check out without any items")]
    EmptyCheckout,
}

/// A discount tier: buying at least `min_quantity` units earns
/// `rate_bps` (basis points, 10000 = 100%) off the unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountTier {
    pub min_quantity: u32,
    pub rate_bps: u32,
}

/// Configuration for the discount policy.
///
/// Tiers are kept sorted by `min_quantity` descending so the highest
/// matching threshold always wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountConfig {
    pub max_quantity_per_product: u32,
    tiers: Vec<DiscountTier>,
}

impl DiscountConfig {
    /// Creates a configuration with the given cap and tiers.
    pub fn new(max_quantity_per_product: u32, mut tiers: Vec<DiscountTier>) -> Self {
        tiers.sort_by(|a, b| b.min_quantity.cmp(&a.min_quantity));
        Self {
            max_quantity_per_product,
            tiers,
        }
    }

    /// Loads the configuration from environment variables, falling back to
    /// the defaults (cap 20; 10+ units → 20% off, 4+ units → 10% off).
    ///
    /// Reads `MAX_QUANTITY_PER_PRODUCT`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(max) = std::env::var("MAX_QUANTITY_PER_PRODUCT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.max_quantity_per_product = max;
        }
        config
    }

    /// Returns the tiers, highest threshold first.
    pub fn tiers(&self) -> &[DiscountTier] {
        &self.tiers
    }
}

impl Default for DiscountConfig {
    fn default() -> Self {
        Self::new(
            20,
            vec![
                DiscountTier {
                    min_quantity: 10,
                    rate_bps: 2000,
                },
                DiscountTier {
                    min_quantity: 4,
                    rate_bps: 1000,
                },
            ],
        )
    }
}

/// Applies quantity-tier discounts to unit prices and line totals.
#[derive(Debug, Clone, Default)]
pub struct DiscountPolicy {
    config: DiscountConfig,
}

impl DiscountPolicy {
    /// Creates a policy from the given configuration.
    pub fn new(config: DiscountConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration in effect.
    pub fn config(&self) -> &DiscountConfig {
        &self.config
    }

    /// Returns true iff the quantity is positive and within the cap.
    pub fn validate_quantity(&self, quantity: u32) -> bool {
        quantity > 0 && quantity <= self.config.max_quantity_per_product
    }

    /// Returns the unit price after the discount earned at this quantity.
    ///
    /// Quantities above the per-product cap are rejected; quantities below
    /// every tier leave the price unchanged.
    pub fn discounted_unit_price(
        &self,
        quantity: u32,
        unit_price: Money,
    ) -> Result<Money, DiscountError> {
        if quantity > self.config.max_quantity_per_product {
            return Err(DiscountError::QuantityAboveLimit {
                quantity,
                max: self.config.max_quantity_per_product,
            });
        }

        match self
            .config
            .tiers
            .iter()
            .find(|tier| quantity >= tier.min_quantity)
        {
            Some(tier) => {
                let keep_bps = 10_000u32.saturating_sub(tier.rate_bps);
                Ok(unit_price.percent_of(keep_bps))
            }
            None => Ok(unit_price),
        }
    }

    /// Returns the per-unit discount earned at this quantity.
    ///
    /// The result is per unit; callers computing a line discount must
    /// multiply by the quantity themselves.
    pub fn unit_discount(&self, quantity: u32, unit_price: Money) -> Result<Money, DiscountError> {
        let discounted = self.discounted_unit_price(quantity, unit_price)?;
        Ok(unit_price.subtract(discounted).unwrap_or_default())
    }

    /// Returns the discounted line total for one product line.
    pub fn line_total(&self, quantity: u32, unit_price: Money) -> Result<Money, DiscountError> {
        Ok(self.discounted_unit_price(quantity, unit_price)? * quantity)
    }

    /// Sums the discounted line totals across all lines.
    pub fn order_total(&self, lines: &[(u32, Money)]) -> Result<Money, DiscountError> {
        let mut total = Money::zero();
        for (quantity, unit_price) in lines {
            total += self.line_total(*quantity, *unit_price)?;
        }
        Ok(total)
    }

    /// Validates a cart's lines ahead of checkout: at least one line, and
    /// every quantity positive and within the cap.
    pub fn validate_for_checkout(&self, lines: &[(u32, Money)]) -> Result<(), DiscountError> {
        if lines.is_empty() {
            return Err(DiscountError::EmptyCheckout);
        }
        for (quantity, _) in lines {
            if *quantity == 0 {
                return Err(DiscountError::QuantityNotPositive);
            }
            if *quantity > self.config.max_quantity_per_product {
                return Err(DiscountError::QuantityAboveLimit {
                    quantity: *quantity,
                    max: self.config.max_quantity_per_product,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(cents: i64) -> Money {
        Money::from_cents(cents).unwrap()
    }

    #[test]
    fn no_discount_below_first_tier() {
        let policy = DiscountPolicy::default();
        for q in 1..=3 {
            assert_eq!(
                policy.discounted_unit_price(q, money(10000)).unwrap(),
                money(10000)
            );
        }
    }

    #[test]
    fn ten_percent_from_four_units() {
        let policy = DiscountPolicy::default();
        assert_eq!(
            policy.discounted_unit_price(4, money(10000)).unwrap(),
            money(9000)
        );
        assert_eq!(
            policy.discounted_unit_price(9, money(10000)).unwrap(),
            money(9000)
        );
    }

    #[test]
    fn twenty_percent_from_ten_units() {
        let policy = DiscountPolicy::default();
        assert_eq!(
            policy.discounted_unit_price(10, money(10000)).unwrap(),
            money(8000)
        );
        assert_eq!(
            policy.discounted_unit_price(20, money(10000)).unwrap(),
            money(8000)
        );
    }

    #[test]
    fn rejects_quantity_above_cap() {
        let policy = DiscountPolicy::default();
        assert!(matches!(
            policy.discounted_unit_price(21, money(10000)),
            Err(DiscountError::QuantityAboveLimit { quantity: 21, max: 20 })
        ));
    }

    #[test]
    fn discount_never_increases_price() {
        let policy = DiscountPolicy::default();
        for q in 1..=20 {
            let discounted = policy.discounted_unit_price(q, money(997)).unwrap();
            assert!(discounted <= money(997), "quantity {q}");
        }
    }

    #[test]
    fn unit_discount_is_per_unit() {
        let policy = DiscountPolicy::default();
        // 10% off a $100.00 unit is $10.00 per unit, not per line.
        assert_eq!(policy.unit_discount(5, money(10000)).unwrap(), money(1000));
        assert_eq!(policy.unit_discount(2, money(10000)).unwrap(), Money::zero());
    }

    #[test]
    fn line_total_multiplies_discounted_unit() {
        let policy = DiscountPolicy::default();
        assert_eq!(policy.line_total(5, money(10000)).unwrap(), money(45000));
        assert_eq!(policy.line_total(12, money(5000)).unwrap(), money(48000));
    }

    #[test]
    fn order_total_sums_lines() {
        let policy = DiscountPolicy::default();
        let total = policy
            .order_total(&[(5, money(10000)), (12, money(5000))])
            .unwrap();
        assert_eq!(total, money(93000));
    }

    #[test]
    fn validate_quantity_bounds() {
        let policy = DiscountPolicy::default();
        assert!(!policy.validate_quantity(0));
        assert!(policy.validate_quantity(1));
        assert!(policy.validate_quantity(20));
        assert!(!policy.validate_quantity(21));
    }

    #[test]
    fn checkout_validation_rejects_empty_and_out_of_range() {
        let policy = DiscountPolicy::default();
        assert!(matches!(
            policy.validate_for_checkout(&[]),
            Err(DiscountError::EmptyCheckout)
        ));
        assert!(matches!(
            policy.validate_for_checkout(&[(0, money(100))]),
            Err(DiscountError::QuantityNotPositive)
        ));
        assert!(matches!(
            policy.validate_for_checkout(&[(1, money(100)), (21, money(100))]),
            Err(DiscountError::QuantityAboveLimit { .. })
        ));
        assert!(policy.validate_for_checkout(&[(20, money(100))]).is_ok());
    }

    #[test]
    fn highest_tier_wins_when_thresholds_overlap() {
        let config = DiscountConfig::new(
            50,
            vec![
                DiscountTier {
                    min_quantity: 5,
                    rate_bps: 500,
                },
                DiscountTier {
                    min_quantity: 10,
                    rate_bps: 2500,
                },
            ],
        );
        let policy = DiscountPolicy::new(config);
        assert_eq!(
            policy.discounted_unit_price(12, money(10000)).unwrap(),
            money(7500)
        );
    }

    #[test]
    fn custom_config_changes_cap() {
        let policy = DiscountPolicy::new(DiscountConfig::new(5, vec![]));
        assert!(policy.validate_quantity(5));
        assert!(!policy.validate_quantity(6));
        assert!(policy.discounted_unit_price(6, money(100)).is_err());
    }
}
