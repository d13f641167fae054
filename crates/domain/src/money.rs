//! Non-negative fixed-point monetary amounts.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when constructing or combining monetary amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// A negative amount was supplied.
    #[error("monetary amount cannot be negative: {amount}")]
    Negative { amount: Decimal },

    /// A subtraction would have produced a negative amount.
    #[error("subtraction result would be negative: {minuend} - {subtrahend}")]
    NegativeResult { minuend: Money, subtrahend: Money },

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// The amount does not fit the internal representation.
    #[error("monetary amount out of representable range")]
    OutOfRange,
}

/// A monetary amount in the store's currency, held as non-negative cents.
///
/// Amounts are rounded half-away-from-zero to two decimal places on
/// construction, so all later comparisons and sums are exact integer math.
/// Every arithmetic operation returns a new value; an operation that would
/// break the non-negativity invariant fails instead of clamping.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates an amount from a decimal value, rounding to two decimal
    /// places half-away-from-zero. Negative values are rejected.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative { amount });
        }

        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let cents = (rounded * Decimal::ONE_HUNDRED)
            .to_i64()
            .ok_or(MoneyError::OutOfRange)?;
        Ok(Self(cents))
    }

    /// Creates an amount directly from cents. Negative values are rejected.
    pub fn from_cents(cents: i64) -> Result<Self, MoneyError> {
        if cents < 0 {
            return Err(MoneyError::Negative {
                amount: Decimal::new(cents, 2),
            });
        }
        Ok(Self(cents))
    }

    /// Returns zero.
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in cents.
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the amount as a two-decimal-place decimal.
    pub fn amount(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns true if the amount is zero.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Subtracts another amount, failing if the result would be negative.
    pub fn subtract(&self, other: Money) -> Result<Money, MoneyError> {
        if other.0 > self.0 {
            return Err(MoneyError::NegativeResult {
                minuend: *self,
                subtrahend: other,
            });
        }
        Ok(Money(self.0 - other.0))
    }

    /// Divides the amount by a scalar, rounding half away from zero.
    pub fn divide(&self, divisor: u32) -> Result<Money, MoneyError> {
        if divisor == 0 {
            return Err(MoneyError::DivisionByZero);
        }
        let d = i128::from(divisor);
        let cents = (2 * i128::from(self.0) + d) / (2 * d);
        Ok(Money(cents as i64))
    }

    /// Returns the given fraction of this amount, expressed in basis points
    /// (10000 = 100%), rounding half away from zero.
    pub fn percent_of(&self, bps: u32) -> Money {
        let cents = (i128::from(self.0) * i128::from(bps) + 5000) / 10000;
        Money(cents as i64)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::Mul<u32> for Money {
    type Output = Money;

    fn mul(self, quantity: u32) -> Self::Output {
        Money(self.0 * i64::from(quantity))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn new_rounds_half_away_from_zero() {
        assert_eq!(Money::new(dec("10.005")).unwrap().cents(), 1001);
        assert_eq!(Money::new(dec("10.004")).unwrap().cents(), 1000);
        assert_eq!(Money::new(dec("10.995")).unwrap().cents(), 1100);
        assert_eq!(Money::new(dec("0.125")).unwrap().cents(), 13);
    }

    #[test]
    fn new_rejects_negative_amounts() {
        for s in ["-1", "-0.01", "-100.50"] {
            assert!(matches!(
                Money::new(dec(s)),
                Err(MoneyError::Negative { .. })
            ));
        }
    }

    #[test]
    fn from_cents_rejects_negative() {
        assert!(Money::from_cents(-1).is_err());
        assert_eq!(Money::from_cents(0).unwrap(), Money::zero());
    }

    #[test]
    fn amount_roundtrips_through_cents() {
        let m = Money::new(dec("12.34")).unwrap();
        assert_eq!(m.amount(), dec("12.34"));
    }

    #[test]
    fn subtract_fails_below_zero() {
        let a = Money::from_cents(500).unwrap();
        let b = Money::from_cents(600).unwrap();
        assert_eq!(a.subtract(a).unwrap(), Money::zero());
        assert!(matches!(
            a.subtract(b),
            Err(MoneyError::NegativeResult { .. })
        ));
    }

    #[test]
    fn divide_rounds_half_away_from_zero() {
        let m = Money::from_cents(333).unwrap();
        assert_eq!(m.divide(2).unwrap().cents(), 167);
        assert!(matches!(m.divide(0), Err(MoneyError::DivisionByZero)));
    }

    #[test]
    fn percent_of_rounds_half_away_from_zero() {
        let m = Money::from_cents(10000).unwrap();
        assert_eq!(m.percent_of(8000).cents(), 8000);
        assert_eq!(m.percent_of(9000).cents(), 9000);
        // $0.05 at 10% = $0.005, rounds up to a cent
        assert_eq!(Money::from_cents(5).unwrap().percent_of(1000).cents(), 1);
    }

    #[test]
    fn arithmetic_returns_new_values() {
        let a = Money::from_cents(1000).unwrap();
        let b = Money::from_cents(250).unwrap();
        assert_eq!((a + b).cents(), 1250);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!(a.cents(), 1000);
    }

    #[test]
    fn sum_of_amounts() {
        let total: Money = [100, 200, 300]
            .into_iter()
            .map(|c| Money::from_cents(c).unwrap())
            .sum();
        assert_eq!(total.cents(), 600);
    }

    #[test]
    fn comparisons_follow_cents() {
        assert!(Money::from_cents(100).unwrap() < Money::from_cents(200).unwrap());
        assert_eq!(
            Money::new(dec("1.00")).unwrap(),
            Money::from_cents(100).unwrap()
        );
    }

    #[test]
    fn display_formats_dollars_and_cents() {
        assert_eq!(Money::from_cents(1234).unwrap().to_string(), "$12.34");
        assert_eq!(Money::zero().to_string(), "$0.00");
        assert_eq!(Money::from_cents(5).unwrap().to_string(), "$0.05");
    }
}
