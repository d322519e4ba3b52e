//! Money value object.
//!
//! Amounts are held as a non-negative count of the smallest currency unit
//! (rupiah, cents). Floating point never touches a price.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Non-negative monetary amount in the smallest currency unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates an amount, rejecting negative values.
    pub fn new(amount: i64) -> Result<Self, ValidationError> {
        if amount < 0 {
            return Err(ValidationError::out_of_range("amount", 0, i64::MAX, amount));
        }
        Ok(Self(amount))
    }

    pub fn amount(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Subtracts, flooring the result at zero.
    pub fn saturating_sub(self, other: Money) -> Money {
        Money((self.0 - other.0).max(0))
    }

    /// Integer division truncating toward zero. A zero divisor yields zero.
    pub fn div_truncating(self, divisor: u32) -> Money {
        if divisor == 0 {
            return Money::ZERO;
        }
        Money(self.0 / i64::from(divisor))
    }

    /// Multiplies by a whole count, saturating at `i64::MAX`.
    pub fn saturating_mul(self, factor: u32) -> Money {
        Money(self.0.saturating_mul(i64::from(factor)))
    }
}

impl TryFrom<i64> for Money {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Money::new(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_amounts() {
        assert!(Money::new(-1).is_err());
        assert!(Money::new(0).is_ok());
    }

    #[test]
    fn division_truncates() {
        let m = Money::new(100_000).unwrap();
        assert_eq!(m.div_truncating(30).amount(), 3_333);
    }

    #[test]
    fn division_by_zero_is_zero() {
        assert_eq!(Money::new(500).unwrap().div_truncating(0), Money::ZERO);
    }

    #[test]
    fn subtraction_floors_at_zero() {
        let small = Money::new(10).unwrap();
        let large = Money::new(25).unwrap();
        assert_eq!(small.saturating_sub(large), Money::ZERO);
        assert_eq!(large.saturating_sub(small).amount(), 15);
    }

    #[test]
    fn multiplication_saturates() {
        let m = Money::new(i64::MAX / 2).unwrap();
        assert_eq!(m.saturating_mul(4).amount(), i64::MAX);
    }

    #[test]
    fn deserializing_negative_fails() {
        assert!(serde_json::from_str::<Money>("-5").is_err());
        assert_eq!(serde_json::from_str::<Money>("250000").unwrap().amount(), 250_000);
    }
}
