//! Money value object stored in integer minor units.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// An amount of money in minor units (cents).
///
/// All prices and payment amounts flow through this type so that the
/// `price = quantity * unit_price` freeze never touches floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a non-negative amount from minor units.
    pub fn from_minor(minor: i64) -> Result<Self, ValidationError> {
        if minor < 0 {
            return Err(ValidationError::out_of_range("amount", 0, i64::MAX, minor));
        }
        Ok(Self(minor))
    }

    /// Creates an amount from whole units and cents, e.g. `(12, 50)` is $12.50.
    pub fn from_units(units: i64, cents: i64) -> Result<Self, ValidationError> {
        Self::from_minor(units.saturating_mul(100).saturating_add(cents))
    }

    pub fn minor_units(&self) -> i64 {
        self.0
    }

    /// Multiplies by a quantity, failing on overflow.
    pub fn times(&self, quantity: u32) -> Result<Money, ValidationError> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Money)
            .ok_or_else(|| ValidationError::invalid_format("amount", "amount overflow"))
    }

    /// Plain decimal form without a currency sign, e.g. `"12.50"`.
    pub fn to_decimal_string(&self) -> String {
        format!("{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.to_decimal_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_with_two_decimal_places() {
        assert_eq!(Money::from_minor(1250).unwrap().to_string(), "$12.50");
        assert_eq!(Money::from_minor(5).unwrap().to_string(), "$0.05");
        assert_eq!(Money::ZERO.to_string(), "$0.00");
        assert_eq!(Money::from_minor(1250).unwrap().to_decimal_string(), "12.50");
    }

    #[test]
    fn rejects_negative_amounts() {
        assert!(Money::from_minor(-1).is_err());
    }

    #[test]
    fn times_multiplies_by_quantity() {
        let unit = Money::from_units(20, 0).unwrap();
        assert_eq!(unit.times(3).unwrap().minor_units(), 6000);
    }

    #[test]
    fn times_reports_overflow() {
        let huge = Money::from_minor(i64::MAX).unwrap();
        assert!(huge.times(2).is_err());
    }
}
