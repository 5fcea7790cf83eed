//! Fixed-point money values as delivered by the broker API.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TraitError;

const NANOS_PER_UNIT: i64 = 1_000_000_000;

/// A broker quotation: whole units plus billionths.
///
/// `units = 114, nano = 250_000_000` is 114.25.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Quotation {
    /// Whole units
    pub units: i64,
    /// Fractional part in 1e-9 units
    pub nano: i32,
}

impl Quotation {
    /// Create a new quotation.
    pub fn new(units: i64, nano: i32) -> Self {
        Self { units, nano }
    }

    /// Convert from a decimal, truncating below nano precision.
    ///
    /// Returns `None` when the whole part does not fit in `i64`.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        let units = value.trunc();
        let nano = ((value - units) * Decimal::from(NANOS_PER_UNIT)).trunc();
        Some(Self {
            units: units.to_i64()?,
            nano: nano.to_i32()?,
        })
    }

    /// Exact decimal value.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::from(self.units) + Decimal::new(i64::from(self.nano), 9)
    }

    /// Floating-point value used by the analytics.
    pub fn to_f64(&self) -> f64 {
        self.to_decimal().to_f64().unwrap_or(0.0)
    }

    /// Floating-point value of an optional quotation, zero when absent.
    pub fn to_f64_or_zero(value: Option<&Quotation>) -> f64 {
        value.map_or(0.0, Quotation::to_f64)
    }
}

impl TryFrom<Decimal> for Quotation {
    type Error = TraitError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::from_decimal(value)
            .ok_or_else(|| TraitError::InvalidInput(format!("{value} is out of quotation range")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_decimal() {
        assert_eq!(Quotation::new(114, 250_000_000).to_decimal(), dec!(114.25));
        assert_eq!(Quotation::new(0, 1).to_decimal(), dec!(0.000000001));
        assert_eq!(Quotation::new(-3, -500_000_000).to_decimal(), dec!(-3.5));
    }

    #[test]
    fn test_from_decimal() {
        let q = Quotation::from_decimal(dec!(271.125)).unwrap();
        assert_eq!(q, Quotation::new(271, 125_000_000));

        let q = Quotation::try_from(dec!(-0.75)).unwrap();
        assert_eq!(q, Quotation::new(0, -750_000_000));
    }

    #[test]
    fn test_from_decimal_out_of_range() {
        let huge = Decimal::from(i64::MAX) * dec!(1000);
        assert_eq!(Quotation::from_decimal(huge), None);
        assert!(matches!(
            Quotation::try_from(huge),
            Err(TraitError::InvalidInput(_))
        ));
        assert!(Quotation::from_decimal(Decimal::from(i64::MAX)).is_some());
    }

    #[test]
    fn test_to_f64_or_zero() {
        assert_eq!(Quotation::to_f64_or_zero(None), 0.0);
        let q = Quotation::new(100, 0);
        assert_eq!(Quotation::to_f64_or_zero(Some(&q)), 100.0);
    }
}
