//! [`Precision`] of decimal arithmetic.

use rust_decimal::{Decimal, RoundingStrategy};

/// Arithmetic context limiting results to a number of significant digits,
/// rounding midpoints away from zero.
///
/// Every operation rounds its exact result once, so a chain of operations
/// accumulates rounding the same way on every platform.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Precision {
    /// Number of significant digits kept by this [`Precision`].
    digits: u32,
}

impl Precision {
    /// 16 significant digits, the precision of an IEEE 754 `decimal64`.
    pub const DECIMAL64: Self = Self { digits: 16 };

    /// Maximum number of significant digits a [`Decimal`] is able to carry.
    pub const MAX_DIGITS: u32 = 28;

    /// Creates a new [`Precision`] of the provided significant `digits`.
    ///
    /// [`None`] is returned if `digits` is zero or above [`MAX_DIGITS`].
    ///
    /// [`MAX_DIGITS`]: Self::MAX_DIGITS
    #[must_use]
    pub const fn new(digits: u32) -> Option<Self> {
        if digits == 0 || digits > Self::MAX_DIGITS {
            None
        } else {
            Some(Self { digits })
        }
    }

    /// Returns the number of significant digits of this [`Precision`].
    #[must_use]
    pub const fn digits(self) -> u32 {
        self.digits
    }

    /// Rounds the provided `value` to this [`Precision`].
    #[must_use]
    pub fn round(self, value: Decimal) -> Decimal {
        let significant = value
            .mantissa()
            .unsigned_abs()
            .checked_ilog10()
            .map_or(1, |d| d + 1);
        if significant <= self.digits {
            return value;
        }
        // `None` is only possible when rounding up overflows `Decimal::MAX`,
        // which already carries fewer digits than any `Precision`.
        value
            .round_sf_with_strategy(
                self.digits,
                RoundingStrategy::MidpointAwayFromZero,
            )
            .unwrap_or(value)
    }

    /// Adds `rhs` to `lhs`.
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn add(self, lhs: Decimal, rhs: Decimal) -> Option<Decimal> {
        lhs.checked_add(rhs).map(|v| self.round(v))
    }

    /// Subtracts `rhs` from `lhs`.
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn sub(self, lhs: Decimal, rhs: Decimal) -> Option<Decimal> {
        lhs.checked_sub(rhs).map(|v| self.round(v))
    }

    /// Multiplies `lhs` by `rhs`.
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn mul(self, lhs: Decimal, rhs: Decimal) -> Option<Decimal> {
        lhs.checked_mul(rhs).map(|v| self.round(v))
    }

    /// Divides `lhs` by `rhs`.
    ///
    /// [`None`] is returned on overflow or division by zero.
    #[must_use]
    pub fn div(self, lhs: Decimal, rhs: Decimal) -> Option<Decimal> {
        lhs.checked_div(rhs).map(|v| self.round(v))
    }

    /// Raises `base` to the power of `exp`.
    ///
    /// Intermediate products are kept with `digits(exp) + 1` extra digits,
    /// and only the final result is rounded to this [`Precision`].
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn pow(self, base: Decimal, exp: u32) -> Option<Decimal> {
        if exp == 0 {
            return Some(Decimal::ONE);
        }

        let exp_digits = exp.ilog10() + 1;
        let work = Self {
            digits: (self.digits + exp_digits + 1).min(Self::MAX_DIGITS),
        };

        let mut acc = Decimal::ONE;
        for bit in (0..u32::BITS - exp.leading_zeros()).rev() {
            acc = work.mul(acc, acc)?;
            if exp & (1 << bit) != 0 {
                acc = work.mul(acc, base)?;
            }
        }
        Some(self.round(acc))
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal_macros::dec;

    use super::Precision;

    const P16: Precision = Precision::DECIMAL64;

    #[test]
    fn rejects_invalid_digits() {
        assert!(Precision::new(0).is_none());
        assert!(Precision::new(29).is_none());
        assert_eq!(Precision::new(16), Some(P16));
    }

    #[test]
    fn rounds_to_significant_digits() {
        assert_eq!(P16.div(dec!(0.04), dec!(12)), Some(dec!(0.003333333333333333)));
        assert_eq!(P16.div(dec!(2), dec!(3)), Some(dec!(0.6666666666666667)));
        assert_eq!(
            Precision::new(3).unwrap().round(dec!(12.35)),
            dec!(12.4),
        );
        assert_eq!(
            Precision::new(2).unwrap().round(dec!(-0.125)),
            dec!(-0.13),
        );
        assert_eq!(P16.round(dec!(0)), dec!(0));
    }

    #[test]
    fn keeps_exact_results() {
        assert_eq!(P16.mul(dec!(31000.00), dec!(0.50)), Some(dec!(15500)));
        assert_eq!(P16.add(dec!(15500), dec!(2270)), Some(dec!(17770)));
        assert_eq!(P16.sub(dec!(1.5), dec!(1)), Some(dec!(0.5)));
    }

    #[test]
    fn keeps_scale_of_exact_results() {
        let end_value = P16.mul(dec!(31000.00), dec!(0.50)).unwrap();
        assert_eq!(end_value.to_string(), "15500.0000");

        let total = P16
            .add(end_value, dec!(2170.0000))
            .and_then(|v| P16.add(v, dec!(100.00)))
            .unwrap();
        assert_eq!(total.to_string(), "17770.0000");

        assert_eq!(P16.round(dec!(0.000)).to_string(), "0.000");
        assert_eq!(P16.round(dec!(-12.50)).to_string(), "-12.50");
    }

    #[test]
    fn pow() {
        assert_eq!(P16.pow(dec!(1.5), 0), Some(dec!(1)));
        assert_eq!(P16.pow(dec!(2), 10), Some(dec!(1024)));
        assert_eq!(P16.pow(dec!(1.1), 2), Some(dec!(1.21)));
        assert_eq!(P16.pow(dec!(-2), 3), Some(dec!(-8)));
        assert_eq!(
            P16.pow(dec!(1.05), 12),
            Some(dec!(1.795856326022129)),
        );
    }

    #[test]
    fn pow_overflows() {
        assert_eq!(P16.pow(dec!(10), 40), None);
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(P16.div(dec!(1), dec!(0)), None);
    }
}
