//! Level-payment amortization.

use std::num::NonZeroU32;

use derive_more::{Display, Error as StdError};
use rust_decimal::Decimal;

use crate::{Money, Precision};

/// Calculates the level monthly payment amortizing the `principal` over
/// `term_months` at the provided `monthly_rate`:
///
/// ```text
/// payment = principal × r × (1 + r)ⁿ / ((1 + r)ⁿ − 1)
/// ```
///
/// Intermediate values are kept at [`Precision::DECIMAL64`], while the result
/// is rounded to whole cents.
///
/// A zero `monthly_rate` spreads the `principal` evenly over the term. If the
/// denominator still vanishes at the working precision, zero is returned.
///
/// # Errors
///
/// - If the `principal` or the `monthly_rate` is negative.
/// - If the calculation overflows.
pub fn annuity(
    principal: Money,
    monthly_rate: Decimal,
    term_months: NonZeroU32,
) -> Result<Money, Error> {
    const MC: Precision = Precision::DECIMAL64;

    if principal.is_negative() {
        return Err(Error::NegativePrincipal(principal));
    }
    if monthly_rate.is_sign_negative() && !monthly_rate.is_zero() {
        return Err(Error::NegativeRate(monthly_rate));
    }

    let n = Decimal::from(term_months.get());
    if monthly_rate.is_zero() {
        return principal
            .amount()
            .checked_div(n)
            .map(|p| Money::new(p).round_cents())
            .ok_or(Error::Overflow);
    }

    let growth = MC
        .add(Decimal::ONE, monthly_rate)
        .and_then(|base| MC.pow(base, term_months.get()))
        .ok_or(Error::Overflow)?;
    let numerator = MC
        .mul(principal.amount(), monthly_rate)
        .and_then(|v| MC.mul(v, growth))
        .ok_or(Error::Overflow)?;
    let denominator =
        MC.sub(growth, Decimal::ONE).ok_or(Error::Overflow)?;

    if denominator.is_zero() {
        return Ok(Money::ZERO);
    }
    numerator
        .checked_div(denominator)
        .map(|p| Money::new(p).round_cents())
        .ok_or(Error::Overflow)
}

/// Error of calculating an [`annuity`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Principal is below zero.
    #[display("negative principal: {_0}")]
    NegativePrincipal(#[error(not(source))] Money),

    /// Monthly interest rate is below zero.
    #[display("negative monthly rate: {_0}")]
    NegativeRate(#[error(not(source))] Decimal),

    /// Payment doesn't fit into a [`Decimal`].
    #[display("annuity calculation overflowed")]
    Overflow,
}

#[cfg(test)]
mod spec {
    use std::num::NonZeroU32;

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::{Money, Precision};

    use super::{annuity, Error};

    fn months(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn yearly(rate: Decimal) -> Decimal {
        Precision::DECIMAL64.div(rate, dec!(12)).unwrap()
    }

    #[test]
    fn amortizes_principal() {
        assert_eq!(
            annuity(Money::new(dec!(10000)), yearly(dec!(0.05)), months(12))
                .unwrap(),
            Money::new(dec!(856.07)),
        );
        assert_eq!(
            annuity(Money::new(dec!(17770)), yearly(dec!(0.04)), months(36))
                .unwrap(),
            Money::new(dec!(524.64)),
        );
    }

    #[test]
    fn uses_rate_as_given() {
        assert_eq!(
            annuity(Money::new(dec!(33145.00)), dec!(0.0035416667), months(48))
                .unwrap(),
            Money::new(dec!(752.10)),
        );
        assert_eq!(
            annuity(Money::new(dec!(10894.99)), dec!(0.0043750000), months(24))
                .unwrap(),
            Money::new(dec!(479.20)),
        );
    }

    #[test]
    fn rounds_to_cents() {
        let payment =
            annuity(Money::new(dec!(10000)), yearly(dec!(0.05)), months(12))
                .unwrap();

        assert_eq!(payment.amount().scale(), 2);
    }

    #[test]
    fn zero_rate_spreads_evenly() {
        let even =
            annuity(Money::new(dec!(1200)), Decimal::ZERO, months(12)).unwrap();
        assert_eq!(even, Money::new(dec!(100.00)));
        assert_eq!(even.to_string(), "100.00");
        assert_eq!(
            annuity(Money::new(dec!(1000)), Decimal::ZERO, months(3)).unwrap(),
            Money::new(dec!(333.33)),
        );
    }

    #[test]
    fn vanishing_denominator_yields_zero() {
        assert_eq!(
            annuity(Money::new(dec!(1000)), dec!(0.00000000000000000001), months(1)).unwrap(),
            Money::ZERO,
        );
    }

    #[test]
    fn zero_principal_yields_zero() {
        assert_eq!(
            annuity(Money::ZERO, dec!(0.01), months(12)).unwrap(),
            Money::ZERO,
        );
    }

    #[test]
    fn rejects_negative_inputs() {
        assert!(matches!(
            annuity(Money::new(dec!(-1)), dec!(0.01), months(12)),
            Err(Error::NegativePrincipal(_)),
        ));
        assert!(matches!(
            annuity(Money::new(dec!(1000)), dec!(-0.01), months(12)),
            Err(Error::NegativeRate(_)),
        ));
    }

    #[test]
    fn errors_have_no_source() {
        let err = annuity(Money::new(dec!(-1.50)), dec!(0.01), months(12))
            .unwrap_err();

        assert_eq!(err.to_string(), "negative principal: -1.50");
        assert!(std::error::Error::source(&err).is_none());
    }
}
