//! [`Money`]-related definitions.

use std::{iter::Sum, ops, str::FromStr};

use derive_more::Display;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::{Decimal, RoundingStrategy};

/// Amount of money in the dealership's single currency.
///
/// Keeps the scale of the [`Decimal`] it was created from, so `100.00` is
/// displayed as `100.00` and `0.5` as `0.5`.
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Money(Decimal);

impl Money {
    /// Zero [`Money`] amount with two decimal places (`0.00`).
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, 2));

    /// Number of decimal places [`Money`] is rounded to.
    pub const CENTS_SCALE: u32 = 2;

    /// Creates a new [`Money`] amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Returns the [`Decimal`] amount of this [`Money`].
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Rounds this [`Money`] to whole cents, rounding midpoints away from
    /// zero.
    ///
    /// The result always has exactly [`Money::CENTS_SCALE`] decimal places.
    #[must_use]
    pub fn round_cents(self) -> Self {
        let mut amount = self.0.round_dp_with_strategy(
            Self::CENTS_SCALE,
            RoundingStrategy::MidpointAwayFromZero,
        );
        amount.rescale(Self::CENTS_SCALE);
        Self(amount)
    }

    /// Indicates whether this [`Money`] amount is below zero.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl ops::Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl ops::Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl ops::Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, m| acc + m)
    }
}

impl FromStr for Money {
    type Err = &'static str;

    /// Parses [`Money`] from its plain decimal notation (`1234.50`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty amount");
        }
        Decimal::from_str_exact(s)
            .map(Self)
            .map_err(|_| "invalid amount")
    }
}
