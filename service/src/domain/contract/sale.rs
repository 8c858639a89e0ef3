//! [`Sale`] [`Contract`] definition.

use std::num::NonZeroU32;

use common::{annuity, Money};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::domain::{vehicle, Vehicle};
#[cfg(doc)]
use crate::domain::Contract;

use super::{CustomerEmail, CustomerName, Date, Details, Id};

/// Share of the [`vehicle::Price`] charged as sales tax.
pub const SALES_TAX_RATE: Decimal = dec!(0.05);

/// Flat fee for recording a [`Sale`].
pub const RECORDING_FEE: Decimal = dec!(100.00);

/// [`vehicle::Price`] from which the [`HIGH_PROCESSING_FEE`] and the long-term
/// financing apply.
pub const PRICE_THRESHOLD: Decimal = dec!(10000.00);

/// Processing fee of a [`Sale`] below the [`PRICE_THRESHOLD`].
pub const LOW_PROCESSING_FEE: Decimal = dec!(295.00);

/// Processing fee of a [`Sale`] at or above the [`PRICE_THRESHOLD`].
pub const HIGH_PROCESSING_FEE: Decimal = dec!(495.00);

/// Yearly interest rate of financing a [`Sale`] at or above the
/// [`PRICE_THRESHOLD`].
pub const LONG_TERM_RATE: Decimal = dec!(0.0425);

/// Number of monthly payments financing a [`Sale`] at or above the
/// [`PRICE_THRESHOLD`].
pub const LONG_TERM_MONTHS: u32 = 48;

/// Yearly interest rate of financing a [`Sale`] below the
/// [`PRICE_THRESHOLD`].
pub const SHORT_TERM_RATE: Decimal = dec!(0.0525);

/// Number of monthly payments financing a [`Sale`] below the
/// [`PRICE_THRESHOLD`].
pub const SHORT_TERM_MONTHS: u32 = 24;

/// [`Contract`] about a customer buying a [`Vehicle`].
#[derive(Clone, Debug)]
pub struct Sale {
    /// [`Details`] of this [`Sale`].
    details: Details,

    /// Indicator whether this [`Sale`] is paid by monthly installments.
    financed: bool,

    /// [`Pricing`] of this [`Sale`].
    pricing: Pricing,
}

impl Sale {
    /// Signs a new [`Sale`] of the provided [`Vehicle`].
    #[must_use]
    pub fn new(
        date: Date,
        customer_name: CustomerName,
        customer_email: CustomerEmail,
        vehicle: Vehicle,
        financed: bool,
    ) -> Self {
        let pricing = Pricing::new(vehicle.price, financed);
        Self {
            details: Details {
                id: None,
                date,
                customer_name,
                customer_email,
                vehicle,
            },
            financed,
            pricing,
        }
    }

    /// Returns [`Details`] of this [`Sale`].
    #[must_use]
    pub fn details(&self) -> &Details {
        &self.details
    }

    /// Indicates whether this [`Sale`] is paid by monthly installments.
    #[must_use]
    pub fn is_financed(&self) -> bool {
        self.financed
    }

    /// Returns [`Pricing`] of this [`Sale`].
    #[must_use]
    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    /// Returns a copy of this [`Sale`] with the provided [`Id`] assigned.
    #[must_use]
    pub fn with_id(mut self, id: Id) -> Self {
        self.details.id = Some(id);
        self
    }
}

/// Amounts of a [`Sale`] derived from the [`vehicle::Price`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pricing {
    /// Sales tax, rounded to whole cents.
    pub sales_tax: Money,

    /// Flat recording fee.
    pub recording_fee: Money,

    /// Processing fee, depending on the [`vehicle::Price`].
    pub processing_fee: Money,

    /// Price together with the tax and all the fees.
    pub total_price: Money,

    /// Monthly installment, or zero if not financed.
    pub monthly_payment: Money,
}

impl Pricing {
    /// Calculates [`Pricing`] of a [`Sale`] for the provided
    /// [`vehicle::Price`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn new(price: vehicle::Price, financed: bool) -> Self {
        let price = price.money();
        let is_expensive = price.amount() >= PRICE_THRESHOLD;

        let sales_tax = (price * SALES_TAX_RATE).round_cents();
        let recording_fee = Money::new(RECORDING_FEE);
        let processing_fee = Money::new(if is_expensive {
            HIGH_PROCESSING_FEE
        } else {
            LOW_PROCESSING_FEE
        });
        let total_price = price + sales_tax + recording_fee + processing_fee;

        let monthly_payment = if financed {
            let (rate, months) = if is_expensive {
                (LONG_TERM_RATE, LONG_TERM_MONTHS)
            } else {
                (SHORT_TERM_RATE, SHORT_TERM_MONTHS)
            };
            let monthly_rate = (rate / Decimal::from(12))
                .round_dp_with_strategy(
                    10,
                    RoundingStrategy::MidpointAwayFromZero,
                );
            let months = NonZeroU32::new(months).expect("positive term");

            // Neither negative nor overflowing for a bounded `Price`.
            annuity(total_price, monthly_rate, months).expect("infallible")
        } else {
            Money::ZERO
        };

        Self {
            sales_tax,
            recording_fee,
            processing_fee,
            total_price,
            monthly_payment,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::Money;
    use rust_decimal_macros::dec;

    use crate::domain::{
        contract::{CustomerEmail, CustomerName, Date},
        vehicle,
        Vehicle,
    };

    use super::{Pricing, Sale};

    fn price(s: &str) -> vehicle::Price {
        vehicle::Price::from_str(s).unwrap()
    }

    fn money(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    #[test]
    fn financed_expensive_vehicle() {
        let p = Pricing::new(price("31000.00"), true);

        assert_eq!(p.sales_tax, money("1550.00"));
        assert_eq!(p.recording_fee, money("100.00"));
        assert_eq!(p.processing_fee, money("495.00"));
        assert_eq!(p.total_price, money("33145.00"));
        assert_eq!(p.monthly_payment, money("752.10"));
        assert_eq!(p.total_price.to_string(), "33145.00");
    }

    #[test]
    fn financed_cheap_vehicle() {
        let p = Pricing::new(price("9999.99"), true);

        assert_eq!(p.sales_tax, money("500.00"));
        assert_eq!(p.processing_fee, money("295.00"));
        assert_eq!(p.total_price, money("10894.99"));
        assert_eq!(p.monthly_payment, money("479.20"));
    }

    #[test]
    fn threshold_price_is_expensive() {
        let p = Pricing::new(price("10000.00"), true);

        assert_eq!(p.sales_tax, money("500.00"));
        assert_eq!(p.processing_fee, money("495.00"));
        assert_eq!(p.total_price, money("11095.00"));
        assert_eq!(p.monthly_payment, money("251.76"));
    }

    #[test]
    fn not_financed_has_no_monthly_payment() {
        let p = Pricing::new(price("5000"), false);

        assert_eq!(p.sales_tax, money("250.00"));
        assert_eq!(p.processing_fee, money("295.00"));
        assert_eq!(p.total_price, money("5645.00"));
        assert_eq!(p.monthly_payment, Money::ZERO);
        assert_eq!(p.monthly_payment.to_string(), "0.00");
    }

    #[test]
    fn total_sums_price_tax_and_fees() {
        for s in ["0", "0.01", "123.45", "9999.99", "10000", "22000.00"] {
            let p = Pricing::new(price(s), false);

            assert_eq!(
                p.total_price,
                money(s) + p.sales_tax + p.recording_fee + p.processing_fee,
                "price {s}",
            );
            assert_eq!(p.sales_tax, (money(s) * dec!(0.05)).round_cents());
        }
    }

    #[test]
    fn sale_keeps_terms() {
        let vehicle = Vehicle::placeholder(vehicle::Vin::new("V1").unwrap());
        let sale = Sale::new(
            Date::from_ymd(2024, 5, 1).unwrap(),
            CustomerName::new("Jane Doe").unwrap(),
            CustomerEmail::new("jane@example.com").unwrap(),
            Vehicle {
                price: price("22000.00"),
                ..vehicle
            },
            true,
        );

        assert!(sale.is_financed());
        assert!(sale.details().id.is_none());
        assert_eq!(sale.pricing().total_price, money("23695.00"));
        assert_eq!(sale.pricing().monthly_payment, money("537.67"));
    }
}
