//! [`Lease`] [`Contract`] definition.

use std::num::NonZeroU32;

use common::{annuity, Money, Precision};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::{vehicle, Vehicle};
#[cfg(doc)]
use crate::domain::Contract;

use super::{CustomerEmail, CustomerName, Date, Details, Id};

/// Share of the [`vehicle::Price`] expected to remain at the end of a
/// [`Lease`].
pub const END_VALUE_RATE: Decimal = dec!(0.50);

/// Share of the [`vehicle::Price`] charged as a lease fee.
pub const LEASE_FEE_RATE: Decimal = dec!(0.07);

/// Flat fee for recording a [`Lease`].
pub const RECORDING_FEE: Decimal = dec!(100.00);

/// Yearly interest rate of a [`Lease`].
pub const YEARLY_RATE: Decimal = dec!(0.04);

/// Number of monthly payments of a [`Lease`].
pub const TERM_MONTHS: u32 = 36;

/// Precision of [`Lease`] calculations.
const MC: Precision = Precision::DECIMAL64;

/// [`Contract`] about a customer leasing a [`Vehicle`].
#[derive(Clone, Debug)]
pub struct Lease {
    /// [`Details`] of this [`Lease`].
    details: Details,

    /// [`Pricing`] of this [`Lease`].
    pricing: Pricing,
}

impl Lease {
    /// Signs a new [`Lease`] of the provided [`Vehicle`].
    #[must_use]
    pub fn new(
        date: Date,
        customer_name: CustomerName,
        customer_email: CustomerEmail,
        vehicle: Vehicle,
    ) -> Self {
        let pricing = Pricing::new(vehicle.price);
        Self {
            details: Details {
                id: None,
                date,
                customer_name,
                customer_email,
                vehicle,
            },
            pricing,
        }
    }

    /// Restores a [`Lease`] persisted without its [`Vehicle`] details.
    ///
    /// The [`Vehicle`] becomes a [`Vehicle::placeholder()`], and the persisted
    /// totals are kept as is, while the amounts derived from the unknown
    /// [`vehicle::Price`] are zero.
    #[must_use]
    pub(crate) fn restore(
        date: Date,
        customer_name: CustomerName,
        customer_email: CustomerEmail,
        vin: vehicle::Vin,
        total_price: Money,
        monthly_payment: Money,
    ) -> Self {
        Self {
            details: Details {
                id: None,
                date,
                customer_name,
                customer_email,
                vehicle: Vehicle::placeholder(vin),
            },
            pricing: Pricing {
                end_value: Money::ZERO,
                lease_fee: Money::ZERO,
                recording_fee: Money::new(RECORDING_FEE),
                total_price,
                monthly_payment,
            },
        }
    }

    /// Returns [`Details`] of this [`Lease`].
    #[must_use]
    pub fn details(&self) -> &Details {
        &self.details
    }

    /// Returns [`Pricing`] of this [`Lease`].
    #[must_use]
    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    /// Returns a copy of this [`Lease`] with the provided [`Id`] assigned.
    #[must_use]
    pub fn with_id(mut self, id: Id) -> Self {
        self.details.id = Some(id);
        self
    }
}

/// Amounts of a [`Lease`] derived from the [`vehicle::Price`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pricing {
    /// Expected value of the [`Vehicle`] at the end of the term.
    pub end_value: Money,

    /// Lease fee.
    pub lease_fee: Money,

    /// Flat recording fee.
    pub recording_fee: Money,

    /// Sum of the end value and the fees.
    pub total_price: Money,

    /// Monthly installment amortizing the total price over the term.
    pub monthly_payment: Money,
}

impl Pricing {
    /// Calculates [`Pricing`] of a [`Lease`] for the provided
    /// [`vehicle::Price`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn new(price: vehicle::Price) -> Self {
        let price = price.money().amount();

        // Bounded `Price` never overflows 16 significant digits arithmetic.
        let end_value = MC.mul(price, END_VALUE_RATE).expect("infallible");
        let lease_fee = MC.mul(price, LEASE_FEE_RATE).expect("infallible");
        let total_price = MC
            .add(end_value, lease_fee)
            .and_then(|v| MC.add(v, RECORDING_FEE))
            .expect("infallible");

        let monthly_rate =
            MC.div(YEARLY_RATE, Decimal::from(12)).expect("infallible");
        let months = NonZeroU32::new(TERM_MONTHS).expect("positive term");
        let monthly_payment =
            annuity(Money::new(total_price), monthly_rate, months)
                .expect("infallible");

        Self {
            end_value: Money::new(end_value),
            lease_fee: Money::new(lease_fee),
            recording_fee: Money::new(RECORDING_FEE),
            total_price: Money::new(total_price),
            monthly_payment,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::Money;

    use crate::domain::{
        contract::{CustomerEmail, CustomerName, Date},
        vehicle,
    };

    use super::{Lease, Pricing};

    fn price(s: &str) -> vehicle::Price {
        vehicle::Price::from_str(s).unwrap()
    }

    fn money(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    #[test]
    fn prices_lease() {
        for (p, end, fee, total, monthly) in [
            ("31000.00", "15500", "2170", "17770", "524.64"),
            ("45000.00", "22500", "3150", "25750", "760.24"),
            ("22000.00", "11000", "1540", "12640", "373.18"),
        ] {
            let pricing = Pricing::new(price(p));

            assert_eq!(pricing.end_value, money(end), "price {p}");
            assert_eq!(pricing.lease_fee, money(fee), "price {p}");
            assert_eq!(pricing.recording_fee, money("100.00"), "price {p}");
            assert_eq!(pricing.total_price, money(total), "price {p}");
            assert_eq!(pricing.monthly_payment, money(monthly), "price {p}");
        }
    }

    #[test]
    fn restores_with_placeholder_vehicle() {
        let lease = Lease::restore(
            Date::from_ymd(2024, 5, 1).unwrap(),
            CustomerName::new("Jane Doe").unwrap(),
            CustomerEmail::new("jane@example.com").unwrap(),
            vehicle::Vin::new("V1").unwrap(),
            money("17770.0000"),
            money("524.64"),
        );

        let vehicle = &lease.details().vehicle;
        assert_eq!(vehicle.vin.as_str(), "V1");
        assert_eq!(vehicle.price, vehicle::Price::ZERO);
        assert_eq!(lease.pricing().end_value, Money::ZERO);
        assert_eq!(lease.pricing().lease_fee, Money::ZERO);
        assert_eq!(lease.pricing().total_price.to_string(), "17770.0000");
        assert_eq!(lease.pricing().monthly_payment, money("524.64"));
    }
}
