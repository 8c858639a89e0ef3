//! Line formats of the [`Journal`] files.
//!
//! [`Journal`]: super::Journal

use std::str::FromStr;

use common::Money;
use derive_more::{Display, Error as StdError};

use crate::domain::{
    contract::{self, Lease, Sale},
    vehicle, Contract, Vehicle,
};

/// Separator of the fields in a line.
const SEPARATOR: char = '|';

/// Number of fields in an inventory line.
const VEHICLE_FIELDS: usize = 9;

/// Minimal number of fields in a [`Sale`] record.
const SALE_FIELDS: usize = 18;

/// Minimal number of fields in a [`Lease`] record carrying the whole
/// [`Vehicle`].
const DETAILED_LEASE_FIELDS: usize = 12;

/// Number of fields in a [`Lease`] record carrying the [`vehicle::Vin`] only.
const SHORT_LEASE_FIELDS: usize = 7;

/// Encodes the provided [`Vehicle`] as an inventory line:
/// `id|vin|year|make|model|type|color|odometer|price`.
pub(super) fn encode_vehicle(vehicle: &Vehicle) -> String {
    let Vehicle {
        id,
        vin,
        year,
        make,
        model,
        kind,
        color,
        odometer,
        price,
    } = vehicle;
    let id = id.map(|id| id.to_string()).unwrap_or_default();
    format!(
        "{id}|{vin}|{year}|{make}|{model}|{kind}|{color}|{odometer}|{price}",
    )
}

/// Decodes a [`Vehicle`] out of the provided inventory line.
///
/// An empty `id` field decodes into a [`Vehicle`] without [`vehicle::Id`].
///
/// # Errors
///
/// If the line is malformed.
pub(super) fn decode_vehicle(line: &str) -> Result<Vehicle, Error> {
    let f = split(line);
    if f.len() != VEHICLE_FIELDS {
        return Err(Error::FieldsCount {
            expected: VEHICLE_FIELDS,
            found: f.len(),
        });
    }

    let id = match f[0].trim() {
        "" => None,
        id => Some(parse("id", id)?),
    };
    let vehicle = vehicle_at(&f, 1)?;
    Ok(match id {
        Some(id) => vehicle.with_id(id),
        None => vehicle,
    })
}

/// Encodes the provided [`Contract`] as a contract record.
///
/// A [`Sale`] is encoded with its [`Vehicle`] and [`sale::Pricing`]:
/// `SALE|yyyyMMdd|name|email|vin|year|make|model|type|color|odometer|price|`
/// `tax|recording fee|processing fee|total|YES or NO|monthly payment`.
///
/// A [`Lease`] keeps the [`vehicle::Vin`] and totals only:
/// `yyyy-MM-dd|LEASE|name|email|vin|total|monthly payment`.
///
/// [`sale::Pricing`]: contract::sale::Pricing
pub(super) fn encode_contract(contract: &Contract) -> String {
    match contract {
        Contract::Sale(sale) => {
            let contract::Details {
                date,
                customer_name,
                customer_email,
                vehicle,
                ..
            } = sale.details();
            let Vehicle {
                vin,
                year,
                make,
                model,
                kind,
                color,
                odometer,
                price,
                ..
            } = vehicle;
            let contract::sale::Pricing {
                sales_tax,
                recording_fee,
                processing_fee,
                total_price,
                monthly_payment,
            } = sale.pricing();
            let financed = if sale.is_financed() { "YES" } else { "NO" };
            format!(
                "{}|{}|{customer_name}|{customer_email}|{vin}|{year}|{make}|\
                 {model}|{kind}|{color}|{odometer}|{price}|{sales_tax}|\
                 {recording_fee}|{processing_fee}|{total_price}|{financed}|\
                 {monthly_payment}",
                contract::Kind::Sale,
                date.to_compact(),
            )
        }
        Contract::Lease(lease) => {
            let contract::Details {
                date,
                customer_name,
                customer_email,
                vehicle,
                ..
            } = lease.details();
            let contract::lease::Pricing {
                total_price,
                monthly_payment,
                ..
            } = lease.pricing();
            format!(
                "{}|{}|{customer_name}|{customer_email}|{}|{total_price}|\
                 {monthly_payment}",
                date.to_iso(),
                contract::Kind::Lease,
                vehicle.vin,
            )
        }
    }
}

/// Decodes a [`Contract`] out of the provided contract record.
///
/// Records starting with a [`contract::Kind`] carry the whole [`Vehicle`], so
/// their [`Contract`] is signed anew, recomputing its pricing. A short
/// [`Lease`] record is restored with a [`Vehicle::placeholder()`] and its
/// persisted totals.
///
/// # Errors
///
/// If the record is malformed.
pub(super) fn decode_contract(line: &str) -> Result<Contract, Error> {
    let f = split(line);
    if f.len() < 2 {
        return Err(Error::FieldsCount {
            expected: 2,
            found: f.len(),
        });
    }

    if let Ok(kind) = contract::Kind::from_str(f[0].trim()) {
        return match kind {
            contract::Kind::Sale => decode_sale(&f).map(Into::into),
            contract::Kind::Lease => decode_detailed_lease(&f).map(Into::into),
        };
    }
    if contract::Kind::from_str(f[1].trim()) == Ok(contract::Kind::Lease) {
        return decode_short_lease(&f).map(Into::into);
    }
    Err(Error::UnknownKind(f[0].to_owned()))
}

/// Decodes a [`Sale`] out of the provided record fields.
fn decode_sale(f: &[&str]) -> Result<Sale, Error> {
    expect_at_least(f, SALE_FIELDS)?;
    let financed = f[16].trim().eq_ignore_ascii_case("YES");
    Ok(Sale::new(
        parse("date", f[1])?,
        parse("customer_name", f[2])?,
        parse("customer_email", f[3])?,
        vehicle_at(f, 4)?,
        financed,
    ))
}

/// Decodes a [`Lease`] out of the provided record fields carrying the whole
/// [`Vehicle`].
fn decode_detailed_lease(f: &[&str]) -> Result<Lease, Error> {
    expect_at_least(f, DETAILED_LEASE_FIELDS)?;
    Ok(Lease::new(
        parse("date", f[1])?,
        parse("customer_name", f[2])?,
        parse("customer_email", f[3])?,
        vehicle_at(f, 4)?,
    ))
}

/// Decodes a [`Lease`] out of the provided record fields carrying the
/// [`vehicle::Vin`] only.
fn decode_short_lease(f: &[&str]) -> Result<Lease, Error> {
    if f.len() != SHORT_LEASE_FIELDS {
        return Err(Error::FieldsCount {
            expected: SHORT_LEASE_FIELDS,
            found: f.len(),
        });
    }
    Ok(Lease::restore(
        parse("date", f[0])?,
        parse("customer_name", f[2])?,
        parse("customer_email", f[3])?,
        parse("vin", f[4])?,
        parse::<Money>("total_price", f[5])?.round_cents(),
        parse::<Money>("monthly_payment", f[6])?.round_cents(),
    ))
}

/// Decodes a [`Vehicle`] out of the 8 fields starting at the provided
/// `offset`: `vin|year|make|model|type|color|odometer|price`.
fn vehicle_at(f: &[&str], offset: usize) -> Result<Vehicle, Error> {
    let f = &f[offset..];
    Ok(Vehicle::new(
        parse("vin", f[0])?,
        parse("year", f[1])?,
        parse("make", f[2])?,
        parse("model", f[3])?,
        parse("type", f[4])?,
        parse("color", f[5])?,
        parse("odometer", f[6])?,
        parse("price", f[7])?,
    ))
}

/// Splits the provided `line` into its fields.
fn split(line: &str) -> Vec<&str> {
    line.trim_end_matches(['\r', '\n']).split(SEPARATOR).collect()
}

/// Checks that there are at least `expected` fields.
fn expect_at_least(f: &[&str], expected: usize) -> Result<(), Error> {
    if f.len() < expected {
        return Err(Error::FieldsCount {
            expected,
            found: f.len(),
        });
    }
    Ok(())
}

/// Parses the provided `value` of the `field`.
fn parse<T: FromStr>(field: &'static str, value: &str) -> Result<T, Error> {
    value.trim().parse().map_err(|_| Error::InvalidField {
        field,
        value: value.to_owned(),
    })
}

/// Error of decoding a [`Journal`] line.
///
/// [`Journal`]: super::Journal
#[derive(Clone, Debug, Display, Eq, PartialEq, StdError)]
pub enum Error {
    /// Line has unexpected number of fields.
    #[display("expected {expected} fields, found {found}")]
    FieldsCount {
        /// Expected number of fields.
        expected: usize,

        /// Actual number of fields.
        found: usize,
    },

    /// Field has invalid value.
    #[display("invalid `{field}` field: `{value}`")]
    InvalidField {
        /// Name of the field.
        field: &'static str,

        /// Value of the field.
        value: String,
    },

    /// Record of unknown [`contract::Kind`].
    #[display("unknown record kind `{_0}`")]
    UnknownKind(#[error(not(source))] String),
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::Money;

    use crate::domain::{
        contract::{self, CustomerEmail, CustomerName, Lease, Sale},
        vehicle, Contract, Vehicle,
    };

    use super::{
        decode_contract, decode_vehicle, encode_contract, encode_vehicle,
        Error,
    };

    fn rav4() -> Vehicle {
        Vehicle::new(
            vehicle::Vin::new("V1").unwrap(),
            vehicle::Year::new(2022).unwrap(),
            vehicle::Make::new("Toyota").unwrap(),
            vehicle::Model::new("RAV4").unwrap(),
            vehicle::Kind::Suv,
            vehicle::Color::new("Blue").unwrap(),
            vehicle::Odometer::from(25_000),
            vehicle::Price::from_str("31000.00").unwrap(),
        )
    }

    fn date() -> contract::Date {
        contract::Date::from_ymd(2024, 3, 15).unwrap()
    }

    fn name() -> CustomerName {
        CustomerName::new("Jane Doe").unwrap()
    }

    fn email() -> CustomerEmail {
        CustomerEmail::new("jane@example.com").unwrap()
    }

    #[test]
    fn encodes_vehicle() {
        let v = rav4();
        assert_eq!(
            encode_vehicle(&v),
            "|V1|2022|Toyota|RAV4|SUV|Blue|25000|31000.00",
        );

        let id = vehicle::Id::new();
        let line = encode_vehicle(&v.clone().with_id(id));
        assert_eq!(
            line,
            format!("{id}|V1|2022|Toyota|RAV4|SUV|Blue|25000|31000.00"),
        );

        let decoded = decode_vehicle(&line).unwrap();
        assert_eq!(decoded.id, Some(id));
        assert_eq!(decoded.kind, vehicle::Kind::Suv);
        assert_eq!(decoded.price, v.price);
    }

    #[test]
    fn rejects_malformed_vehicle() {
        assert_eq!(
            decode_vehicle("|V1|2022|Toyota|RAV4|SUV|Blue|25000").unwrap_err(),
            Error::FieldsCount {
                expected: 9,
                found: 8,
            },
        );
        assert_eq!(
            decode_vehicle("|V1|2022|Toyota|RAV4|BOAT|Blue|25000|31000.00")
                .unwrap_err(),
            Error::InvalidField {
                field: "type",
                value: "BOAT".into(),
            },
        );
        assert!(
            decode_vehicle("|V1|1200|Toyota|RAV4|SUV|Blue|25000|31000.00")
                .is_err(),
        );
        assert!(
            decode_vehicle("|V1|2022|Toyota|RAV4|SUV|Blue|-5|31000.00")
                .is_err(),
        );
        assert!(
            decode_vehicle("|V1|2022|Toyota|RAV4|SUV|Blue|25000|-1.00")
                .is_err(),
        );
    }

    #[test]
    fn encodes_sale() {
        let sale =
            Contract::from(Sale::new(date(), name(), email(), rav4(), true));

        assert_eq!(
            encode_contract(&sale),
            "SALE|20240315|Jane Doe|jane@example.com|V1|2022|Toyota|RAV4|SUV|\
             Blue|25000|31000.00|1550.00|100.00|495.00|33145.00|YES|752.10",
        );
    }

    #[test]
    fn decodes_sale_recomputing_pricing() {
        let line = "SALE|20240315|Jane Doe|jane@example.com|V1|2022|Toyota|\
                    RAV4|suv|Blue|25000|31000.00|0|0|0|0|yes|0";

        let Contract::Sale(sale) = decode_contract(line).unwrap() else {
            panic!("expected `Sale`");
        };
        assert!(sale.is_financed());
        assert_eq!(sale.details().date, date());
        assert_eq!(sale.details().vehicle.vin.as_str(), "V1");
        assert_eq!(
            sale.pricing().total_price,
            Money::from_str("33145.00").unwrap(),
        );
        assert_eq!(
            sale.pricing().monthly_payment,
            Money::from_str("752.10").unwrap(),
        );
    }

    #[test]
    fn encodes_lease_shortly() {
        let lease =
            Contract::from(Lease::new(date(), name(), email(), rav4()));

        let line = encode_contract(&lease);
        assert_eq!(
            line,
            "2024-03-15|LEASE|Jane Doe|jane@example.com|V1|17770.0000|524.64",
        );

        let Contract::Lease(restored) = decode_contract(&line).unwrap() else {
            panic!("expected `Lease`");
        };
        assert_eq!(restored.details().date, date());
        assert_eq!(restored.details().vehicle.vin.as_str(), "V1");
        assert_eq!(
            restored.details().vehicle.make.as_str(),
            Vehicle::UNKNOWN,
        );
        assert_eq!(restored.details().vehicle.price, vehicle::Price::ZERO);
        assert_eq!(
            restored.pricing().total_price,
            Money::from_str("17770.00").unwrap(),
        );
        assert_eq!(
            restored.pricing().monthly_payment,
            Money::from_str("524.64").unwrap(),
        );
        assert_eq!(restored.pricing().end_value, Money::ZERO);
    }

    #[test]
    fn decodes_detailed_lease() {
        let line = "LEASE|20240315|Jane Doe|jane@example.com|V1|2022|Toyota|\
                    RAV4|SUV|Blue|25000|31000.00";

        let Contract::Lease(lease) = decode_contract(line).unwrap() else {
            panic!("expected `Lease`");
        };
        assert_eq!(lease.details().vehicle.make.as_str(), "Toyota");
        assert_eq!(
            lease.pricing().monthly_payment,
            Money::from_str("524.64").unwrap(),
        );
    }

    #[test]
    fn rejects_malformed_contracts() {
        assert!(matches!(
            decode_contract("SALE|20240315|Jane Doe").unwrap_err(),
            Error::FieldsCount { expected: 18, .. },
        ));
        assert!(matches!(
            decode_contract("RENT|20240315").unwrap_err(),
            Error::UnknownKind(_),
        ));
        assert!(matches!(
            decode_contract("garbage").unwrap_err(),
            Error::FieldsCount { expected: 2, .. },
        ));
        assert_eq!(
            decode_contract(
                "2024-03-15|LEASE|Jane Doe|not-an-email|V1|17770.00|524.64",
            )
            .unwrap_err(),
            Error::InvalidField {
                field: "customer_email",
                value: "not-an-email".into(),
            },
        );
        assert!(matches!(
            decode_contract("2024-03-15|LEASE|Jane Doe|jane@example.com|V1")
                .unwrap_err(),
            Error::FieldsCount { expected: 7, .. },
        ));
    }
}
