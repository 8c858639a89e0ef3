//! [`Vehicle`] definitions.

use std::{fmt, hash};

use common::{date, define_kind, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::define_text;

/// Vehicle in the dealership's inventory.
///
/// Two [`Vehicle`]s are equal whenever their [`Vin`]s are.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// ID of this [`Vehicle`], assigned once it's stored in the inventory.
    pub id: Option<Id>,

    /// [`Vin`] of this [`Vehicle`].
    pub vin: Vin,

    /// Production [`Year`] of this [`Vehicle`].
    pub year: Year,

    /// [`Make`] of this [`Vehicle`].
    pub make: Make,

    /// [`Model`] of this [`Vehicle`].
    pub model: Model,

    /// [`Kind`] of this [`Vehicle`].
    pub kind: Kind,

    /// [`Color`] of this [`Vehicle`].
    pub color: Color,

    /// [`Odometer`] reading of this [`Vehicle`].
    pub odometer: Odometer,

    /// Tax-exclusive [`Price`] of this [`Vehicle`].
    pub price: Price,
}

impl Vehicle {
    /// Creates a new [`Vehicle`] not stored anywhere yet.
    #[expect(clippy::too_many_arguments, reason = "still readable")]
    #[must_use]
    pub fn new(
        vin: Vin,
        year: Year,
        make: Make,
        model: Model,
        kind: Kind,
        color: Color,
        odometer: Odometer,
        price: Price,
    ) -> Self {
        Self {
            id: None,
            vin,
            year,
            make,
            model,
            kind,
            color,
            odometer,
            price,
        }
    }

    /// Creates a placeholder [`Vehicle`] known by its [`Vin`] only.
    ///
    /// Used to restore records which don't persist the whole [`Vehicle`].
    #[expect(unsafe_code, reason = "placeholder values are well-known")]
    #[must_use]
    pub fn placeholder(vin: Vin) -> Self {
        let (year, make, model, color) = unsafe {
            (
                Year::new_unchecked(0),
                Make::new_unchecked(Self::UNKNOWN),
                Model::new_unchecked(Self::UNKNOWN),
                Color::new_unchecked(Self::UNKNOWN),
            )
        };
        Self {
            id: None,
            vin,
            year,
            make,
            model,
            kind: Kind::Car,
            color,
            odometer: Odometer::default(),
            price: Price::ZERO,
        }
    }

    /// Text of unknown attributes of a [`placeholder()`] [`Vehicle`].
    ///
    /// [`placeholder()`]: Vehicle::placeholder
    pub const UNKNOWN: &'static str = "UNKNOWN";

    /// Returns a copy of this [`Vehicle`] with the provided [`Id`] assigned.
    #[must_use]
    pub fn with_id(self, id: Id) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }

    /// Returns the age of this [`Vehicle`] in whole years at the provided
    /// calendar `year`.
    #[must_use]
    pub fn age_at(&self, year: i32) -> i32 {
        year - i32::from(self.year.get())
    }
}

impl PartialEq for Vehicle {
    fn eq(&self, other: &Self) -> bool {
        self.vin == other.vin
    }
}

impl Eq for Vehicle {}

impl hash::Hash for Vehicle {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.vin.hash(state);
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            vin,
            year,
            make,
            model,
            kind,
            color,
            odometer,
            price,
            ..
        } = self;
        write!(
            f,
            "{year} {make} {model} <{vin}> {kind}, {color}, {odometer} km, \
             {price}",
        )
    }
}

/// ID of a [`Vehicle`].
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, From, FromStr, Hash, Into, PartialEq,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_text! {
    #[doc = "Vehicle identification number, the business key of a [`Vehicle`]."]
    pub struct Vin(max = 64);
}

define_text! {
    #[doc = "Manufacturer of a [`Vehicle`]."]
    pub struct Make(max = 128);
}

define_text! {
    #[doc = "Model name of a [`Vehicle`]."]
    pub struct Model(max = 128);
}

define_text! {
    #[doc = "Exterior color of a [`Vehicle`]."]
    pub struct Color(max = 64);
}

/// Production year of a [`Vehicle`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Year(u16);

impl Year {
    /// Year the first automobile was produced.
    pub const FIRST: u16 = 1886;

    /// Creates a new [`Year`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `year` is in range.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(year: u16) -> Self {
        Self(year)
    }

    /// Creates a new [`Year`] if the given `year` is not before the
    /// [`FIRST`] one and not after the next calendar year.
    ///
    /// [`FIRST`]: Year::FIRST
    #[must_use]
    pub fn new(year: u16) -> Option<Self> {
        Self::check(year).then_some(Self(year))
    }

    /// Returns the numeric value of this [`Year`].
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Checks whether the given `year` is a valid [`Year`].
    fn check(year: u16) -> bool {
        year >= Self::FIRST && i32::from(year) <= date::current_year() + 1
    }
}

impl FromStr for Year {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Year`")
    }
}

/// Odometer reading of a [`Vehicle`], in kilometers.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
pub struct Odometer(u32);

impl Odometer {
    /// Returns the numeric value of this [`Odometer`] reading.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Tax-exclusive price of a [`Vehicle`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Price(Money);

impl Price {
    /// Zero [`Price`].
    pub const ZERO: Self = Self(Money::ZERO);

    /// Upper bound of a [`Price`], keeping every derived amount far from
    /// [`Decimal`] overflow.
    pub const MAX: Decimal = dec!(1000000000000000);

    /// Creates a new [`Price`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `price` is in range.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(price: Money) -> Self {
        Self(price)
    }

    /// Creates a new [`Price`] if the given `price` is neither negative nor
    /// above [`MAX`].
    ///
    /// [`MAX`]: Price::MAX
    #[must_use]
    pub fn new(price: Money) -> Option<Self> {
        Self::check(price).then_some(Self(price))
    }

    /// Returns the [`Money`] amount of this [`Price`].
    #[must_use]
    pub const fn money(self) -> Money {
        self.0
    }

    /// Checks whether the given `price` is a valid [`Price`].
    fn check(price: Money) -> bool {
        !price.is_negative() && price.amount() <= Self::MAX
    }
}

impl FromStr for Price {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Price`")
    }
}

define_kind! {
    #[doc = "Body category of a [`Vehicle`]."]
    enum Kind {
        #[doc = "Passenger car."]
        Car = 1,

        #[doc = "Pickup or heavier truck."]
        Truck = 2,

        #[doc = "Sport utility vehicle."]
        Suv = 3,

        #[doc = "Passenger or cargo van."]
        Van = 4,
    }
}

#[cfg(test)]
mod spec {
    use std::{collections::HashSet, str::FromStr as _};

    use common::{date, Money};
    use rust_decimal_macros::dec;

    use super::{
        Color, Id, Kind, Make, Model, Odometer, Price, Vehicle, Vin, Year,
    };

    fn vehicle(vin: &str, year: u16, price: &str) -> Vehicle {
        Vehicle::new(
            Vin::new(vin).unwrap(),
            Year::new(year).unwrap(),
            Make::new("Toyota").unwrap(),
            Model::new("RAV4").unwrap(),
            Kind::Suv,
            Color::new("Blue").unwrap(),
            Odometer::from(25_000),
            Price::from_str(price).unwrap(),
        )
    }

    #[test]
    fn text_is_trimmed_and_validated() {
        assert_eq!(Make::new("  Honda ").unwrap().as_str(), "Honda");
        assert!(Make::new("").is_none());
        assert!(Make::new("   ").is_none());
        assert!(Model::new("F|150").is_none());
        assert!(Color::new("Dark\nBlue").is_none());
        assert!(Vin::new("x".repeat(65)).is_none());
        assert!(Vin::from_str("VIN123").is_ok());
        assert_eq!(Vin::from_str(""), Err("invalid `Vin`"));
    }

    #[test]
    fn year_is_bounded() {
        let next = u16::try_from(date::current_year() + 1).unwrap();

        assert!(Year::new(1885).is_none());
        assert!(Year::new(1886).is_some());
        assert!(Year::new(next).is_some());
        assert!(Year::new(next + 1).is_none());
        assert!(Year::from_str("20x1").is_err());
    }

    #[test]
    fn price_is_bounded() {
        assert!(Price::new(Money::new(dec!(-0.01))).is_none());
        assert!(Price::new(Money::ZERO).is_some());
        assert!(Price::new(Money::new(Price::MAX)).is_some());
        assert!(Price::new(Money::new(Price::MAX + dec!(0.01))).is_none());
        assert_eq!(
            Price::from_str("22000.00").unwrap().money(),
            Money::new(dec!(22000)),
        );
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!(Kind::from_str("suv"), Ok(Kind::Suv));
        assert_eq!(Kind::from_str("TRUCK"), Ok(Kind::Truck));
        assert_eq!(Kind::Van.to_string(), "VAN");
        assert!(Kind::from_str("BOAT").is_err());
    }

    #[test]
    fn equality_is_by_vin() {
        let a = vehicle("V1", 2022, "31000.00");
        let mut b = vehicle("V1", 2020, "1.00");
        b.make = Make::new("Ford").unwrap();
        let c = vehicle("V2", 2022, "31000.00");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(HashSet::from([a, b, c]).len(), 2);
    }

    #[test]
    fn with_id_assigns_id() {
        let id = Id::new();
        let v = vehicle("V1", 2022, "31000.00");
        assert!(v.id.is_none());

        let v = v.with_id(id);
        assert_eq!(v.id, Some(id));
    }

    #[test]
    fn placeholder_keeps_vin_only() {
        let v = Vehicle::placeholder(Vin::new("V9").unwrap());

        assert_eq!(v.vin.as_str(), "V9");
        assert_eq!(v.year.get(), 0);
        assert_eq!(v.odometer.get(), 0);
        assert_eq!(v.price, Price::ZERO);
        assert_eq!(v.kind, Kind::Car);
        assert_eq!(v.make.as_str(), Vehicle::UNKNOWN);
        assert_eq!(v.model.as_str(), Vehicle::UNKNOWN);
        assert_eq!(v.color.as_str(), Vehicle::UNKNOWN);
    }

    #[test]
    fn age() {
        assert_eq!(vehicle("V1", 2021, "1").age_at(2024), 3);
        assert_eq!(vehicle("V1", 2024, "1").age_at(2024), 0);
    }
}
