//! [`Vehicle`]-related read definitions.

#[cfg(doc)]
use crate::domain::Vehicle;

pub mod list {
    //! [`Vehicle`]s list definitions.

    use std::{cmp::Ordering, ops::RangeInclusive};

    use common::Money;

    use crate::domain::{vehicle, Vehicle};

    /// Criterion to search [`Vehicle`]s in the inventory by.
    ///
    /// Ranges are inclusive on both ends, and text fragments are matched
    /// case-insensitively anywhere in the text.
    #[derive(Clone, Debug, Default)]
    pub enum Filter {
        /// Every [`Vehicle`], ordered by make and model.
        #[default]
        All,

        /// [`Vehicle`]s priced in range, cheapest first.
        Price(RangeInclusive<Money>),

        /// [`Vehicle`]s whose make and model contain the provided fragments,
        /// ordered by make and model.
        MakeModel {
            /// Fragment of the make.
            make: String,

            /// Fragment of the model.
            model: String,
        },

        /// [`Vehicle`]s produced in range, newest first.
        Year(RangeInclusive<u16>),

        /// [`Vehicle`]s whose color contains the provided fragment, ordered
        /// by make and model.
        Color(String),

        /// [`Vehicle`]s with odometer reading in range, least driven first.
        Mileage(RangeInclusive<u32>),

        /// [`Vehicle`]s of the provided [`vehicle::Kind`], ordered by make
        /// and model.
        Kind(vehicle::Kind),
    }

    impl Filter {
        /// Checks whether the provided [`Vehicle`] satisfies this [`Filter`].
        #[must_use]
        pub fn matches(&self, v: &Vehicle) -> bool {
            match self {
                Self::All => true,
                Self::Price(range) => range.contains(&v.price.money()),
                Self::MakeModel { make, model } => {
                    contains_ignore_case(v.make.as_str(), make)
                        && contains_ignore_case(v.model.as_str(), model)
                }
                Self::Year(range) => range.contains(&v.year.get()),
                Self::Color(color) => {
                    contains_ignore_case(v.color.as_str(), color)
                }
                Self::Mileage(range) => range.contains(&v.odometer.get()),
                Self::Kind(kind) => v.kind == *kind,
            }
        }

        /// Compares the provided [`Vehicle`]s in the order of this
        /// [`Filter`]'s results.
        ///
        /// Ties are broken by [`vehicle::Vin`].
        #[must_use]
        pub fn compare(&self, a: &Vehicle, b: &Vehicle) -> Ordering {
            match self {
                Self::Price(_) => a.price.cmp(&b.price),
                Self::Year(_) => b.year.cmp(&a.year),
                Self::Mileage(_) => a.odometer.cmp(&b.odometer),
                Self::All
                | Self::MakeModel { .. }
                | Self::Color(_)
                | Self::Kind(_) => a
                    .make
                    .cmp(&b.make)
                    .then_with(|| a.model.cmp(&b.model)),
            }
            .then_with(|| a.vin.cmp(&b.vin))
        }

        /// Applies this [`Filter`] to the provided [`Vehicle`]s, returning the
        /// matching ones in order.
        #[must_use]
        pub fn apply<'v>(
            &self,
            vehicles: impl IntoIterator<Item = &'v Vehicle>,
        ) -> Vec<Vehicle> {
            let mut found = vehicles
                .into_iter()
                .filter(|v| self.matches(v))
                .cloned()
                .collect::<Vec<_>>();
            found.sort_by(|a, b| self.compare(a, b));
            found
        }
    }

    /// Checks whether the `text` contains the `fragment`, ignoring case.
    fn contains_ignore_case(text: &str, fragment: &str) -> bool {
        text.to_lowercase().contains(&fragment.to_lowercase())
    }

    #[cfg(test)]
    mod spec {
        use std::str::FromStr as _;

        use common::Money;
        use rust_decimal_macros::dec;

        use crate::domain::{vehicle, Vehicle};

        use super::Filter;

        #[expect(clippy::too_many_arguments, reason = "still readable")]
        fn vehicle(
            vin: &str,
            year: u16,
            make: &str,
            model: &str,
            kind: vehicle::Kind,
            color: &str,
            odometer: u32,
            price: &str,
        ) -> Vehicle {
            Vehicle::new(
                vehicle::Vin::new(vin).unwrap(),
                vehicle::Year::new(year).unwrap(),
                vehicle::Make::new(make).unwrap(),
                vehicle::Model::new(model).unwrap(),
                kind,
                vehicle::Color::new(color).unwrap(),
                vehicle::Odometer::from(odometer),
                vehicle::Price::from_str(price).unwrap(),
            )
        }

        fn inventory() -> Vec<Vehicle> {
            use vehicle::Kind as K;

            vec![
                vehicle("V3", 2020, "Toyota", "RAV4", K::Suv, "Blue", 60_000, "18000"),
                vehicle("V1", 2021, "Honda", "Civic", K::Car, "Black", 15_000, "22000.00"),
                vehicle("V2", 2023, "Ford", "F-150", K::Truck, "Red", 5_000, "45000.00"),
                vehicle("V4", 2021, "Honda", "Civic", K::Car, "Dark Blue", 15_000, "22000"),
            ]
        }

        fn vins(vehicles: &[Vehicle]) -> Vec<&str> {
            vehicles.iter().map(|v| v.vin.as_str()).collect()
        }

        #[test]
        fn all_by_make_and_model() {
            let found = Filter::All.apply(&inventory());

            assert_eq!(vins(&found), ["V2", "V1", "V4", "V3"]);
        }

        #[test]
        fn price_range_is_inclusive_and_ascending() {
            let filter = Filter::Price(
                Money::new(dec!(18000))..=Money::new(dec!(22000)),
            );

            assert_eq!(vins(&filter.apply(&inventory())), ["V3", "V1", "V4"]);
        }

        #[test]
        fn make_model_ignores_case() {
            let filter = Filter::MakeModel {
                make: "hon".into(),
                model: "CIV".into(),
            };

            assert_eq!(vins(&filter.apply(&inventory())), ["V1", "V4"]);
        }

        #[test]
        fn year_range_is_descending() {
            let filter = Filter::Year(2020..=2021);

            assert_eq!(vins(&filter.apply(&inventory())), ["V1", "V4", "V3"]);
        }

        #[test]
        fn color_fragment() {
            let filter = Filter::Color("blue".into());

            assert_eq!(vins(&filter.apply(&inventory())), ["V4", "V3"]);
        }

        #[test]
        fn mileage_range_is_ascending() {
            let filter = Filter::Mileage(5_000..=15_000);

            assert_eq!(vins(&filter.apply(&inventory())), ["V2", "V1", "V4"]);
        }

        #[test]
        fn kind() {
            let filter = Filter::Kind(vehicle::Kind::Car);

            assert_eq!(vins(&filter.apply(&inventory())), ["V1", "V4"]);
            assert!(Filter::Kind(vehicle::Kind::Van)
                .apply(&inventory())
                .is_empty());
        }

        #[test]
        fn empty_range_finds_nothing() {
            #[expect(clippy::reversed_empty_ranges, reason = "tested")]
            let filter = Filter::Year(2024..=2020);

            assert!(filter.apply(&inventory()).is_empty());
        }
    }
}
