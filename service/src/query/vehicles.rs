//! [`Query`] collection related to the multiple [`Vehicle`]s.

use common::operations::By;

use crate::{domain::Vehicle, read};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Searches the inventory for [`Vehicle`]s matching a
/// [`read::vehicle::list::Filter`], in the order of this filter.
pub type Search = DatabaseQuery<By<Vec<Vehicle>, read::vehicle::list::Filter>>;

#[cfg(test)]
mod spec {
    use common::Money;
    use rust_decimal_macros::dec;

    use crate::{
        domain::{vehicle, Vehicle},
        read::vehicle::list::Filter,
        spec::dealership,
        Query as _,
    };

    use super::Search;

    fn car(vin: &str, make: &str, model: &str, price: Money) -> Vehicle {
        Vehicle::new(
            vehicle::Vin::new(vin).unwrap(),
            vehicle::Year::new(2020).unwrap(),
            vehicle::Make::new(make).unwrap(),
            vehicle::Model::new(model).unwrap(),
            vehicle::Kind::Car,
            vehicle::Color::new("White").unwrap(),
            vehicle::Odometer::from(1000),
            vehicle::Price::new(price).unwrap(),
        )
    }

    #[tokio::test]
    async fn searches_inventory() {
        let svc = dealership([
            car("V1", "Toyota", "Corolla", Money::new(dec!(20000.00))),
            car("V2", "Honda", "Civic", Money::new(dec!(18000.00))),
            car("V3", "Honda", "Accord", Money::new(dec!(26000.00))),
        ])
        .await;

        let all = svc.execute(Search::by(Filter::All)).await.unwrap();
        assert_eq!(
            all.iter().map(|v| v.vin.as_str()).collect::<Vec<_>>(),
            ["V3", "V2", "V1"],
        );

        let cheap = svc
            .execute(Search::by(Filter::Price(
                Money::new(dec!(18000.00))..=Money::new(dec!(20000.00)),
            )))
            .await
            .unwrap();
        assert_eq!(
            cheap.iter().map(|v| v.vin.as_str()).collect::<Vec<_>>(),
            ["V2", "V1"],
        );

        let hondas = svc
            .execute(Search::by(Filter::MakeModel {
                make: "honda".into(),
                model: "C".into(),
            }))
            .await
            .unwrap();
        assert_eq!(
            hondas.iter().map(|v| v.vin.as_str()).collect::<Vec<_>>(),
            ["V3", "V2"],
        );

        let trucks = svc
            .execute(Search::by(Filter::Kind(vehicle::Kind::Truck)))
            .await
            .unwrap();
        assert!(trucks.is_empty());
    }
}
