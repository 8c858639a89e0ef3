//! [`Command`] for leasing a [`Vehicle`] from the inventory.

use common::{
    date,
    operations::{
        By, Commit, Delete, Insert, Lock, Select, Transact, Transacted,
    },
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        contract::{self, CustomerEmail, CustomerName},
        vehicle, Contract, Vehicle,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for leasing a [`Vehicle`] from the inventory under a new
/// [`contract::Lease`].
///
/// Only [`Vehicle`]s not older than [`Config::max_lease_vehicle_age`] years
/// may be leased.
///
/// [`Config::max_lease_vehicle_age`]: crate::Config::max_lease_vehicle_age
#[derive(Clone, Debug)]
pub struct LeaseVehicle {
    /// [`contract::Date`] the [`contract::Lease`] is signed at.
    pub date: contract::Date,

    /// Name of the customer leasing the [`Vehicle`].
    pub customer_name: CustomerName,

    /// Email of the customer leasing the [`Vehicle`].
    pub customer_email: CustomerEmail,

    /// [`vehicle::Vin`] of the [`Vehicle`] to lease.
    pub vin: vehicle::Vin,
}

impl<Db> Command<LeaseVehicle> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Vehicle, vehicle::Vin>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Vehicle>, vehicle::Vin>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<Contract>,
            Ok = contract::Id,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Vehicle, vehicle::Vin>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = contract::Lease;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: LeaseVehicle) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let LeaseVehicle {
            date,
            customer_name,
            customer_email,
            vin,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent contracts upon the same `Vehicle`.
        tx.execute(Lock(By::<Vehicle, _>::new(vin.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(vin.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::VehicleNotExists(vin.clone()))
            .map_err(tracerr::wrap!())?;

        let age = vehicle.age_at(date::current_year());
        if age > i32::from(self.config().max_lease_vehicle_age) {
            return Err(tracerr::new!(E::VehicleTooOld { vin, age }));
        }

        let lease = contract::Lease::new(
            date,
            customer_name,
            customer_email,
            vehicle,
        );
        let id = tx
            .execute(Insert(Contract::from(lease.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Delete(By::<Vehicle, _>::new(vin.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Vehicle(vin: {vin})` leased under `Contract(id: {id})` for {} \
             monthly",
            lease.pricing().monthly_payment,
        );
        Ok(lease.with_id(id))
    }
}

/// Error of [`LeaseVehicle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Vehicle`] with the provided [`vehicle::Vin`] is not in the
    /// inventory.
    #[display("`Vehicle(vin: {_0})` is not in the inventory")]
    VehicleNotExists(#[error(not(source))] vehicle::Vin),

    /// [`Vehicle`] is too old to be leased.
    #[display("`Vehicle(vin: {vin})` is {age} years old, too old to lease")]
    VehicleTooOld {
        /// [`vehicle::Vin`] of the [`Vehicle`].
        vin: vehicle::Vin,

        /// Age of the [`Vehicle`] in years.
        age: i32,
    },
}

#[cfg(test)]
mod spec {
    use common::{date, Money};
    use rust_decimal_macros::dec;

    use crate::{
        domain::vehicle,
        query,
        spec::{dealership, dealership_with, lease_of, suv},
        Command as _, Config, Query as _,
    };

    use super::ExecutionError;

    fn years_ago(years: i32) -> u16 {
        u16::try_from(date::current_year() - years).unwrap()
    }

    #[tokio::test]
    async fn leases_recent_vehicle() {
        let svc =
            dealership([suv("V1", years_ago(3), "31000.00")]).await;

        let lease = svc.execute(lease_of("V1")).await.unwrap();

        assert!(lease.details().id.is_some());
        let pricing = lease.pricing();
        assert_eq!(pricing.end_value, Money::new(dec!(15500.00)));
        assert_eq!(pricing.lease_fee, Money::new(dec!(2170.00)));
        assert_eq!(pricing.total_price, Money::new(dec!(17770.00)));
        assert_eq!(pricing.monthly_payment, Money::new(dec!(524.64)));

        let left = svc
            .execute(query::vehicle::ByVin::by(
                vehicle::Vin::new("V1").unwrap(),
            ))
            .await
            .unwrap();
        assert!(left.is_none());
    }

    #[tokio::test]
    async fn rejects_too_old_vehicle() {
        let svc =
            dealership([suv("V1", years_ago(4), "31000.00")]).await;

        let err = svc.execute(lease_of("V1")).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::VehicleTooOld { age: 4, .. },
        ));
        let kept = svc
            .execute(query::vehicle::ByVin::by(
                vehicle::Vin::new("V1").unwrap(),
            ))
            .await
            .unwrap();
        assert!(kept.is_some());
        let contracts = svc
            .execute(query::contracts::List::by(Default::default()))
            .await
            .unwrap();
        assert!(contracts.is_empty());
    }

    #[tokio::test]
    async fn respects_configured_age_limit() {
        let config = Config {
            max_lease_vehicle_age: 5,
        };
        let svc =
            dealership_with(config, [suv("V1", years_ago(5), "31000.00")])
                .await;

        let lease = svc.execute(lease_of("V1")).await.unwrap();

        assert_eq!(lease.details().vehicle.vin.as_str(), "V1");
    }

    #[tokio::test]
    async fn rejects_unknown_vin() {
        let svc = dealership([]).await;

        let err = svc.execute(lease_of("V1")).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::VehicleNotExists(_)));
    }
}
