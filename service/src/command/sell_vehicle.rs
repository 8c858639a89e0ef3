//! [`Command`] for selling a [`Vehicle`] from the inventory.

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Transacted,
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

/// [`Command`] for selling a [`Vehicle`] from the inventory under a new
/// [`contract::Sale`].
///
/// The [`Vehicle`] leaves the inventory in the same transaction the
/// [`contract::Sale`] is stored in.
#[derive(Clone, Debug)]
pub struct SellVehicle {
    /// [`contract::Date`] the [`contract::Sale`] is signed at.
    pub date: contract::Date,

    /// Name of the customer buying the [`Vehicle`].
    pub customer_name: CustomerName,

    /// Email of the customer buying the [`Vehicle`].
    pub customer_email: CustomerEmail,

    /// [`vehicle::Vin`] of the [`Vehicle`] to sell.
    pub vin: vehicle::Vin,

    /// Indicator whether the [`Vehicle`] is paid by monthly installments.
    pub financed: bool,
}

impl<Db> Command<SellVehicle> for Service<Db>
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
    type Ok = contract::Sale;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: SellVehicle) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SellVehicle {
            date,
            customer_name,
            customer_email,
            vin,
            financed,
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

        let sale = contract::Sale::new(
            date,
            customer_name,
            customer_email,
            vehicle,
            financed,
        );
        let id = tx
            .execute(Insert(Contract::from(sale.clone())))
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
            "`Vehicle(vin: {vin})` sold under `Contract(id: {id})` for {}",
            sale.pricing().total_price,
        );
        Ok(sale.with_id(id))
    }
}

/// Error of [`SellVehicle`] [`Command`] execution.
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
}

#[cfg(test)]
mod spec {
    use common::Money;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;
    use tokio::fs;

    use crate::{
        domain::vehicle,
        infra::{Journal, Memory},
        query,
        spec::{dealership, sale_of, suv},
        Command as _, Config, Query as _, Service,
    };

    use super::ExecutionError;

    #[tokio::test]
    async fn sells_financed_vehicle() {
        let svc = dealership([suv("V1", 2022, "31000.00")]).await;

        let sale = svc.execute(sale_of("V1", true)).await.unwrap();

        assert!(sale.details().id.is_some());
        assert!(sale.is_financed());
        let pricing = sale.pricing();
        assert_eq!(pricing.sales_tax, Money::new(dec!(1550.00)));
        assert_eq!(pricing.processing_fee, Money::new(dec!(495.00)));
        assert_eq!(pricing.total_price, Money::new(dec!(33145.00)));
        assert_eq!(pricing.monthly_payment, Money::new(dec!(752.10)));

        let left = svc
            .execute(query::vehicle::ByVin::by(
                vehicle::Vin::new("V1").unwrap(),
            ))
            .await
            .unwrap();
        assert!(left.is_none());

        let contracts = svc
            .execute(query::contracts::List::by(Default::default()))
            .await
            .unwrap();
        assert_eq!(contracts.len(), 1);
        assert_eq!(contracts[0].id(), sale.details().id);
    }

    #[tokio::test]
    async fn sells_vehicle_without_financing() {
        let svc = dealership([suv("V1", 2020, "9999.99")]).await;

        let sale = svc.execute(sale_of("V1", false)).await.unwrap();

        assert_eq!(sale.pricing().processing_fee, Money::new(dec!(295.00)));
        assert_eq!(sale.pricing().monthly_payment, Money::ZERO);
    }

    #[tokio::test]
    async fn rejects_unknown_vin() {
        let svc = dealership([suv("V1", 2022, "31000.00")]).await;

        let err = svc.execute(sale_of("V2", true)).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::VehicleNotExists(vin) if vin.as_str() == "V2",
        ));
        let contracts = svc
            .execute(query::contracts::List::by(Default::default()))
            .await
            .unwrap();
        assert!(contracts.is_empty());
    }

    #[tokio::test]
    async fn keeps_vehicle_when_commit_fails() {
        let dir = TempDir::new().unwrap();
        let (inventory, contracts) =
            (dir.path().join("inventory.txt"), dir.path().join("contracts.txt"));
        fs::write(&inventory, "|V1|2022|Toyota|RAV4|SUV|Blue|25000|31000.00\n")
            .await
            .unwrap();
        let db = Memory::open(Journal::new(&inventory, &contracts))
            .await
            .unwrap();
        let svc = Service::new(Config::default(), db);
        fs::create_dir(&contracts).await.unwrap();

        let res = svc.execute(sale_of("V1", true)).await;

        assert!(res.is_err());
        let left = svc
            .execute(query::vehicle::ByVin::by(
                vehicle::Vin::new("V1").unwrap(),
            ))
            .await
            .unwrap();
        assert!(left.is_some());
        let stored = svc
            .execute(query::contracts::List::by(Default::default()))
            .await
            .unwrap();
        assert!(stored.is_empty());
        let lines = fs::read_to_string(&inventory).await.unwrap();
        assert_eq!(lines.lines().count(), 1);
    }

    #[tokio::test]
    async fn sells_vehicle_once() {
        let svc = dealership([suv("V1", 2022, "31000.00")]).await;
        _ = svc.execute(sale_of("V1", false)).await.unwrap();

        let err = svc.execute(sale_of("V1", false)).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::VehicleNotExists(_)));
    }
}
