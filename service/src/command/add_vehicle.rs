//! [`Command`] for adding a new [`Vehicle`] to the inventory.

use common::operations::Insert;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{vehicle, Vehicle},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for adding a new [`Vehicle`] to the inventory.
#[derive(Clone, Debug)]
pub struct AddVehicle {
    /// [`Vehicle`] to add.
    pub vehicle: Vehicle,
}

impl<Db> Command<AddVehicle> for Service<Db>
where
    Db: Database<
        Insert<Vehicle>,
        Ok = vehicle::Id,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vehicle;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AddVehicle) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddVehicle { vehicle } = cmd;

        match self.database().execute(Insert(vehicle.clone())).await {
            Ok(id) => Ok(vehicle.with_id(id)),
            Err(e) if e.as_ref().is_unique_violation() => {
                Err(tracerr::new!(E::VinOccupied(vehicle.vin)))
            }
            Err(e) => Err(e).map_err(tracerr::map_from_and_wrap!(=> E)),
        }
    }
}

/// Error of [`AddVehicle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`vehicle::Vin`] is in the inventory already.
    #[display("`Vehicle(vin: {_0})` is in the inventory already")]
    VinOccupied(#[error(not(source))] vehicle::Vin),
}

#[cfg(test)]
mod spec {
    use crate::{
        query,
        read::vehicle::list::Filter,
        spec::{dealership, suv},
        Command as _, Query as _,
    };

    use super::{AddVehicle, ExecutionError};

    #[tokio::test]
    async fn assigns_id() {
        let svc = dealership([]).await;

        let added = svc
            .execute(AddVehicle {
                vehicle: suv("V1", 2022, "31000.00"),
            })
            .await
            .unwrap();

        assert!(added.id.is_some());
        let found = svc
            .execute(query::vehicles::Search::by(Filter::All))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, added.id);
    }

    #[tokio::test]
    async fn rejects_occupied_vin() {
        let svc = dealership([suv("V1", 2022, "31000.00")]).await;

        let err = svc
            .execute(AddVehicle {
                vehicle: suv("V1", 2020, "9000.00"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::VinOccupied(vin) if vin.as_str() == "V1",
        ));
    }
}
