//! [`Command`] for removing a [`Vehicle`] from the inventory.

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{vehicle, Vehicle},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for removing a [`Vehicle`] from the inventory.
#[derive(Clone, Copy, Debug)]
pub struct RemoveVehicle {
    /// ID of the [`Vehicle`] to remove.
    pub id: vehicle::Id,
}

impl<Db> Command<RemoveVehicle> for Service<Db>
where
    Db: Database<
        Delete<By<Vehicle, vehicle::Id>>,
        Ok = Option<Vehicle>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vehicle;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RemoveVehicle,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RemoveVehicle { id } = cmd;

        self.database()
            .execute(Delete(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`RemoveVehicle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Vehicle`] with the provided [`vehicle::Id`] is not in the
    /// inventory.
    #[display("`Vehicle(id: {_0})` is not in the inventory")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),
}
