//! [`Query`] collection related to a single [`Vehicle`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{vehicle, Vehicle},
    infra::{database, Database},
    Query, Service,
};

use super::DatabaseQuery;

/// Queries a [`Vehicle`] in the inventory by its [`vehicle::Vin`].
pub type ByVin = DatabaseQuery<By<Option<Vehicle>, vehicle::Vin>>;

/// Queries a [`Vehicle`] in the inventory by its [`vehicle::Vin`], failing
/// if there is none.
#[derive(Clone, Debug)]
pub struct RequireByVin(pub vehicle::Vin);

impl<Db> Query<RequireByVin> for Service<Db>
where
    Db: Database<
        Select<By<Option<Vehicle>, vehicle::Vin>>,
        Ok = Option<Vehicle>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vehicle;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        RequireByVin(vin): RequireByVin,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        self.execute(ByVin::by(vin.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(vin))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`RequireByVin`] [`Query`] execution.
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
