//! [`Database`] implementations.

use std::sync::Arc;

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact,
};
use tokio::sync::Mutex;
use tracerr::Traced;

use crate::{
    domain::{contract, vehicle, Contract, Vehicle},
    infra::{database, Database},
    read,
};

use super::{Access, Memory, NonTx, Tx};

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let staged = self.0.begin().await;
        Ok(Memory(Tx(Arc::new(Mutex::new(Some(staged))))))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.0.commit().await.map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Option<Vehicle>, vehicle::Vin>>>
    for Memory<C>
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Vehicle>, vehicle::Vin>>,
    ) -> Result<Self::Ok, Self::Err> {
        let vin = by.into_inner();
        self.0
            .access(|s| Ok(s.vehicles.get(&vin).cloned()))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access>
    Database<Select<By<Vec<Vehicle>, read::vehicle::list::Filter>>>
    for Memory<C>
{
    type Ok = Vec<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Vehicle>, read::vehicle::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        self.0
            .access(|s| Ok(filter.apply(s.vehicles.values())))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<Vehicle>> for Memory<C> {
    type Ok = vehicle::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(vehicle): Insert<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .access(|s| s.insert_vehicle(vehicle))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Delete<By<Vehicle, vehicle::Id>>> for Memory<C> {
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vehicle, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .access(|s| Ok(s.remove_vehicle(|v| v.id == Some(id))))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Delete<By<Vehicle, vehicle::Vin>>> for Memory<C> {
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vehicle, vehicle::Vin>>,
    ) -> Result<Self::Ok, Self::Err> {
        let vin = by.into_inner();
        self.0
            .access(|s| Ok(s.remove_vehicle(|v| v.vin == vin)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Database<Lock<By<Vehicle, vehicle::Vin>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Vehicle, vehicle::Vin>>,
    ) -> Result<Self::Ok, Self::Err> {
        // The whole `State` is locked for the `Tx` lifetime already.
        Ok(())
    }
}

impl<C: Access> Database<Insert<Contract>> for Memory<C> {
    type Ok = contract::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(contract): Insert<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .access(|s| Ok(s.insert_contract(contract)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access>
    Database<Select<By<Vec<Contract>, read::contract::list::Filter>>>
    for Memory<C>
{
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Contract>, read::contract::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        self.0
            .access(|s| {
                Ok(s.contracts
                    .iter()
                    .filter(|c| filter.matches(c))
                    .cloned()
                    .collect())
            })
            .await
            .map_err(tracerr::wrap!())
    }
}
