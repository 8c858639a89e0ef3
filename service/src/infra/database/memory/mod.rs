//! In-memory [`Database`] implementation.

mod impls;

use std::{collections::HashMap, future::Future, mem, sync::Arc};

use derive_more::{Display, Error as StdError, From};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{contract, vehicle, Contract, Vehicle},
    infra::database::{self, journal, Journal},
};
#[cfg(doc)]
use crate::infra::Database;

/// In-memory [`Database`] client, optionally persisted into a [`Journal`].
#[derive(Clone, Debug)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] client, persisted nowhere.
    #[must_use]
    pub fn new() -> Self {
        Self::from_state(State::default(), None)
    }

    /// Opens a [`Memory`] client persisted into the provided [`Journal`],
    /// loading its current contents.
    ///
    /// # Errors
    ///
    /// If failed to read the [`Journal`] files.
    pub async fn open(journal: Journal) -> Result<Self, Traced<database::Error>> {
        let (vehicles, contracts) = journal
            .load()
            .await
            .map_err(tracerr::map_from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        let mut state = State::default();
        for v in vehicles {
            // Duplicates are reported by the `Journal` already.
            _ = state.vehicles.insert(v.vin.clone(), v);
        }
        state.contracts = contracts
            .into_iter()
            .map(|c| c.with_id(contract::Id::new()))
            .collect();

        Ok(Self::from_state(state, Some(journal)))
    }

    /// Creates a new [`Memory`] client out of the provided [`State`].
    fn from_state(state: State, journal: Option<Journal>) -> Self {
        Self(NonTx {
            state: Arc::new(Mutex::new(state)),
            journal: journal.map(Arc::new),
        })
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-transactional [`Memory`] client.
///
/// Every operation is applied and persisted on its own.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// Published [`State`] of the [`Memory`].
    state: Arc<Mutex<State>>,

    /// [`Journal`] persisting the published [`State`], if any.
    journal: Option<Arc<Journal>>,
}

impl NonTx {
    /// Starts a new [`Staged`] transaction, holding the [`State`] lock until
    /// it's committed or dropped.
    async fn begin(&self) -> Staged {
        let published = Arc::clone(&self.state).lock_owned().await;
        Staged {
            state: published.clone(),
            published,
            journal: self.journal.clone(),
            committed: false,
        }
    }
}

/// Transactional [`Memory`] client.
///
/// Operations are applied to a private copy of the [`State`], published only
/// on commit. Dropping all the clones of a [`Tx`] discards the changes.
#[derive(Clone, Debug)]
pub struct Tx(Arc<Mutex<Option<Staged>>>);

impl Tx {
    /// Commits this [`Tx`], persisting and publishing its changes.
    ///
    /// # Errors
    ///
    /// If this [`Tx`] is committed already, or failed to persist its changes.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let staged = self
            .0
            .lock()
            .await
            .take()
            .ok_or(Error::TxFinished)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        staged.commit().await.map_err(tracerr::wrap!())
    }
}

/// Transaction in progress over the [`State`].
#[derive(Debug)]
struct Staged {
    /// Lock over the published [`State`].
    published: OwnedMutexGuard<State>,

    /// Private copy of the [`State`] the changes are applied to.
    state: State,

    /// [`Journal`] to persist the changes into on commit, if any.
    journal: Option<Arc<Journal>>,

    /// Indicator whether this [`Staged`] transaction is committed.
    committed: bool,
}

impl Staged {
    /// Persists the changes of this [`Staged`] transaction into its
    /// [`Journal`] (if any), and publishes them.
    async fn commit(mut self) -> Result<(), Traced<database::Error>> {
        let inventory_changed =
            self.state.revision != self.published.revision;
        let appended = self
            .state
            .contracts
            .get(self.published.contracts.len()..)
            .unwrap_or_default();

        if let Some(journal) = &self.journal {
            if inventory_changed || !appended.is_empty() {
                let inventory = inventory_changed
                    .then(|| self.state.vehicles.values().collect::<Vec<_>>());
                journal
                    .persist(inventory.as_deref(), appended)
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> Error))
                    .map_err(tracerr::map_from)?;
            }
        }

        *self.published = mem::take(&mut self.state);
        self.committed = true;
        Ok(())
    }
}

/// Snapshot of the [`Memory`] contents.
#[derive(Clone, Debug, Default)]
pub struct State {
    /// Inventory of [`Vehicle`]s by their [`vehicle::Vin`]s.
    vehicles: HashMap<vehicle::Vin, Vehicle>,

    /// Stored [`Contract`]s in creation order.
    contracts: Vec<Contract>,

    /// Revision of the inventory, changed on every inventory write.
    revision: u64,
}

impl State {
    /// Adds the provided [`Vehicle`] to the inventory.
    fn insert_vehicle(
        &mut self,
        vehicle: Vehicle,
    ) -> Result<vehicle::Id, Error> {
        if self.vehicles.contains_key(&vehicle.vin) {
            return Err(Error::VinOccupied(vehicle.vin));
        }
        let id = vehicle.id.unwrap_or_else(vehicle::Id::new);
        _ = self.vehicles.insert(vehicle.vin.clone(), vehicle.with_id(id));
        self.revision += 1;
        Ok(id)
    }

    /// Removes a [`Vehicle`] matching the provided predicate from the
    /// inventory.
    fn remove_vehicle(
        &mut self,
        pred: impl Fn(&Vehicle) -> bool,
    ) -> Option<Vehicle> {
        let vin = self.vehicles.values().find(|v| pred(v))?.vin.clone();
        let removed = self.vehicles.remove(&vin);
        self.revision += 1;
        removed
    }

    /// Stores the provided [`Contract`].
    fn insert_contract(&mut self, contract: Contract) -> contract::Id {
        let id = contract.id().unwrap_or_else(contract::Id::new);
        self.contracts.push(contract.with_id(id));
        id
    }
}

/// Access to the [`State`] of a [`Memory`] client.
pub trait Access {
    /// Applies the provided function to the [`State`].
    ///
    /// # Errors
    ///
    /// If the function fails, or the changes fail to be persisted.
    fn access<R>(
        &self,
        f: impl FnOnce(&mut State) -> Result<R, Error>,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;
}

impl Access for NonTx {
    async fn access<R>(
        &self,
        f: impl FnOnce(&mut State) -> Result<R, Error>,
    ) -> Result<R, Traced<database::Error>> {
        let mut staged = self.begin().await;
        let out = f(&mut staged.state)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        staged.commit().await.map_err(tracerr::wrap!())?;
        Ok(out)
    }
}

impl Access for Tx {
    async fn access<R>(
        &self,
        f: impl FnOnce(&mut State) -> Result<R, Error>,
    ) -> Result<R, Traced<database::Error>> {
        let mut staged = self.0.lock().await;
        let staged = staged
            .as_mut()
            .ok_or(Error::TxFinished)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        f(&mut staged.state)
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl Drop for Staged {
    fn drop(&mut self) {
        let changed = self.state.revision != self.published.revision
            || self.state.contracts.len() != self.published.contracts.len();
        if !self.committed && changed {
            log::warn!("`Memory` transaction rolled back");
        }
    }
}

/// [`Memory`] database [`Error`].
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`Journal`] error.
    #[display("`Journal` error: {_0}")]
    #[from]
    Journal(journal::Error),

    /// [`Tx`] is used after being committed.
    #[display("`Tx` is committed already")]
    TxFinished,

    /// [`Vehicle`] with the provided [`vehicle::Vin`] is in the inventory
    /// already.
    #[display("`Vehicle(vin: {_0})` is in the inventory already")]
    VinOccupied(#[error(not(source))] vehicle::Vin),
}
