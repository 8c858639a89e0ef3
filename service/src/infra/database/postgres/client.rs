//! Postgres database clients.

use std::{mem, sync::Arc};

use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Non-transactional Postgres database client.
///
/// Every statement is executed on a connection taken from the
/// [`connection::Pool`] for this statement only.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to take connections from.
    pub(crate) pool: connection::Pool,
}

impl NonTx {
    /// Creates a new [`NonTx`] client over the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self { pool }
    }

    /// Takes a [`connection::Pooled`] connection from the
    /// [`connection::Pool`].
    pub(crate) async fn pooled(
        &self,
    ) -> Result<connection::Pooled, Traced<database::Error>> {
        self.pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl Connection for NonTx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        let conn = self.pooled().await.map_err(tracerr::wrap!())?;
        conn.query(stmt, params).await.map_err(tracerr::wrap!())
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        let conn = self.pooled().await.map_err(tracerr::wrap!())?;
        conn.query_opt(stmt, params).await.map_err(tracerr::wrap!())
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        let conn = self.pooled().await.map_err(tracerr::wrap!())?;
        conn.exec(stmt, params).await.map_err(tracerr::wrap!())
    }
}

/// Transactional Postgres database client.
///
/// The transaction is started lazily, on the first executed statement, and
/// is rolled back once all the clones of this [`Tx`] are dropped without
/// being committed.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`NonTx`] client to take a connection from.
    non_tx: NonTx,

    /// [`State`] of the transaction.
    state: Arc<Mutex<State>>,
}

/// State of a [`Tx`].
#[derive(Debug, Default)]
enum State {
    /// Transaction is not started yet.
    #[default]
    Pending,

    /// Transaction is in progress.
    Started(connection::Tx),

    /// Transaction is committed.
    Committed,
}

impl Tx {
    /// Creates a new [`Tx`] client out of the provided [`NonTx`] one.
    #[must_use]
    pub fn from_non_tx(non_tx: NonTx) -> Self {
        Self {
            non_tx,
            state: Arc::new(Mutex::new(State::Pending)),
        }
    }

    /// Returns the [`connection::Tx`] of this [`Tx`] client, starting it if
    /// it's not started yet.
    async fn started(
        &self,
    ) -> Result<MappedMutexGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        let mut state = self.state.lock().await;
        if matches!(*state, State::Pending) {
            let pooled = self.non_tx.pooled().await.map_err(tracerr::wrap!())?;
            *state = State::Started(
                connection::Tx::begin(pooled)
                    .await
                    .map_err(tracerr::wrap!())?,
            );
        }
        MutexGuard::try_map(state, |s| match s {
            State::Started(tx) => Some(tx),
            State::Pending | State::Committed => None,
        })
        .map_err(|_| tracerr::new!(postgres::Error::TxFinished))
        .map_err(tracerr::map_from)
    }

    /// Commits this [`Tx`] client.
    ///
    /// Committing a [`Tx`] without any statements executed does nothing.
    ///
    /// # Errors
    ///
    /// If this [`Tx`] is committed already, or failed to commit.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let mut state = self.state.lock().await;
        match mem::replace(&mut *state, State::Committed) {
            State::Started(tx) => tx.commit().await.map_err(tracerr::wrap!()),
            State::Pending => Ok(()),
            State::Committed => Err(tracerr::new!(postgres::Error::TxFinished))
                .map_err(tracerr::map_from),
        }
    }
}

impl Connection for Tx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.started()
            .await
            .map_err(tracerr::wrap!())?
            .query(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.started()
            .await
            .map_err(tracerr::wrap!())?
            .query_opt(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.started()
            .await
            .map_err(tracerr::wrap!())?
            .exec(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }
}
