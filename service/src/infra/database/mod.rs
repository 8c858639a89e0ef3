//! [`Database`]-related implementations.

pub mod journal;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;
pub use self::{journal::Journal, memory::Memory};

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`Memory`] error.
    Memory(memory::Error),

    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),
}

impl Error {
    /// Checks whether this [`Error`] is caused by storing a value whose unique
    /// key is occupied already.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Memory(e) => matches!(e, memory::Error::VinOccupied(_)),
            #[cfg(feature = "postgres")]
            Self::Postgres(e) => e.is_unique_violation(None),
        }
    }
}
