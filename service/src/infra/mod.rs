//! Infrastructure layer.

pub mod database;

pub use self::database::{journal, memory, Database, Journal, Memory};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
