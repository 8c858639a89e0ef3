//! [`Handler`] abstractions.

use std::future::Future;

/// Handler of a single kind of operation, described by its `Args`.
///
/// Commands, queries and storage operations are all expressed as
/// [`Handler`]s, so a type supporting some operation is the one implementing
/// [`Handler`] for it.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Handles the provided `args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
