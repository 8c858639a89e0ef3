//! [`Query`] collection related to the multiple [`Contract`]s.

use common::operations::By;

use crate::{domain::Contract, read};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries the stored [`Contract`]s matching a [`read::contract::list::Filter`]
/// in creation order.
pub type List = DatabaseQuery<By<Vec<Contract>, read::contract::list::Filter>>;
