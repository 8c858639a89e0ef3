//! [`Command`] definition.

pub mod add_vehicle;
pub mod lease_vehicle;
pub mod remove_vehicle;
pub mod sell_vehicle;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_vehicle::AddVehicle, lease_vehicle::LeaseVehicle,
    remove_vehicle::RemoveVehicle, sell_vehicle::SellVehicle,
};
