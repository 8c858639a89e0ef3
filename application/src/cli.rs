//! Execution of the command-line [`Action`]s.

use std::fmt;

use common::DateOf;
use service::{
    command::{
        add_vehicle, lease_vehicle, remove_vehicle, sell_vehicle, AddVehicle,
        LeaseVehicle, RemoveVehicle, SellVehicle,
    },
    domain::{contract, Contract, Vehicle},
    infra::database,
    query, read, Command, Query,
};
use tracerr::Traced;

use crate::{
    args::{Action, Signing},
    AsError, Error,
};

/// [`Service`] capable of performing every [`Action`].
///
/// [`Service`]: service::Service
pub trait Dealership:
    Command<
        SellVehicle,
        Ok = contract::Sale,
        Err = Traced<sell_vehicle::ExecutionError>,
    > + Command<
        LeaseVehicle,
        Ok = contract::Lease,
        Err = Traced<lease_vehicle::ExecutionError>,
    > + Command<
        AddVehicle,
        Ok = Vehicle,
        Err = Traced<add_vehicle::ExecutionError>,
    > + Command<
        RemoveVehicle,
        Ok = Vehicle,
        Err = Traced<remove_vehicle::ExecutionError>,
    > + Query<
        query::vehicle::RequireByVin,
        Ok = Vehicle,
        Err = Traced<query::vehicle::ExecutionError>,
    > + Query<
        query::vehicles::Search,
        Ok = Vec<Vehicle>,
        Err = Traced<database::Error>,
    > + Query<
        query::contracts::List,
        Ok = Vec<Contract>,
        Err = Traced<database::Error>,
    >
{
}

impl<S> Dealership for S where
    S: Command<
            SellVehicle,
            Ok = contract::Sale,
            Err = Traced<sell_vehicle::ExecutionError>,
        > + Command<
            LeaseVehicle,
            Ok = contract::Lease,
            Err = Traced<lease_vehicle::ExecutionError>,
        > + Command<
            AddVehicle,
            Ok = Vehicle,
            Err = Traced<add_vehicle::ExecutionError>,
        > + Command<
            RemoveVehicle,
            Ok = Vehicle,
            Err = Traced<remove_vehicle::ExecutionError>,
        > + Query<
            query::vehicle::RequireByVin,
            Ok = Vehicle,
            Err = Traced<query::vehicle::ExecutionError>,
        > + Query<
            query::vehicles::Search,
            Ok = Vec<Vehicle>,
            Err = Traced<database::Error>,
        > + Query<
            query::contracts::List,
            Ok = Vec<Contract>,
            Err = Traced<database::Error>,
        >
{
}

/// Performs the provided [`Action`] on the [`Dealership`].
///
/// # Errors
///
/// If the [`Action`] fails.
pub async fn run<S: Dealership>(
    dealership: &S,
    action: Action,
) -> Result<Outcome, Error> {
    Ok(match action {
        Action::List => Outcome::Vehicles(
            dealership
                .execute(query::vehicles::Search::by(
                    read::vehicle::list::Filter::All,
                ))
                .await
                .map_err(AsError::into_error)?,
        ),
        Action::Search(search) => Outcome::Vehicles(
            dealership
                .execute(query::vehicles::Search::by(search.into()))
                .await
                .map_err(AsError::into_error)?,
        ),
        Action::Show { vin } => Outcome::Vehicle(
            dealership
                .execute(query::vehicle::RequireByVin(vin))
                .await
                .map_err(AsError::into_error)?,
        ),
        Action::Add(vehicle) => Outcome::Added(
            dealership
                .execute(AddVehicle {
                    vehicle: vehicle.into(),
                })
                .await
                .map_err(AsError::into_error)?,
        ),
        Action::Remove { id } => Outcome::Removed(
            dealership
                .execute(RemoveVehicle { id })
                .await
                .map_err(AsError::into_error)?,
        ),
        Action::Sell { signing, financed } => {
            let Signing {
                vin,
                name,
                email,
                date,
            } = signing;
            Outcome::Sold(
                dealership
                    .execute(SellVehicle {
                        date: date.unwrap_or_else(DateOf::today),
                        customer_name: name,
                        customer_email: email,
                        vin,
                        financed,
                    })
                    .await
                    .map_err(AsError::into_error)?,
            )
        }
        Action::Lease { signing } => {
            let Signing {
                vin,
                name,
                email,
                date,
            } = signing;
            Outcome::Leased(
                dealership
                    .execute(LeaseVehicle {
                        date: date.unwrap_or_else(DateOf::today),
                        customer_name: name,
                        customer_email: email,
                        vin,
                    })
                    .await
                    .map_err(AsError::into_error)?,
            )
        }
        Action::Contracts { kind, vin } => Outcome::Contracts(
            dealership
                .execute(query::contracts::List::by(
                    read::contract::list::Filter { kind, vin },
                ))
                .await
                .map_err(AsError::into_error)?,
        ),
    })
}

/// Result of a successfully performed [`Action`], displayed to the user.
#[derive(Debug)]
pub enum Outcome {
    /// Found [`Vehicle`]s.
    Vehicles(Vec<Vehicle>),

    /// Single found [`Vehicle`].
    Vehicle(Vehicle),

    /// [`Vehicle`] added to the inventory.
    Added(Vehicle),

    /// [`Vehicle`] removed from the inventory.
    Removed(Vehicle),

    /// Signed [`contract::Sale`].
    Sold(contract::Sale),

    /// Signed [`contract::Lease`].
    Leased(contract::Lease),

    /// Found [`Contract`]s.
    Contracts(Vec<Contract>),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vehicles(vs) if vs.is_empty() => {
                write!(f, "No vehicles match the criteria.")
            }
            Self::Vehicles(vs) => {
                for (n, v) in vs.iter().enumerate() {
                    if n > 0 {
                        writeln!(f)?;
                    }
                    write_vehicle(f, v)?;
                }
                Ok(())
            }
            Self::Vehicle(v) => write_vehicle(f, v),
            Self::Added(v) => {
                write!(f, "Added ")?;
                write_vehicle(f, v)
            }
            Self::Removed(v) => {
                write!(f, "Removed ")?;
                write_vehicle(f, v)
            }
            Self::Sold(sale) => {
                let p = sale.pricing();
                write_signing(f, "Sold", sale.details())?;
                write!(
                    f,
                    "\n  sales tax:       {}\
                     \n  recording fee:   {}\
                     \n  processing fee:  {}\
                     \n  total price:     {}\
                     \n  monthly payment: {}",
                    p.sales_tax,
                    p.recording_fee,
                    p.processing_fee,
                    p.total_price,
                    p.monthly_payment,
                )
            }
            Self::Leased(lease) => {
                let p = lease.pricing();
                write_signing(f, "Leased", lease.details())?;
                write!(
                    f,
                    "\n  end value:       {}\
                     \n  lease fee:       {}\
                     \n  recording fee:   {}\
                     \n  total price:     {}\
                     \n  monthly payment: {}",
                    p.end_value.round_cents(),
                    p.lease_fee.round_cents(),
                    p.recording_fee,
                    p.total_price.round_cents(),
                    p.monthly_payment,
                )
            }
            Self::Contracts(cs) if cs.is_empty() => {
                write!(f, "No contracts match the criteria.")
            }
            Self::Contracts(cs) => {
                for (n, c) in cs.iter().enumerate() {
                    if n > 0 {
                        writeln!(f)?;
                    }
                    let contract::Details {
                        date,
                        customer_name,
                        customer_email,
                        vehicle,
                        ..
                    } = c.details();
                    write!(
                        f,
                        "{} {date} <{}> {customer_name} <{customer_email}>: \
                         total {}, monthly {}",
                        c.kind(),
                        vehicle.vin,
                        c.total_price().round_cents(),
                        c.monthly_payment(),
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// Writes the provided [`Vehicle`] along with its ID, if any.
fn write_vehicle(f: &mut fmt::Formatter<'_>, v: &Vehicle) -> fmt::Result {
    write!(f, "{v}")?;
    if let Some(id) = v.id {
        write!(f, " [id: {id}]")?;
    }
    Ok(())
}

/// Writes the header of a signed [`Contract`].
fn write_signing(
    f: &mut fmt::Formatter<'_>,
    verb: &str,
    details: &contract::Details,
) -> fmt::Result {
    let contract::Details {
        date,
        customer_name,
        customer_email,
        vehicle,
        ..
    } = details;
    write!(
        f,
        "{verb} <{}> to {customer_name} <{customer_email}> on {date}\
         \n  vehicle price:   {}",
        vehicle.vin, vehicle.price,
    )
}
