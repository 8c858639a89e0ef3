//! [`Args`] definitions.

use clap::Parser;
use common::Money;
use service::{
    domain::{
        contract::{self, CustomerEmail, CustomerName},
        vehicle, Vehicle,
    },
    read,
};

/// Contract desk of a car dealership.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// [`Action`] to perform.
    #[command(subcommand)]
    pub action: Action,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

/// Action to perform on the dealership.
#[derive(Debug, clap::Subcommand)]
pub enum Action {
    /// Lists every vehicle in the inventory.
    List,

    /// Searches the inventory by a criterion.
    #[command(subcommand)]
    Search(Search),

    /// Shows the vehicle with the provided VIN.
    Show {
        /// VIN of the vehicle.
        vin: vehicle::Vin,
    },

    /// Adds a new vehicle to the inventory.
    Add(NewVehicle),

    /// Removes the vehicle with the provided ID from the inventory.
    Remove {
        /// ID of the vehicle.
        id: vehicle::Id,
    },

    /// Sells a vehicle from the inventory.
    Sell {
        /// Customer signing the contract.
        #[command(flatten)]
        signing: Signing,

        /// Whether the vehicle is paid by monthly installments.
        #[arg(long)]
        financed: bool,
    },

    /// Leases a vehicle from the inventory.
    Lease {
        /// Customer signing the contract.
        #[command(flatten)]
        signing: Signing,
    },

    /// Lists the signed contracts.
    Contracts {
        /// Kind of contracts to list (`sale` or `lease`).
        #[arg(long)]
        kind: Option<contract::Kind>,

        /// VIN of the transacted vehicle.
        #[arg(long)]
        vin: Option<vehicle::Vin>,
    },
}

/// Criterion to search the inventory by.
#[derive(Debug, clap::Subcommand)]
pub enum Search {
    /// Vehicles priced in the inclusive range, cheapest first.
    Price {
        /// Minimum price.
        min: Money,

        /// Maximum price.
        max: Money,
    },

    /// Vehicles whose make and model contain the fragments.
    MakeModel {
        /// Fragment of the make.
        make: String,

        /// Fragment of the model.
        #[arg(default_value = "")]
        model: String,
    },

    /// Vehicles produced in the inclusive range, newest first.
    Year {
        /// Earliest year.
        min: u16,

        /// Latest year.
        max: u16,
    },

    /// Vehicles whose color contains the fragment.
    Color {
        /// Fragment of the color.
        color: String,
    },

    /// Vehicles with odometer reading in the inclusive range.
    Mileage {
        /// Minimum reading.
        min: u32,

        /// Maximum reading.
        max: u32,
    },

    /// Vehicles of the body type (`car`, `truck`, `suv` or `van`).
    Type {
        /// Body type.
        kind: vehicle::Kind,
    },
}

impl From<Search> for read::vehicle::list::Filter {
    fn from(search: Search) -> Self {
        match search {
            Search::Price { min, max } => Self::Price(min..=max),
            Search::MakeModel { make, model } => Self::MakeModel { make, model },
            Search::Year { min, max } => Self::Year(min..=max),
            Search::Color { color } => Self::Color(color),
            Search::Mileage { min, max } => Self::Mileage(min..=max),
            Search::Type { kind } => Self::Kind(kind),
        }
    }
}

/// Attributes of a [`Vehicle`] to add.
#[derive(Debug, clap::Args)]
pub struct NewVehicle {
    /// VIN of the vehicle.
    #[arg(long)]
    pub vin: vehicle::Vin,

    /// Production year.
    #[arg(long)]
    pub year: vehicle::Year,

    /// Make.
    #[arg(long)]
    pub make: vehicle::Make,

    /// Model.
    #[arg(long)]
    pub model: vehicle::Model,

    /// Body type (`car`, `truck`, `suv` or `van`).
    #[arg(long = "type")]
    pub kind: vehicle::Kind,

    /// Color.
    #[arg(long)]
    pub color: vehicle::Color,

    /// Odometer reading.
    #[arg(long, default_value_t = vehicle::Odometer::default())]
    pub odometer: vehicle::Odometer,

    /// Tax-exclusive price.
    #[arg(long)]
    pub price: vehicle::Price,
}

impl From<NewVehicle> for Vehicle {
    fn from(v: NewVehicle) -> Self {
        let NewVehicle {
            vin,
            year,
            make,
            model,
            kind,
            color,
            odometer,
            price,
        } = v;
        Self::new(vin, year, make, model, kind, color, odometer, price)
    }
}

/// Customer signing a contract about a vehicle.
#[derive(Debug, clap::Args)]
pub struct Signing {
    /// VIN of the vehicle.
    pub vin: vehicle::Vin,

    /// Full name of the customer.
    #[arg(long)]
    pub name: CustomerName,

    /// Email of the customer.
    #[arg(long)]
    pub email: CustomerEmail,

    /// Date of the contract (`yyyy-MM-dd`), today if omitted.
    #[arg(long)]
    pub date: Option<contract::Date>,
}
