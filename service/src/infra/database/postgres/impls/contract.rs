//! [`Contract`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{
        contract::{self, Lease, Sale},
        Contract,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C> Database<Insert<Contract>> for Postgres<C>
where
    C: Connection,
{
    type Ok = contract::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(contract): Insert<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = contract.id().unwrap_or_else(contract::Id::new);
        let financed = match &contract {
            Contract::Sale(sale) => Some(sale.is_financed()),
            Contract::Lease(_) => None,
        };
        let contract::Details {
            date,
            customer_name,
            customer_email,
            vehicle: v,
            ..
        } = contract.details();

        const SQL: &str = "\
            INSERT INTO contracts (id, kind, date, \
                                   customer_name, customer_email, \
                                   vehicle_id, vin, year, make, model, \
                                   vehicle_kind, color, odometer, price, \
                                   financed, total_price, monthly_payment) \
            VALUES ($1::UUID, $2::INT2, $3::DATE, \
                    $4::VARCHAR, $5::VARCHAR, \
                    $6::UUID, $7::VARCHAR, $8::INT4, $9::VARCHAR, \
                    $10::VARCHAR, $11::INT2, $12::VARCHAR, $13::INT8, \
                    $14::NUMERIC, \
                    $15::BOOLEAN, $16::NUMERIC, $17::NUMERIC)";
        self.exec(
            SQL,
            &[
                &id,
                &contract.kind(),
                date,
                customer_name,
                customer_email,
                &v.id,
                &v.vin,
                &i32::from(v.year.get()),
                &v.make,
                &v.model,
                &v.kind,
                &v.color,
                &i64::from(v.odometer.get()),
                &v.price,
                &financed,
                &contract.total_price(),
                &contract.monthly_payment(),
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|_| id)
    }
}

impl<C> Database<Select<By<Vec<Contract>, read::contract::list::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Contract>, read::contract::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::contract::list::Filter { kind, vin } = by.into_inner();

        const SQL: &str = "\
            SELECT id AS contract_id, kind AS contract_kind, date, \
                   customer_name, customer_email, financed, \
                   vehicle_id AS id, vin, year, make, model, \
                   vehicle_kind AS kind, color, odometer, price \
            FROM contracts \
            WHERE ($1::INT2 IS NULL OR contracts.kind = $1::INT2) \
              AND ($2::VARCHAR IS NULL OR contracts.vin = $2::VARCHAR) \
            ORDER BY seq";
        Ok(self
            .query(SQL, &[&kind, &vin])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let id = row.get("contract_id");
                let date = row.get("date");
                let name = row.get("customer_name");
                let email = row.get("customer_email");
                let vehicle = super::vehicle::from_row(row);
                match row.get("contract_kind") {
                    contract::Kind::Sale => Contract::from(Sale::new(
                        date,
                        name,
                        email,
                        vehicle,
                        row.get::<_, Option<bool>>("financed")
                            .unwrap_or_default(),
                    )),
                    contract::Kind::Lease => {
                        Contract::from(Lease::new(date, name, email, vehicle))
                    }
                }
                .with_id(id)
            })
            .collect())
    }
}
