//! [`Vehicle`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{vehicle, Vehicle},
    infra::{
        database::{
            self,
            postgres::{Connection, Pattern},
            Postgres,
        },
        Database,
    },
    read,
};

/// Columns of a [`Vehicle`] row, read by [`from_row()`].
const COLUMNS: &str = "\
    id, vin, year, make, model, kind, color, odometer, price";

/// Reads a [`Vehicle`] out of the provided row having the [`COLUMNS`].
#[expect(unsafe_code, reason = "bypass")]
pub(super) fn from_row(row: &Row) -> Vehicle {
    let year = u16::try_from(row.get::<_, i32>("year"))
        .expect("`year` overflow");
    let odometer = u32::try_from(row.get::<_, i64>("odometer"))
        .expect("`odometer` overflow");
    Vehicle {
        id: row.get("id"),
        vin: row.get("vin"),
        // SAFETY: Stored years were validated on insert, while the calendar
        //         could move on since then.
        year: unsafe { vehicle::Year::new_unchecked(year) },
        make: row.get("make"),
        model: row.get("model"),
        kind: row.get("kind"),
        color: row.get("color"),
        odometer: odometer.into(),
        price: row.get("price"),
    }
}

impl<C> Database<Select<By<Option<Vehicle>, vehicle::Vin>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Vehicle>, vehicle::Vin>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let vin: vehicle::Vin = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM vehicles \
             WHERE vin = $1::VARCHAR",
        );
        Ok(self
            .query_opt(&sql, &[&vin])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Vehicle>, read::vehicle::list::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Vehicle>, read::vehicle::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        use read::vehicle::list::Filter as F;

        let filter = by.into_inner();

        let (from_num, to_num): (i64, i64);
        let (from_price, to_price);
        let (first, second);
        let kind;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let (condition, ordering) = match &filter {
            F::All => (vec![], "make COLLATE \"C\", model COLLATE \"C\""),
            F::Price(range) => {
                from_price = *range.start();
                to_price = *range.end();
                ps.push(&from_price);
                ps.push(&to_price);
                (vec!["price BETWEEN $1::NUMERIC AND $2::NUMERIC"], "price")
            }
            F::MakeModel { make, model } => {
                first = Pattern::containing(make);
                second = Pattern::containing(model);
                ps.push(&first);
                ps.push(&second);
                (
                    vec!["make ILIKE $1::VARCHAR", "model ILIKE $2::VARCHAR"],
                    "make COLLATE \"C\", model COLLATE \"C\"",
                )
            }
            F::Year(range) => {
                from_num = i64::from(*range.start());
                to_num = i64::from(*range.end());
                ps.push(&from_num);
                ps.push(&to_num);
                (vec!["year BETWEEN $1::INT8 AND $2::INT8"], "year DESC")
            }
            F::Color(color) => {
                first = Pattern::containing(color);
                ps.push(&first);
                (
                    vec!["color ILIKE $1::VARCHAR"],
                    "make COLLATE \"C\", model COLLATE \"C\"",
                )
            }
            F::Mileage(range) => {
                from_num = i64::from(*range.start());
                to_num = i64::from(*range.end());
                ps.push(&from_num);
                ps.push(&to_num);
                (vec!["odometer BETWEEN $1::INT8 AND $2::INT8"], "odometer")
            }
            F::Kind(k) => {
                kind = *k;
                ps.push(&kind);
                (
                    vec!["kind = $1::INT2"],
                    "make COLLATE \"C\", model COLLATE \"C\"",
                )
            }
        };

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM vehicles \
             WHERE true \
                   {condition} \
             ORDER BY {ordering}, \
                      vin COLLATE \"C\"",
            condition = condition
                .into_iter()
                .format_with("", |c, f| f(&format_args!("AND {c} "))),
        );
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Vehicle>> for Postgres<C>
where
    C: Connection,
{
    type Ok = vehicle::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(vehicle): Insert<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        let Vehicle {
            id,
            vin,
            year,
            make,
            model,
            kind,
            color,
            odometer,
            price,
        } = vehicle;
        let id = id.unwrap_or_else(vehicle::Id::new);

        const SQL: &str = "\
            INSERT INTO vehicles (id, vin, year, make, model, kind, color, \
                                  odometer, price) \
            VALUES ($1::UUID, $2::VARCHAR, $3::INT4, $4::VARCHAR, \
                    $5::VARCHAR, $6::INT2, $7::VARCHAR, $8::INT8, \
                    $9::NUMERIC)";
        self.exec(
            SQL,
            &[
                &id,
                &vin,
                &i32::from(year.get()),
                &make,
                &model,
                &kind,
                &color,
                &i64::from(odometer.get()),
                &price,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|_| id)
    }
}

impl<C> Database<Delete<By<Vehicle, vehicle::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vehicle, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: vehicle::Id = by.into_inner();

        let sql = format!(
            "DELETE FROM vehicles \
             WHERE id = $1::UUID \
             RETURNING {COLUMNS}",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Delete<By<Vehicle, vehicle::Vin>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vehicle, vehicle::Vin>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let vin: vehicle::Vin = by.into_inner();

        let sql = format!(
            "DELETE FROM vehicles \
             WHERE vin = $1::VARCHAR \
             RETURNING {COLUMNS}",
        );
        Ok(self
            .query_opt(&sql, &[&vin])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Lock<By<Vehicle, vehicle::Vin>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Vehicle, vehicle::Vin>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let vin: vehicle::Vin = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM vehicles \
            WHERE vin = $1::VARCHAR \
            FOR UPDATE";
        self.query(SQL, &[&vin])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
