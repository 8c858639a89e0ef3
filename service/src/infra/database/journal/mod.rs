//! Flat-file [`Journal`] persisting a [`Memory`] database.
//!
//! [`Memory`]: super::Memory

mod record;

use std::{
    collections::HashSet,
    ffi::OsString,
    io,
    path::{Path, PathBuf},
};

use derive_more::{Display, Error as StdError};
use tokio::{fs, io::AsyncWriteExt as _};
use tracerr::Traced;
use tracing as log;

use crate::domain::{Contract, Vehicle};

pub use self::record::Error as RecordError;

/// Pair of flat files holding the inventory and the signed [`Contract`]s.
///
/// The inventory file holds one [`Vehicle`] per line and is rewritten
/// wholesale. The contracts file holds one record per [`Contract`] and is
/// only appended to.
#[derive(Clone, Debug)]
pub struct Journal {
    /// Path to the inventory file.
    inventory: PathBuf,

    /// Path to the contracts file.
    contracts: PathBuf,
}

impl Journal {
    /// Creates a new [`Journal`] over the provided files.
    ///
    /// The files are not touched until loaded or persisted.
    #[must_use]
    pub fn new(
        inventory: impl Into<PathBuf>,
        contracts: impl Into<PathBuf>,
    ) -> Self {
        Self {
            inventory: inventory.into(),
            contracts: contracts.into(),
        }
    }

    /// Returns the path to the inventory file.
    #[must_use]
    pub fn inventory_path(&self) -> &Path {
        &self.inventory
    }

    /// Returns the path to the contracts file.
    #[must_use]
    pub fn contracts_path(&self) -> &Path {
        &self.contracts
    }

    /// Loads the inventory [`Vehicle`]s and the signed [`Contract`]s.
    ///
    /// Missing files are loaded as empty ones. Malformed lines and
    /// [`Vehicle`]s with duplicated [`Vin`]s are skipped with a warning.
    ///
    /// # Errors
    ///
    /// If failed to read any of the files.
    ///
    /// [`Vin`]: crate::domain::vehicle::Vin
    pub async fn load(
        &self,
    ) -> Result<(Vec<Vehicle>, Vec<Contract>), Traced<Error>> {
        let inventory = read(&self.inventory).await?;
        let mut vins = HashSet::new();
        let vehicles = decode_lines(
            &self.inventory,
            &inventory,
            record::decode_vehicle,
        )
        .filter(|v| {
            let unique = vins.insert(v.vin.clone());
            if !unique {
                log::warn!(
                    "skipping duplicated `Vehicle(vin: {})` in `{}`",
                    v.vin,
                    self.inventory.display(),
                );
            }
            unique
        })
        .collect();

        let contracts = read(&self.contracts).await?;
        let contracts = decode_lines(
            &self.contracts,
            &contracts,
            record::decode_contract,
        )
        .collect();

        Ok((vehicles, contracts))
    }

    /// Persists the provided changes.
    ///
    /// The inventory file is replaced with the provided `inventory` (if any)
    /// first, and then the `appended` [`Contract`]s are appended to the
    /// contracts file. If appending fails, both files are restored to their
    /// previous contents before the error is returned.
    ///
    /// # Errors
    ///
    /// If failed to write any of the files.
    pub async fn persist(
        &self,
        inventory: Option<&[&Vehicle]>,
        appended: &[Contract],
    ) -> Result<(), Traced<Error>> {
        let backup = match inventory {
            Some(vehicles) => Some(self.replace_inventory(vehicles).await?),
            None => None,
        };

        if let Err(e) = self.append_contracts(appended).await {
            if let Some(backup) = backup {
                self.restore_inventory(backup).await;
            }
            return Err(e);
        }

        if let Some(Backup::Saved(path)) = backup {
            if let Err(e) = fs::remove_file(&path).await {
                log::warn!(
                    "failed to remove backup `{}`: {e}",
                    path.display(),
                );
            }
        }
        Ok(())
    }

    /// Replaces the inventory file with the provided [`Vehicle`]s, backing up
    /// the previous one.
    async fn replace_inventory(
        &self,
        vehicles: &[&Vehicle],
    ) -> Result<Backup, Traced<Error>> {
        let mut sorted = vehicles.to_vec();
        sorted.sort_by(|a, b| a.vin.cmp(&b.vin));
        let contents = sorted
            .into_iter()
            .map(|v| record::encode_vehicle(v) + "\n")
            .collect::<String>();

        let temp = sibling(&self.inventory, ".tmp");
        fs::write(&temp, contents)
            .await
            .map_err(Error::at(&temp))
            .map_err(tracerr::wrap!())?;

        let backup = if fs::try_exists(&self.inventory)
            .await
            .map_err(Error::at(&self.inventory))
            .map_err(tracerr::wrap!())?
        {
            let path = sibling(&self.inventory, ".bak");
            fs::rename(&self.inventory, &path)
                .await
                .map_err(Error::at(&path))
                .map_err(tracerr::wrap!())?;
            Backup::Saved(path)
        } else {
            Backup::Absent
        };

        if let Err(e) = fs::rename(&temp, &self.inventory).await {
            self.restore_inventory(backup).await;
            return Err(tracerr::new!(Error::at(&self.inventory)(e)));
        }
        Ok(backup)
    }

    /// Restores the inventory file from the provided [`Backup`].
    ///
    /// Failures are logged only, as there is nothing left to compensate them.
    async fn restore_inventory(&self, backup: Backup) {
        let restored = match &backup {
            Backup::Saved(path) => fs::rename(path, &self.inventory).await,
            Backup::Absent => match fs::remove_file(&self.inventory).await {
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                res => res,
            },
        };
        if let Err(e) = restored {
            log::error!(
                "failed to restore inventory `{}`: {e}",
                self.inventory.display(),
            );
        }
    }

    /// Appends the provided [`Contract`]s to the contracts file.
    ///
    /// On failure, the file is truncated back to its previous length.
    async fn append_contracts(
        &self,
        contracts: &[Contract],
    ) -> Result<(), Traced<Error>> {
        if contracts.is_empty() {
            return Ok(());
        }
        let contents = contracts
            .iter()
            .map(|c| record::encode_contract(c) + "\n")
            .collect::<String>();

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.contracts)
            .await
            .map_err(Error::at(&self.contracts))
            .map_err(tracerr::wrap!())?;
        let len = file
            .metadata()
            .await
            .map_err(Error::at(&self.contracts))
            .map_err(tracerr::wrap!())?
            .len();

        let written = async {
            file.write_all(contents.as_bytes()).await?;
            file.sync_all().await
        }
        .await;
        if let Err(e) = written {
            if let Err(e) = file.set_len(len).await {
                log::error!(
                    "failed to truncate `{}` back: {e}",
                    self.contracts.display(),
                );
            }
            return Err(tracerr::new!(Error::at(&self.contracts)(e)));
        }
        Ok(())
    }
}

/// Backup of the inventory file made while replacing it.
#[derive(Debug)]
enum Backup {
    /// Previous inventory file is moved to the provided path.
    Saved(PathBuf),

    /// There was no inventory file.
    Absent,
}

/// Reads the provided file, treating a missing one as empty.
async fn read(path: &Path) -> Result<String, Traced<Error>> {
    match fs::read_to_string(path).await {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(tracerr::new!(Error::at(path)(e))),
    }
}

/// Decodes the non-blank lines of the provided file `contents`, skipping
/// malformed ones with a warning.
fn decode_lines<'c, T, E: std::fmt::Display>(
    path: &'c Path,
    contents: &'c str,
    decode: impl Fn(&str) -> Result<T, E> + 'c,
) -> impl Iterator<Item = T> + 'c {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(move |(n, line)| match decode(line) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!(
                    "skipping malformed line {} of `{}`: {e}",
                    n + 1,
                    path.display(),
                );
                None
            }
        })
}

/// Returns the path of a file next to the provided one, with the `suffix`
/// appended to its name.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// [`Journal`] error.
#[derive(Debug, Display, StdError)]
#[display("failed to access `{}`: {source}", path.display())]
pub struct Error {
    /// Path to the file failed to be accessed.
    path: PathBuf,

    /// Underlying I/O error.
    source: io::Error,
}

impl Error {
    /// Returns a function creating an [`Error`] of accessing the provided
    /// `path`.
    fn at(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self {
            path: path.to_owned(),
            source,
        }
    }

    /// Returns the path to the file failed to be accessed.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use tempfile::TempDir;
    use tokio::fs;

    use crate::domain::{
        contract::{self, CustomerEmail, CustomerName, Lease, Sale},
        vehicle, Contract, Vehicle,
    };

    use super::{record, Journal};

    fn vehicle(vin: &str) -> Vehicle {
        Vehicle::new(
            vehicle::Vin::new(vin).unwrap(),
            vehicle::Year::new(2022).unwrap(),
            vehicle::Make::new("Toyota").unwrap(),
            vehicle::Model::new("RAV4").unwrap(),
            vehicle::Kind::Suv,
            vehicle::Color::new("Blue").unwrap(),
            vehicle::Odometer::from(25_000),
            vehicle::Price::from_str("31000.00").unwrap(),
        )
        .with_id(vehicle::Id::new())
    }

    fn lease(vin: &str) -> Contract {
        Contract::from(Lease::new(
            contract::Date::from_ymd(2024, 3, 15).unwrap(),
            CustomerName::new("Jane Doe").unwrap(),
            CustomerEmail::new("jane@example.com").unwrap(),
            vehicle(vin),
        ))
    }

    fn journal(dir: &TempDir) -> Journal {
        Journal::new(
            dir.path().join("inventory.csv"),
            dir.path().join("contracts.csv"),
        )
    }

    #[tokio::test]
    async fn loads_missing_files_as_empty() {
        let dir = TempDir::new().unwrap();

        let (vehicles, contracts) = journal(&dir).load().await.unwrap();

        assert!(vehicles.is_empty());
        assert!(contracts.is_empty());
    }

    #[tokio::test]
    async fn persists_and_loads_back() {
        let dir = TempDir::new().unwrap();
        let journal = journal(&dir);
        let (v1, v2) = (vehicle("V1"), vehicle("V2"));

        journal.persist(Some(&[&v2, &v1][..]), &[]).await.unwrap();
        journal.persist(None, &[lease("V3")]).await.unwrap();
        journal
            .persist(
                Some(&[&v2][..]),
                &[Contract::from(Sale::new(
                    contract::Date::from_ymd(2024, 3, 16).unwrap(),
                    CustomerName::new("John Roe").unwrap(),
                    CustomerEmail::new("john@example.com").unwrap(),
                    v1.clone(),
                    false,
                ))],
            )
            .await
            .unwrap();

        let (vehicles, contracts) = journal.load().await.unwrap();
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].vin, v2.vin);
        assert_eq!(vehicles[0].id, v2.id);
        assert_eq!(
            contracts.iter().map(Contract::kind).collect::<Vec<_>>(),
            [contract::Kind::Lease, contract::Kind::Sale],
        );
        assert_eq!(contracts[1].vehicle().vin, v1.vin);

        assert!(!fs::try_exists(dir.path().join("inventory.csv.bak"))
            .await
            .unwrap());
        assert!(!fs::try_exists(dir.path().join("inventory.csv.tmp"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn skips_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let journal = journal(&dir);
        fs::write(
            journal.inventory_path(),
            "|V1|2022|Toyota|RAV4|SUV|Blue|25000|31000.00\n\
             broken line\n\
             \n\
             |V2|2022|Toyota|RAV4|SUV|Blue|25000|-1\n\
             |V1|2020|Honda|Civic|CAR|Red|1000|9000.00\n\
             |V3|2021|Honda|Civic|CAR|Red|1000|9000.00\n",
        )
        .await
        .unwrap();
        fs::write(
            journal.contracts_path(),
            "2024-03-15|LEASE|Jane Doe|jane@example.com|V9|17770.00|524.64\n\
             SALE|20240315|Jane Doe\n",
        )
        .await
        .unwrap();

        let (vehicles, contracts) = journal.load().await.unwrap();

        assert_eq!(
            vehicles.iter().map(|v| v.vin.as_str()).collect::<Vec<_>>(),
            ["V1", "V3"],
        );
        assert_eq!(vehicles[0].make.as_str(), "Toyota");
        assert_eq!(contracts.len(), 1);
        assert_eq!(contracts[0].vehicle().vin.as_str(), "V9");
    }

    #[tokio::test]
    async fn restores_inventory_when_append_fails() {
        let dir = TempDir::new().unwrap();
        let contracts = dir.path().join("contracts");
        fs::create_dir(&contracts).await.unwrap();
        let journal = Journal::new(dir.path().join("inventory.csv"), contracts);
        let (v1, v2) = (vehicle("V1"), vehicle("V2"));
        journal.persist(Some(&[&v1, &v2][..]), &[]).await.unwrap();

        let res = journal.persist(Some(&[&v2][..]), &[lease("V1")]).await;

        assert!(res.is_err());
        let inventory =
            fs::read_to_string(journal.inventory_path()).await.unwrap();
        let vins = inventory
            .lines()
            .map(|l| record::decode_vehicle(l).unwrap().vin)
            .collect::<Vec<_>>();
        assert_eq!(vins, [v1.vin, v2.vin]);
        assert!(!fs::try_exists(dir.path().join("inventory.csv.bak"))
            .await
            .unwrap());
    }
}
