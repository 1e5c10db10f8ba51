use super::{PetRepository, StoreError};
use crate::config::DatabaseConfig;
use crate::model::{Owner, Pet, PetWithOwner};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Single round trip: the owner is LEFT JOINed so unowned pets still resolve.
const FIND_PET_WITH_OWNER: &str = "SELECT p.id, p.name, p.species, p.ownerId, \
     o.id, o.name, o.email \
     FROM Pet p LEFT JOIN Owner o ON o.id = p.ownerId \
     WHERE p.id = ?1";

/// SQLite-backed [`PetRepository`].
///
/// Holds one connection shared by every handler coroutine. Statements are
/// cached on the connection, so repeated lookups skip re-preparation.
pub struct SqlitePetStore {
    conn: Mutex<Connection>,
}

impl SqlitePetStore {
    /// Open the database described by `config`.
    ///
    /// Fails if the file cannot be opened or the lookup statement does not
    /// compile against its schema.
    pub fn open(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let flags = if config.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX
        };
        let open_err = |source: rusqlite::Error| StoreError::Open {
            path: config.path.clone(),
            source,
        };
        let conn = Connection::open_with_flags(&config.path, flags).map_err(open_err)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .map_err(open_err)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(open_err)?;
        Self::verify_schema(&conn).map_err(open_err)?;

        info!(
            path = %config.path.display(),
            read_only = config.read_only,
            busy_timeout_ms = config.busy_timeout_ms,
            "Pet store opened"
        );
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Wrap an already-open connection. The schema is still verified.
    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        Self::verify_schema(&conn).map_err(|source| StoreError::Open {
            path: PathBuf::from(conn.path().filter(|p| !p.is_empty()).unwrap_or(":memory:")),
            source,
        })?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn verify_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
        conn.prepare_cached(FIND_PET_WITH_OWNER).map(|_| ())
    }
}

fn pet_with_owner_from_row(row: &Row<'_>) -> rusqlite::Result<PetWithOwner> {
    let pet = Pet {
        id: row.get(0)?,
        name: row.get(1)?,
        species: row.get(2)?,
        owner_id: row.get(3)?,
    };
    let owner = match row.get::<_, Option<i64>>(4)? {
        Some(id) => Some(Owner {
            id,
            name: row.get(5)?,
            email: row.get(6)?,
        }),
        None => None,
    };
    Ok(PetWithOwner { pet, owner })
}

impl PetRepository for SqlitePetStore {
    fn find_pet_with_owner(&self, id: i64) -> Result<Option<PetWithOwner>, StoreError> {
        let start = Instant::now();
        let conn = self.conn.lock().map_err(|_| StoreError::Unavailable)?;
        let mut stmt = conn.prepare_cached(FIND_PET_WITH_OWNER)?;
        let record = stmt
            .query_row(params![id], pet_with_owner_from_row)
            .optional()?;

        debug!(
            pet_id = id,
            found = record.is_some(),
            query_us = start.elapsed().as_micros() as u64,
            "Pet lookup"
        );
        Ok(record)
    }
}
