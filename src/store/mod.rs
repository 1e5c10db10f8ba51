//! # Store Module
//!
//! Data access for the pet lookup. Handlers depend on the [`PetRepository`]
//! trait, never on a concrete database, so the client is injected at startup
//! and its lifecycle (open at boot, close when the last handle drops) belongs
//! to the hosting process.
//!
//! [`SqlitePetStore`] is the production implementation.

mod sqlite;

pub use sqlite::SqlitePetStore;

use crate::model::PetWithOwner;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the data layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened or its schema does not match.
    #[error("failed to open pet store at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    /// A query failed after the store was opened.
    #[error("pet store query failed: {0}")]
    Query(#[from] rusqlite::Error),
    /// The shared connection cannot be used (a previous holder panicked).
    #[error("pet store connection is unavailable")]
    Unavailable,
}

/// Read access to pets and their owners.
pub trait PetRepository: Send + Sync {
    /// Point lookup by primary key with the owner joined in the same query.
    ///
    /// Returns `Ok(None)` when no pet has the given id.
    fn find_pet_with_owner(&self, id: i64) -> Result<Option<PetWithOwner>, StoreError>;
}
