//! Domain records returned by the pet lookup.
//!
//! Field names serialize in camelCase to match the column names of the
//! relational schema (`ownerId`), so the JSON a client sees mirrors the stored
//! row.

use serde::{Deserialize, Serialize};

/// An owner row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
}

/// A pet row, without its relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub species: Option<String>,
    /// Foreign key into `Owner`; `None` for unowned pets.
    pub owner_id: Option<i64>,
}

/// A pet with its owner eagerly included.
///
/// Serializes flat: the pet's own fields followed by `owner`, which is `null`
/// when the pet has no owner or the referenced owner row does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetWithOwner {
    #[serde(flatten)]
    pub pet: Pet,
    pub owner: Option<Owner>,
}
