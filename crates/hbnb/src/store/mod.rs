//! # Storage
//!
//! Storage is split in two layers:
//!
//! - [`StorageBackend`]: raw documents per [`EntityKind`]. [`MemBackend`] keeps them
//!   in `RefCell`ed maps, [`SqliteBackend`] in one SQLite table per kind.
//! - [`EntityStore`]: implements the typed [`DataStore`] contract on top of any
//!   backend (serialization, merge-on-update, attribute lookups).
//!
//! Commands and the API are generic over `S: DataStore`:
//! - Production: [`SqliteStore`], or a runtime-selected `EntityStore<Box<dyn StorageBackend>>`
//! - Testing: [`InMemoryStore`]
//!
//! ## Deleted entities
//!
//! The store does not hide soft-deleted entities except where a backend chooses
//! to in `get_all` (SQLite does, memory does not). Hiding them from default
//! queries is the command layer's job.

pub mod backend;
pub mod criteria;
pub mod entity_store;
pub mod mem_backend;
pub mod memory;
pub mod migrations;
pub mod sqlite_backend;

pub use backend::StorageBackend;
pub use criteria::{AttrFilter, Criteria, FilterOp};
pub use entity_store::EntityStore;
pub use mem_backend::MemBackend;
pub use memory::InMemoryStore;
pub use sqlite_backend::SqliteBackend;

use crate::error::Result;
use crate::model::{Entity, EntityKind, FieldMap};
use crate::validation::ReferenceLookup;

pub type SqliteStore = EntityStore<SqliteBackend>;

/// Result of an attribute lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Matches<E> {
    /// `multiple == false`: the first match in insertion order, if any.
    First(Option<E>),
    /// `multiple == true`: every match, possibly none.
    All(Vec<E>),
}

impl<E> Matches<E> {
    pub fn into_first(self) -> Option<E> {
        match self {
            Matches::First(first) => first,
            Matches::All(all) => all.into_iter().next(),
        }
    }

    pub fn into_vec(self) -> Vec<E> {
        match self {
            Matches::First(first) => first.into_iter().collect(),
            Matches::All(all) => all,
        }
    }
}

/// Typed storage contract, parameterized per call by entity kind.
pub trait DataStore {
    /// Persist a new entity. Fails with a conflict if the id already exists.
    fn add<E: Entity>(&self, entity: &E) -> Result<E>;

    fn get<E: Entity>(&self, id: &str) -> Result<Option<E>>;

    fn get_all<E: Entity>(&self) -> Result<Vec<E>>;

    /// Merge `fields` into the stored entity. `Ok(None)` if there is none.
    fn update<E: Entity>(&self, id: &str, fields: &FieldMap) -> Result<Option<E>>;

    /// Physical removal. `Ok(false)` if there was nothing to remove.
    fn delete<E: Entity>(&self, id: &str) -> Result<bool>;

    /// Lookup by attribute values. Zero matches is never an error.
    fn get_by_attribute<E: Entity>(&self, criteria: &Criteria, multiple: bool) -> Result<Matches<E>>;

    /// True if the entity exists and is not soft-deleted.
    fn contains(&self, kind: EntityKind, id: &str) -> Result<bool>;

    fn find_first<E: Entity>(&self, criteria: &Criteria) -> Result<Option<E>> {
        Ok(self.get_by_attribute(criteria, false)?.into_first())
    }

    fn find_all<E: Entity>(&self, criteria: &Criteria) -> Result<Vec<E>> {
        Ok(self.get_by_attribute(criteria, true)?.into_vec())
    }
}

impl<S: DataStore> ReferenceLookup for S {
    fn exists(&self, kind: EntityKind, id: &str) -> Result<bool> {
        self.contains(kind, id)
    }
}
