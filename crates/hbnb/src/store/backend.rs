use super::criteria::Criteria;
use crate::error::Result;
use crate::model::{EntityKind, FieldMap};

/// Abstract interface for raw document storage.
/// This trait handles the "how" of storage (SQLite vs memory),
/// while EntityStore handles the "what" (typed entities, merge semantics).
///
/// Documents are the JSON object form of an entity, meta fields included.
pub trait StorageBackend {
    /// Store a new document. Returns false, writing nothing, if `id` is taken.
    fn insert(&self, kind: EntityKind, id: &str, doc: &FieldMap) -> Result<bool>;

    /// Load one document by id, deleted or not.
    fn fetch(&self, kind: EntityKind, id: &str) -> Result<Option<FieldMap>>;

    /// Load every document of a kind, in insertion order.
    /// Backends may leave out soft-deleted documents here; callers that need
    /// them use `scan` or `fetch`.
    fn fetch_all(&self, kind: EntityKind) -> Result<Vec<FieldMap>>;

    /// Every document of a kind matching `criteria`, deleted ones included,
    /// in insertion order.
    fn scan(&self, kind: EntityKind, criteria: &Criteria) -> Result<Vec<FieldMap>>;

    /// Overwrite an existing document. Returns false if there was none.
    fn replace(&self, kind: EntityKind, id: &str, doc: &FieldMap) -> Result<bool>;

    /// Physically remove a document. Returns false if there was none.
    fn remove(&self, kind: EntityKind, id: &str) -> Result<bool>;
}

/// Lets the backend be chosen at runtime from configuration.
impl StorageBackend for Box<dyn StorageBackend> {
    fn insert(&self, kind: EntityKind, id: &str, doc: &FieldMap) -> Result<bool> {
        (**self).insert(kind, id, doc)
    }

    fn fetch(&self, kind: EntityKind, id: &str) -> Result<Option<FieldMap>> {
        (**self).fetch(kind, id)
    }

    fn fetch_all(&self, kind: EntityKind) -> Result<Vec<FieldMap>> {
        (**self).fetch_all(kind)
    }

    fn scan(&self, kind: EntityKind, criteria: &Criteria) -> Result<Vec<FieldMap>> {
        (**self).scan(kind, criteria)
    }

    fn replace(&self, kind: EntityKind, id: &str, doc: &FieldMap) -> Result<bool> {
        (**self).replace(kind, id, doc)
    }

    fn remove(&self, kind: EntityKind, id: &str) -> Result<bool> {
        (**self).remove(kind, id)
    }
}
