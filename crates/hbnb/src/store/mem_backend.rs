use super::backend::StorageBackend;
use super::criteria::Criteria;
use crate::error::{HbnbError, Result};
use crate::model::{EntityKind, FieldMap};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

struct Slot {
    seq: u64,
    doc: FieldMap,
}

/// In-memory storage backend.
///
/// Uses `RefCell` for interior mutability so the `StorageBackend` trait can use
/// `&self` everywhere. This makes the backend `!Sync`: it is meant for a single
/// thread (tests, embedding, one request at a time). Sharing it across threads
/// needs an outer lock supplied by the caller.
///
/// `fetch_all` returns deleted documents too.
pub struct MemBackend {
    tables: RefCell<HashMap<EntityKind, HashMap<String, Slot>>>,
    next_seq: Cell<u64>,
    writes_left: Cell<Option<usize>>,
}

impl Default for MemBackend {
    fn default() -> Self {
        Self {
            tables: RefCell::new(HashMap::new()),
            next_seq: Cell::new(0),
            writes_left: Cell::new(None),
        }
    }
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.writes_left.set(if simulate { Some(0) } else { None });
    }

    /// Let `count` more writes succeed, then fail every write after that.
    pub fn fail_writes_after(&self, count: usize) {
        self.writes_left.set(Some(count));
    }

    fn check_write(&self) -> Result<()> {
        match self.writes_left.get() {
            Some(0) => Err(HbnbError::Store("Simulated write error".to_string())),
            Some(n) => {
                self.writes_left.set(Some(n - 1));
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn ordered<F>(&self, kind: EntityKind, keep: F) -> Vec<FieldMap>
    where
        F: Fn(&FieldMap) -> bool,
    {
        let tables = self.tables.borrow();
        let Some(table) = tables.get(&kind) else {
            return Vec::new();
        };
        let mut slots: Vec<&Slot> = table.values().filter(|s| keep(&s.doc)).collect();
        slots.sort_by_key(|s| s.seq);
        slots.into_iter().map(|s| s.doc.clone()).collect()
    }
}

impl StorageBackend for MemBackend {
    fn insert(&self, kind: EntityKind, id: &str, doc: &FieldMap) -> Result<bool> {
        if self
            .tables
            .borrow()
            .get(&kind)
            .is_some_and(|t| t.contains_key(id))
        {
            return Ok(false);
        }
        self.check_write()?;
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.tables.borrow_mut().entry(kind).or_default().insert(
            id.to_string(),
            Slot {
                seq,
                doc: doc.clone(),
            },
        );
        Ok(true)
    }

    fn fetch(&self, kind: EntityKind, id: &str) -> Result<Option<FieldMap>> {
        let tables = self.tables.borrow();
        Ok(tables
            .get(&kind)
            .and_then(|t| t.get(id))
            .map(|s| s.doc.clone()))
    }

    fn fetch_all(&self, kind: EntityKind) -> Result<Vec<FieldMap>> {
        Ok(self.ordered(kind, |_| true))
    }

    fn scan(&self, kind: EntityKind, criteria: &Criteria) -> Result<Vec<FieldMap>> {
        Ok(self.ordered(kind, |doc| criteria.matches(doc)))
    }

    fn replace(&self, kind: EntityKind, id: &str, doc: &FieldMap) -> Result<bool> {
        self.check_write()?;
        let mut tables = self.tables.borrow_mut();
        match tables.get_mut(&kind).and_then(|t| t.get_mut(id)) {
            Some(slot) => {
                slot.doc = doc.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove(&self, kind: EntityKind, id: &str) -> Result<bool> {
        self.check_write()?;
        let mut tables = self.tables.borrow_mut();
        Ok(tables
            .get_mut(&kind)
            .and_then(|t| t.remove(id))
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, deleted: bool) -> FieldMap {
        json!({"id": id, "is_deleted": deleted})
            .as_object()
            .unwrap()
            .clone()
    }

    #[test]
    fn insert_refuses_duplicates() {
        let backend = MemBackend::new();
        assert!(backend.insert(EntityKind::Amenity, "a", &doc("a", false)).unwrap());
        assert!(!backend.insert(EntityKind::Amenity, "a", &doc("a", false)).unwrap());
        assert!(backend.insert(EntityKind::Review, "a", &doc("a", false)).unwrap());
    }

    #[test]
    fn fetch_all_keeps_insertion_order_and_deleted() {
        let backend = MemBackend::new();
        for (id, deleted) in [("z", false), ("a", true), ("m", false)] {
            backend.insert(EntityKind::Listing, id, &doc(id, deleted)).unwrap();
        }
        let ids: Vec<String> = backend
            .fetch_all(EntityKind::Listing)
            .unwrap()
            .iter()
            .map(|d| d["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[test]
    fn replace_and_remove_report_missing() {
        let backend = MemBackend::new();
        assert!(!backend.replace(EntityKind::Listing, "x", &doc("x", false)).unwrap());
        assert!(!backend.remove(EntityKind::Listing, "x").unwrap());
    }

    #[test]
    fn simulated_write_errors() {
        let backend = MemBackend::new();
        backend.fail_writes_after(1);
        assert!(backend.insert(EntityKind::Account, "a", &doc("a", false)).is_ok());
        assert!(backend.insert(EntityKind::Account, "b", &doc("b", false)).is_err());
        // reads are unaffected
        assert!(backend.fetch(EntityKind::Account, "a").unwrap().is_some());

        backend.set_simulate_write_error(false);
        assert!(backend.remove(EntityKind::Account, "a").unwrap());
    }
}
