use super::backend::StorageBackend;
use super::criteria::Criteria;
use super::{DataStore, Matches};
use crate::error::{HbnbError, Result};
use crate::model::{from_document, Entity, EntityKind, FieldMap};
use tracing::debug;

/// Typed entity storage over any raw backend.
pub struct EntityStore<B: StorageBackend> {
    /// The underlying storage backend.
    pub(crate) backend: B,
}

impl<B: StorageBackend> EntityStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: StorageBackend> DataStore for EntityStore<B> {
    fn add<E: Entity>(&self, entity: &E) -> Result<E> {
        let doc = entity.to_fields()?;
        if !self.backend.insert(E::KIND, entity.id(), &doc)? {
            return Err(HbnbError::Conflict(format!(
                "{} with ID {} already exists",
                E::KIND,
                entity.id()
            )));
        }
        debug!("stored {} {}", E::KIND, entity.id());
        Ok(entity.clone())
    }

    fn get<E: Entity>(&self, id: &str) -> Result<Option<E>> {
        self.backend
            .fetch(E::KIND, id)?
            .map(from_document)
            .transpose()
    }

    fn get_all<E: Entity>(&self) -> Result<Vec<E>> {
        self.backend
            .fetch_all(E::KIND)?
            .into_iter()
            .map(from_document)
            .collect()
    }

    fn update<E: Entity>(&self, id: &str, fields: &FieldMap) -> Result<Option<E>> {
        let Some(mut doc) = self.backend.fetch(E::KIND, id)? else {
            return Ok(None);
        };
        for (name, value) in fields {
            if name != "id" {
                doc.insert(name.clone(), value.clone());
            }
        }
        // Decode before writing so a bad patch leaves the stored row untouched.
        let entity: E = from_document(doc.clone())?;
        if !self.backend.replace(E::KIND, id, &doc)? {
            return Ok(None);
        }
        debug!("updated {} {} ({} field(s))", E::KIND, id, fields.len());
        Ok(Some(entity))
    }

    fn delete<E: Entity>(&self, id: &str) -> Result<bool> {
        let removed = self.backend.remove(E::KIND, id)?;
        if removed {
            debug!("removed {} {}", E::KIND, id);
        }
        Ok(removed)
    }

    fn get_by_attribute<E: Entity>(&self, criteria: &Criteria, multiple: bool) -> Result<Matches<E>> {
        let docs = self.backend.scan(E::KIND, criteria)?;
        if multiple {
            let all = docs.into_iter().map(from_document).collect::<Result<Vec<E>>>()?;
            Ok(Matches::All(all))
        } else {
            let first = docs.into_iter().next().map(from_document).transpose()?;
            Ok(Matches::First(first))
        }
    }

    fn contains(&self, kind: EntityKind, id: &str) -> Result<bool> {
        Ok(self.backend.fetch(kind, id)?.is_some_and(|doc| {
            !doc.get("is_deleted")
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
        }))
    }
}
