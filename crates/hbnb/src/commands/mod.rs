//! # Command Layer
//!
//! The entity lifecycle logic. Each operation lives in its own submodule as
//! plain functions generic over the entity type `E: Entity` and the store
//! `S: DataStore`, taking a [`Context`] with the store and credential hasher.
//!
//! ## Role and Responsibilities
//!
//! - Validate proposed fields against the entity's rule table
//! - Enforce uniqueness and the entity-specific checks in [`Entity::prepare`]
//! - Stamp and advance timestamps
//! - Run cascade plans on soft and hard delete
//! - Hide soft-deleted entities from default queries
//!
//! ## Failure Semantics
//!
//! Validation and reference checks happen before any write. Cascades are a
//! sequence of independent writes: when a step fails, its error is returned
//! and the steps before it stay applied.
//!
//! ## Testing Strategy
//!
//! Command tests use `InMemoryStore`, seeded through `StoreFixture`. Failure
//! paths use `MemBackend::fail_writes_after`.
//!
//! ## Command Modules
//!
//! - [`create`]: Validated construction
//! - [`get`]: Must-exist lookup and listing by kind
//! - [`update`]: Partial updates and `save`
//! - [`delete`]: Soft delete
//! - [`purge`]: Hard delete
//! - [`cascade`]: Cascade plan executor
//! - [`find`]: Attribute lookups
//! - [`link`]: Listing/amenity associations
//! - [`accounts`]: Pause, reactivation, credentials
//! - [`listings`]: Listing searches and review statistics

use crate::context::Context;
use crate::error::{HbnbError, Result};
use crate::model::{Entity, FieldMap};
use crate::store::{Criteria, DataStore};
use crate::validation::{Rule, ValidationErrors};

pub mod accounts;
pub mod cascade;
pub mod create;
pub mod delete;
pub mod find;
pub mod get;
pub mod link;
pub mod listings;
pub mod purge;
pub mod update;

/// Loads an entity that must exist, deleted or not.
pub(crate) fn load<E: Entity, S: DataStore>(ctx: &Context<'_, S>, id: &str) -> Result<E> {
    ctx.store
        .get::<E>(id)?
        .ok_or_else(|| HbnbError::not_found(E::KIND, id))
}

/// Fails if another live entity of the kind already holds a value that the
/// rule table marks unique.
pub(crate) fn check_unique<E: Entity, S: DataStore>(
    ctx: &Context<'_, S>,
    fields: &FieldMap,
    own_id: Option<&str>,
) -> Result<()> {
    let mut errors = ValidationErrors::default();
    for rule in E::RULES.iter().filter(|r| r.unique) {
        let Some(value) = fields.get(rule.name) else {
            continue;
        };
        let criteria = Criteria::new()
            .eq(rule.name, value.clone())
            .eq("is_deleted", false);
        let holders: Vec<E> = ctx.store.find_all(&criteria)?;
        if holders.iter().any(|e| Some(e.id()) != own_id) {
            errors.push(
                rule.name,
                Rule::Unique,
                format!("{} {} is already in use", rule.name, value),
            );
        }
    }
    errors.into_result()
}
