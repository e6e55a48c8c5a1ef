use crate::context::Context;
use crate::error::{HbnbError, Result};
use crate::model::{parse_timestamp, Entity, FieldMap};
use crate::store::DataStore;
use crate::validation::{validate, Mode, Rule, ValidationErrors};
use serde_json::Value;
use tracing::debug;

const IMMUTABLE: &[&str] = &["id", "created_at", "is_deleted"];

/// Applies a partial update.
///
/// `id`, `created_at` and `is_deleted` cannot be set here. A supplied
/// `updated_at` must be a valid timestamp but is replaced by a fresh one.
/// Deleted entities are frozen. An empty update is rejected.
pub fn run<E: Entity, S: DataStore>(ctx: &Context<'_, S>, id: &str, mut data: FieldMap) -> Result<E> {
    if data.is_empty() {
        return Err(ValidationErrors::single("data", Rule::Required, "no data provided for update").into());
    }
    let current: E = super::load(ctx, id)?;

    let mut errors = ValidationErrors::default();
    for field in IMMUTABLE {
        if data.remove(*field).is_some() {
            errors.push(*field, Rule::Immutable, format!("{field} cannot be updated"));
        }
    }
    if let Some(value) = data.remove("updated_at") {
        if parse_timestamp(&value).is_none() {
            errors.push("updated_at", Rule::Format, "updated_at must be an RFC 3339 timestamp");
        }
    }
    let active = match data.remove("is_active") {
        None => None,
        Some(Value::Bool(b)) => Some(b),
        Some(_) => {
            errors.push("is_active", Rule::Type, "is_active must be a boolean");
            None
        }
    };
    errors.into_result()?;

    if current.is_deleted() {
        return Err(HbnbError::Conflict(format!(
            "{} {} is deleted and cannot be updated",
            E::KIND,
            id
        )));
    }

    let mut fields = validate(E::RULES, &data, Mode::Partial, ctx.store)?;
    super::check_unique::<E, S>(ctx, &fields, Some(id))?;
    E::prepare(ctx, &mut fields, Some(&current))?;

    if let Some(active) = active {
        fields.insert("is_active".to_string(), Value::Bool(active));
    }
    let mut meta = current.meta().clone();
    meta.touch();
    fields.insert("updated_at".to_string(), serde_json::to_value(meta.updated_at)?);

    let updated = ctx
        .store
        .update::<E>(id, &fields)?
        .ok_or_else(|| HbnbError::not_found(E::KIND, id))?;
    debug!("updated {} {}", E::KIND, id);
    Ok(updated)
}

/// Persists the entity's current in-memory state.
pub fn save<E: Entity, S: DataStore>(ctx: &Context<'_, S>, entity: &E) -> Result<E> {
    let mut fields = entity.to_fields()?;
    fields.remove("id");
    ctx.store
        .update::<E>(entity.id(), &fields)?
        .ok_or_else(|| HbnbError::not_found(E::KIND, entity.id()))
}
