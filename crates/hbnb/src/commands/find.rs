use crate::context::Context;
use crate::error::Result;
use crate::model::Entity;
use crate::store::{Criteria, DataStore, Matches};

/// Live entities matching every criterion. Empty criteria match all.
pub fn run<E: Entity, S: DataStore>(ctx: &Context<'_, S>, criteria: &Criteria) -> Result<Vec<E>> {
    Ok(ctx
        .store
        .find_all::<E>(criteria)?
        .into_iter()
        .filter(|e| !e.is_deleted())
        .collect())
}

/// Attribute lookup that tolerates absence and skips deleted entities.
pub fn by_attribute<E: Entity, S: DataStore>(
    ctx: &Context<'_, S>,
    criteria: &Criteria,
    multiple: bool,
) -> Result<Matches<E>> {
    let live = run::<E, S>(ctx, criteria)?;
    Ok(if multiple {
        Matches::All(live)
    } else {
        Matches::First(live.into_iter().next())
    })
}
