use super::cascade;
use super::update::save;
use crate::context::Context;
use crate::error::{HbnbError, Result};
use crate::model::Entity;
use crate::store::DataStore;
use tracing::info;

/// Soft delete: runs the kind's soft-delete cascade, then applies its
/// deletion transition. Deleting an already deleted entity is a conflict.
pub fn run<E: Entity, S: DataStore>(ctx: &Context<'_, S>, id: &str) -> Result<E> {
    let mut entity: E = super::load(ctx, id)?;
    if entity.is_deleted() {
        return Err(HbnbError::Conflict(format!("{} {} is already deleted", E::KIND, id)));
    }

    let report = cascade::run(ctx, E::SOFT_DELETE_CASCADE, id)?;
    entity.mark_deleted();
    entity.meta_mut().touch();
    let saved = save(ctx, &entity)?;
    info!(
        "soft-deleted {} {} ({} dependent(s) removed, {} anonymized)",
        E::KIND,
        id,
        report.hard_deleted,
        report.anonymized
    );
    Ok(saved)
}
