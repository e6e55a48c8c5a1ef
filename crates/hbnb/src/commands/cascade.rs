use super::purge;
use crate::context::Context;
use crate::error::Result;
use crate::model::{with_entity, CascadeAction, CascadeEffect, Entity, FieldMap};
use crate::store::{Criteria, DataStore};
use serde_json::Value;
use tracing::{debug, warn};

/// What a cascade touched.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    pub hard_deleted: usize,
    pub anonymized: usize,
    pub toggled: usize,
}

impl CascadeReport {
    fn absorb(&mut self, other: CascadeReport) {
        self.hard_deleted += other.hard_deleted;
        self.anonymized += other.anonymized;
        self.toggled += other.toggled;
    }
}

/// Runs `actions` in order against the dependents of `source_id`.
///
/// Stops at the first failing step and returns its error. Earlier steps are
/// not undone.
pub fn run<S: DataStore>(
    ctx: &Context<'_, S>,
    actions: &[CascadeAction],
    source_id: &str,
) -> Result<CascadeReport> {
    let mut report = CascadeReport::default();
    for (step, action) in actions.iter().enumerate() {
        match apply(ctx, action, source_id) {
            Ok(step_report) => report.absorb(step_report),
            Err(e) => {
                warn!(
                    "cascade step {} ({:?} {} by {}) failed for {source_id}: {e}; {} earlier removal(s) kept",
                    step + 1,
                    action.effect,
                    action.target,
                    action.foreign_key,
                    report.hard_deleted,
                );
                return Err(e);
            }
        }
    }
    Ok(report)
}

fn apply<S: DataStore>(
    ctx: &Context<'_, S>,
    action: &CascadeAction,
    source_id: &str,
) -> Result<CascadeReport> {
    let criteria = Criteria::new().eq(action.foreign_key, source_id);
    with_entity!(action.target, E => apply_to::<E, S>(ctx, action, &criteria))
}

fn apply_to<E: Entity, S: DataStore>(
    ctx: &Context<'_, S>,
    action: &CascadeAction,
    criteria: &Criteria,
) -> Result<CascadeReport> {
    let mut report = CascadeReport::default();
    let dependents: Vec<E> = ctx.store.find_all(criteria)?;

    for dependent in dependents {
        let id = dependent.id().to_string();
        match action.effect {
            CascadeEffect::HardDelete => {
                let nested = purge::run::<E, S>(ctx, &id)?;
                report.absorb(nested);
                report.hard_deleted += 1;
            }
            CascadeEffect::Anonymize => {
                let mut patch = touched(&dependent)?;
                patch.insert(action.foreign_key.to_string(), Value::Null);
                ctx.store.update::<E>(&id, &patch)?;
                report.anonymized += 1;
            }
            CascadeEffect::SetActive(active) => {
                if dependent.is_deleted() || dependent.meta().is_active == active {
                    continue;
                }
                let mut patch = touched(&dependent)?;
                patch.insert("is_active".to_string(), Value::Bool(active));
                ctx.store.update::<E>(&id, &patch)?;
                report.toggled += 1;
            }
        }
        debug!("cascade {:?} applied to {} {}", action.effect, E::KIND, id);
    }
    Ok(report)
}

/// A patch carrying only an advanced `updated_at`.
fn touched<E: Entity>(entity: &E) -> Result<FieldMap> {
    let mut meta = entity.meta().clone();
    meta.touch();
    let mut patch = FieldMap::new();
    patch.insert("updated_at".to_string(), serde_json::to_value(meta.updated_at)?);
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Account, EntityKind, Listing, Review};
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn anonymize_nulls_the_key_and_keeps_content() {
        let fx = StoreFixture::new()
            .with_account("owner")
            .with_account("guest")
            .with_listing(0)
            .with_review(0, 1, 5);
        let plan = [CascadeAction::anonymize(EntityKind::Review, "author_id")];
        let report = run(&fx.ctx(), &plan, &fx.accounts[1].meta.id).unwrap();
        assert_eq!(report.anonymized, 1);

        let review: Review = fx.store.get(&fx.reviews[0].meta.id).unwrap().unwrap();
        assert!(review.author_id.is_none());
        assert_eq!(review.rating, Some(5));
        assert_eq!(review.text, fx.reviews[0].text);
        assert!(review.meta.updated_at > fx.reviews[0].meta.updated_at);
    }

    #[test]
    fn hard_delete_recurses_into_dependents() {
        let fx = StoreFixture::new()
            .with_account("owner")
            .with_account("guest")
            .with_listing(0)
            .with_review(0, 1, 3)
            .with_amenity("Wifi")
            .with_link(0, 0);
        let report = run(&fx.ctx(), Account::SOFT_DELETE_CASCADE, &fx.accounts[0].meta.id).unwrap();
        assert_eq!(report.hard_deleted, 3);
        assert!(fx.store.get::<Listing>(&fx.listings[0].meta.id).unwrap().is_none());
        assert!(fx.store.get::<Review>(&fx.reviews[0].meta.id).unwrap().is_none());
    }

    #[test]
    fn set_active_skips_unchanged() {
        let fx = StoreFixture::new().with_account("owner").with_listing(0).with_listing(0);
        let id = fx.accounts[0].meta.id.clone();
        assert_eq!(run(&fx.ctx(), Account::PAUSE_CASCADE, &id).unwrap().toggled, 2);
        assert_eq!(run(&fx.ctx(), Account::PAUSE_CASCADE, &id).unwrap().toggled, 0);
        let listing: Listing = fx.store.get(&fx.listings[1].meta.id).unwrap().unwrap();
        assert!(!listing.meta.is_active);
    }

    #[test]
    fn failure_keeps_earlier_steps() {
        let fx = StoreFixture::new()
            .with_account("owner")
            .with_account("guest")
            .with_listing(0)
            .with_listing(0);
        // first listing removal succeeds, second fails
        fx.store.backend().fail_writes_after(1);
        let err = run(&fx.ctx(), Account::SOFT_DELETE_CASCADE, &fx.accounts[0].meta.id).unwrap_err();
        assert!(matches!(err, crate::error::HbnbError::Store(_)));

        fx.store.backend().set_simulate_write_error(false);
        assert!(fx.store.get::<Listing>(&fx.listings[0].meta.id).unwrap().is_none());
        assert!(fx.store.get::<Listing>(&fx.listings[1].meta.id).unwrap().is_some());
    }
}
