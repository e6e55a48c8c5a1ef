use super::cascade::{self, CascadeReport};
use crate::context::Context;
use crate::error::{HbnbError, Result};
use crate::model::Entity;
use crate::store::DataStore;
use tracing::info;

/// Permanently removes an entity after running its hard-delete cascade.
///
/// Dependents go first, so a failure part-way leaves the entity itself in
/// place together with whatever dependents were not reached yet.
pub fn run<E: Entity, S: DataStore>(ctx: &Context<'_, S>, id: &str) -> Result<CascadeReport> {
    let _existing: E = super::load(ctx, id)?;
    let report = cascade::run(ctx, E::HARD_DELETE_CASCADE, id)?;
    if !ctx.store.delete::<E>(id)? {
        return Err(HbnbError::not_found(E::KIND, id));
    }
    info!(
        "hard-deleted {} {} ({} dependent(s) removed, {} anonymized)",
        E::KIND,
        id,
        report.hard_deleted,
        report.anonymized
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::find;
    use crate::model::{Account, Amenity, Listing, ListingAmenityLink, Review};
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::Criteria;

    fn seeded() -> StoreFixture {
        StoreFixture::new()
            .with_account("owner")
            .with_account("guest")
            .with_listing(0)
            .with_listing(0)
            .with_review(0, 1, 4)
            .with_review(1, 1, 2)
            .with_amenity("Wifi")
            .with_link(0, 0)
            .with_link(1, 0)
    }

    #[test]
    fn listing_takes_reviews_and_links_with_it() {
        let fx = seeded();
        let listing_id = fx.listings[0].meta.id.clone();
        let report = run::<Listing, _>(&fx.ctx(), &listing_id).unwrap();
        assert_eq!(report.hard_deleted, 2);

        let by_listing = Criteria::new().eq("listing_id", listing_id.as_str());
        assert!(find::run::<Review, _>(&fx.ctx(), &by_listing).unwrap().is_empty());
        assert!(find::run::<ListingAmenityLink, _>(&fx.ctx(), &by_listing).unwrap().is_empty());
        // the other listing is untouched
        assert!(fx.store.get::<Review>(&fx.reviews[1].meta.id).unwrap().is_some());
        assert!(fx.store.get::<ListingAmenityLink>(&fx.links[1].meta.id).unwrap().is_some());
    }

    #[test]
    fn amenity_takes_links_with_it() {
        let fx = seeded();
        run::<Amenity, _>(&fx.ctx(), &fx.amenities[0].meta.id).unwrap();
        assert!(fx.store.get_all::<ListingAmenityLink>().unwrap().is_empty());
        assert_eq!(fx.store.get_all::<Listing>().unwrap().len(), 2);
    }

    #[test]
    fn account_hard_delete_removes_account() {
        let fx = seeded();
        let report = run::<Account, _>(&fx.ctx(), &fx.accounts[1].meta.id).unwrap();
        assert_eq!(report.anonymized, 2);
        assert!(fx.store.get::<Account>(&fx.accounts[1].meta.id).unwrap().is_none());
    }

    #[test]
    fn missing_entity_is_not_found() {
        let fx = StoreFixture::new();
        assert!(run::<Review, _>(&fx.ctx(), "missing").unwrap_err().is_not_found());
    }

    #[test]
    fn interrupted_purge_keeps_the_listing() {
        let fx = seeded();
        let listing_id = fx.listings[0].meta.id.clone();
        // the review removal succeeds, the link removal fails
        fx.store.backend().fail_writes_after(1);
        assert!(run::<Listing, _>(&fx.ctx(), &listing_id).is_err());
        fx.store.backend().set_simulate_write_error(false);

        assert!(fx.store.get::<Review>(&fx.reviews[0].meta.id).unwrap().is_none());
        assert!(fx.store.get::<ListingAmenityLink>(&fx.links[0].meta.id).unwrap().is_some());
        assert!(fx.store.get::<Listing>(&listing_id).unwrap().is_some());
    }
}
