use crate::context::Context;
use crate::error::{HbnbError, Result};
use crate::model::{from_document, Entity, FieldMap, Meta};
use crate::store::DataStore;
use crate::validation::{validate, Mode};
use serde_json::Value;
use tracing::info;

/// Validates `data` and persists a new entity.
///
/// Base fields in `data` (`id`, timestamps, flags) override the generated
/// ones, which lets stored entities be reconstructed. Nothing is written
/// unless every check passes.
pub fn run<E: Entity, S: DataStore>(ctx: &Context<'_, S>, mut data: FieldMap) -> Result<E> {
    let meta = Meta::with_overrides(&mut data)?;
    let mut fields = validate(E::RULES, &data, Mode::Full, ctx.store)?;
    super::check_unique::<E, S>(ctx, &fields, None)?;
    E::prepare(ctx, &mut fields, None)?;

    let mut doc = match serde_json::to_value(&meta)? {
        Value::Object(map) => map,
        _ => return Err(HbnbError::Store("meta did not serialize to an object".into())),
    };
    doc.extend(fields);

    let entity: E = from_document(doc)?;
    let stored = ctx.store.add(&entity)?;
    info!("created {} {}", E::KIND, stored.id());
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Account, Amenity, AmenityCategory, Listing, ListingStatus, PropertyType, Review};
    use crate::store::memory::fixtures::{account_data, amenity_data, fields, listing_data, review_data, StoreFixture};
    use crate::validation::Rule;
    use serde_json::json;

    #[test]
    fn creates_account_with_hashed_credential() {
        let fx = StoreFixture::new();
        let account: Account = run(&fx.ctx(), account_data("alice")).unwrap();
        assert_eq!(account.username, "alice");
        assert!(account.meta.is_active);
        assert!(!account.password_hash.contains("Passw0rdOk"));
        assert!(fx.store.get::<Account>(&account.meta.id).unwrap().is_some());
    }

    #[test]
    fn listing_gets_defaults() {
        let fx = StoreFixture::new().with_account("owner");
        let mut data = listing_data(&fx.accounts[0].meta.id);
        data.remove("max_guests");
        let listing: Listing = run(&fx.ctx(), data).unwrap();
        assert_eq!(listing.number_rooms, 1);
        assert_eq!(listing.number_bathrooms, 1);
        assert_eq!(listing.max_guests, 2);
        assert_eq!(listing.minimum_stay, 1);
        assert_eq!(listing.status, ListingStatus::Active);
        assert_eq!(listing.property_type, PropertyType::Apartment);
    }

    #[test]
    fn amenity_default_category() {
        let fx = StoreFixture::new();
        let amenity: Amenity = run(&fx.ctx(), fields(json!({"name": "Ghost"}))).unwrap();
        assert_eq!(amenity.category, AmenityCategory::Supernatural);
        assert_eq!(amenity.description, "");
    }

    #[test]
    fn oversized_counts_are_validation_errors() {
        let fx = StoreFixture::new().with_account("owner");
        let mut data = listing_data(&fx.accounts[0].meta.id);
        data.insert("number_rooms".into(), json!(5_000_000_000u64));
        data.insert("minimum_stay".into(), json!(u64::from(u32::MAX) + 1));
        let err = run::<Listing, _>(&fx.ctx(), data).unwrap_err();
        let violations = err.violations().unwrap();
        assert!(violations.has("number_rooms", Rule::Range));
        assert!(violations.has("minimum_stay", Rule::Range));

        let mut data = listing_data(&fx.accounts[0].meta.id);
        data.insert("max_guests".into(), json!(u32::MAX));
        let listing: Listing = run(&fx.ctx(), data).unwrap();
        assert_eq!(listing.max_guests, u32::MAX);
    }

    #[test]
    fn paused_owner_cannot_list() {
        let fx = StoreFixture::new().with_account("owner");
        let owner_id = fx.accounts[0].meta.id.clone();
        crate::commands::accounts::pause(&fx.ctx(), &owner_id).unwrap();

        let err = run::<Listing, _>(&fx.ctx(), listing_data(&owner_id)).unwrap_err();
        assert!(err.violations().unwrap().has("owner_id", Rule::Reference));
        assert!(fx.store.get_all::<Listing>().unwrap().is_empty());

        crate::commands::accounts::reactivate(&fx.ctx(), &owner_id).unwrap();
        assert!(run::<Listing, _>(&fx.ctx(), listing_data(&owner_id)).is_ok());
    }

    #[test]
    fn listing_requires_existing_owner() {
        let fx = StoreFixture::new();
        let err = run::<Listing, _>(&fx.ctx(), listing_data("ghost-owner")).unwrap_err();
        assert!(err.violations().unwrap().has("owner_id", Rule::Reference));
        assert!(fx.store.get_all::<Listing>().unwrap().is_empty());
    }

    #[test]
    fn duplicate_username_and_email_fail() {
        let fx = StoreFixture::new().with_account("alice");
        let err = run::<Account, _>(&fx.ctx(), account_data("alice")).unwrap_err();
        let violations = err.violations().unwrap();
        assert!(violations.has("username", Rule::Unique));
        assert!(violations.has("email", Rule::Unique));
    }

    #[test]
    fn duplicate_amenity_name_fails() {
        let fx = StoreFixture::new().with_amenity("Wifi");
        let err = run::<Amenity, _>(&fx.ctx(), amenity_data("Wifi")).unwrap_err();
        assert!(err.violations().unwrap().has("name", Rule::Unique));
    }

    #[test]
    fn owner_cannot_review_own_listing() {
        let fx = StoreFixture::new().with_account("owner").with_listing(0);
        let data = review_data(&fx.listings[0].meta.id, &fx.accounts[0].meta.id, 5);
        let err = run::<Review, _>(&fx.ctx(), data).unwrap_err();
        assert!(err.violations().unwrap().has("author_id", Rule::SelfReview));
    }

    #[test]
    fn review_rating_bounds() {
        let fx = StoreFixture::new().with_account("owner").with_account("guest").with_listing(0);
        let listing_id = fx.listings[0].meta.id.clone();
        let guest_id = fx.accounts[1].meta.id.clone();
        for bad in [0, 6] {
            let err = run::<Review, _>(&fx.ctx(), review_data(&listing_id, &guest_id, bad)).unwrap_err();
            assert!(err.violations().unwrap().has("rating", Rule::Range));
        }
        let ok: Review = run(&fx.ctx(), review_data(&listing_id, &guest_id, 5)).unwrap();
        assert_eq!(ok.rating, Some(5));
    }

    #[test]
    fn overrides_reconstruct_identity() {
        let fx = StoreFixture::new();
        let mut data = amenity_data("Pool");
        data.insert("id".into(), json!("amenity-1"));
        data.insert("created_at".into(), json!("2023-05-01T10:00:00Z"));
        let amenity: Amenity = run(&fx.ctx(), data.clone()).unwrap();
        assert_eq!(amenity.meta.id, "amenity-1");

        data.insert("name".into(), json!("Pool Two"));
        let err = run::<Amenity, _>(&fx.ctx(), data).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn nothing_is_written_on_failure() {
        let fx = StoreFixture::new();
        let mut data = account_data("bob");
        data.insert("password".into(), json!("nouppercase1"));
        assert!(run::<Account, _>(&fx.ctx(), data).is_err());
        assert!(fx.store.get_all::<Account>().unwrap().is_empty());
    }
}
