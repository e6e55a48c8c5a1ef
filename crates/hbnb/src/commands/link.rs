use super::{create, find, purge};
use crate::context::Context;
use crate::error::{HbnbError, Result};
use crate::model::{Amenity, EntityKind, FieldMap, Listing, ListingAmenityLink};
use crate::store::{Criteria, DataStore};
use serde_json::Value;

/// Associates an amenity with a listing.
///
/// Both must exist and not be deleted; a second link for the same pair fails
/// with `HbnbError::LinkExists`.
pub fn run<S: DataStore>(
    ctx: &Context<'_, S>,
    listing_id: &str,
    amenity_id: &str,
) -> Result<ListingAmenityLink> {
    let mut data = FieldMap::new();
    data.insert("listing_id".to_string(), Value::from(listing_id));
    data.insert("amenity_id".to_string(), Value::from(amenity_id));
    create::run(ctx, data)
}

/// Removes the link between a listing and an amenity.
pub fn unlink<S: DataStore>(ctx: &Context<'_, S>, listing_id: &str, amenity_id: &str) -> Result<()> {
    let criteria = Criteria::new()
        .eq("listing_id", listing_id)
        .eq("amenity_id", amenity_id);
    let links: Vec<ListingAmenityLink> = find::run(ctx, &criteria)?;
    if links.is_empty() {
        return Err(HbnbError::not_found(
            EntityKind::ListingAmenityLink,
            format!("{listing_id}/{amenity_id}"),
        ));
    }
    for link in links {
        purge::run::<ListingAmenityLink, S>(ctx, &link.meta.id)?;
    }
    Ok(())
}

/// Amenities linked to a listing, skipping blocked ones.
pub fn amenities_for_listing<S: DataStore>(ctx: &Context<'_, S>, listing_id: &str) -> Result<Vec<Amenity>> {
    let _listing: Listing = super::load(ctx, listing_id)?;
    let links: Vec<ListingAmenityLink> = find::run(ctx, &Criteria::new().eq("listing_id", listing_id))?;
    let mut amenities = Vec::new();
    for link in links {
        if let Some(amenity) = ctx.store.get::<Amenity>(&link.amenity_id)? {
            if !amenity.is_blocked() && !amenity.meta.is_deleted {
                amenities.push(amenity);
            }
        }
    }
    Ok(amenities)
}

/// Bookable listings offering an amenity.
pub fn listings_for_amenity<S: DataStore>(ctx: &Context<'_, S>, amenity_id: &str) -> Result<Vec<Listing>> {
    let _amenity: Amenity = super::load(ctx, amenity_id)?;
    let links: Vec<ListingAmenityLink> = find::run(ctx, &Criteria::new().eq("amenity_id", amenity_id))?;
    let mut listings = Vec::new();
    for link in links {
        if let Some(listing) = ctx.store.get::<Listing>(&link.listing_id)? {
            if listing.is_bookable() {
                listings.push(listing);
            }
        }
    }
    Ok(listings)
}
