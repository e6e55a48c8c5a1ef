use super::{AnyEntity, Entity, EntityKind, FieldMap, Meta};
use crate::context::Context;
use crate::error::{HbnbError, Result};
use crate::store::{Criteria, DataStore};
use crate::validation::FieldRule;
use serde::{Deserialize, Serialize};

/// Association between a listing and one of its amenities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingAmenityLink {
    #[serde(flatten)]
    pub meta: Meta,
    pub listing_id: String,
    pub amenity_id: String,
}

impl Entity for ListingAmenityLink {
    const KIND: EntityKind = EntityKind::ListingAmenityLink;

    const RULES: &'static [FieldRule] = &[
        FieldRule::reference("listing_id", EntityKind::Listing).required(),
        FieldRule::reference("amenity_id", EntityKind::Amenity).required(),
    ];

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn into_any(self) -> AnyEntity {
        AnyEntity::ListingAmenityLink(self)
    }

    /// At most one live link per (listing, amenity) pair.
    fn prepare<S: DataStore>(
        ctx: &Context<'_, S>,
        fields: &mut FieldMap,
        current: Option<&Self>,
    ) -> Result<()> {
        let listing_id = fields
            .get("listing_id")
            .and_then(|v| v.as_str())
            .or(current.map(|l| l.listing_id.as_str()));
        let amenity_id = fields
            .get("amenity_id")
            .and_then(|v| v.as_str())
            .or(current.map(|l| l.amenity_id.as_str()));
        let (Some(listing_id), Some(amenity_id)) = (listing_id, amenity_id) else {
            return Ok(());
        };

        let criteria = Criteria::new()
            .eq("listing_id", listing_id)
            .eq("amenity_id", amenity_id)
            .eq("is_deleted", false);
        let existing: Vec<ListingAmenityLink> = ctx.store.find_all(&criteria)?;
        let own_id = current.map(|l| l.meta.id.as_str());
        if existing.iter().any(|l| Some(l.meta.id.as_str()) != own_id) {
            return Err(HbnbError::LinkExists {
                listing_id: listing_id.to_string(),
                amenity_id: amenity_id.to_string(),
            });
        }
        Ok(())
    }
}
