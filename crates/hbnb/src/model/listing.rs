use super::cascade::CascadeAction;
use super::{Account, AnyEntity, Entity, EntityKind, FieldMap, Meta};
use crate::context::Context;
use crate::error::Result;
use crate::store::DataStore;
use crate::validation::{DefaultValue, FieldRule, Rule, ValidationErrors};
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Upper bound for the `u32` count fields.
const MAX_COUNT: f64 = u32::MAX as f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Active,
    Maintenance,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    House,
    #[default]
    Apartment,
    Villa,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(flatten)]
    pub meta: Meta,
    pub name: String,
    pub description: String,
    pub owner_id: String,
    pub price_per_night: f64,
    pub number_rooms: u32,
    pub number_bathrooms: u32,
    pub max_guests: u32,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub status: ListingStatus,
    #[serde(default)]
    pub property_type: PropertyType,
    pub minimum_stay: u32,
}

impl Listing {
    /// Shown in searches: active, not deleted and not blocked.
    pub fn is_bookable(&self) -> bool {
        self.meta.is_active && !self.meta.is_deleted && self.status != ListingStatus::Blocked
    }

    /// Great-circle distance in kilometres, if the listing has coordinates.
    pub fn distance_km(&self, latitude: f64, longitude: f64) -> Option<f64> {
        let (lat, lon) = (self.latitude?, self.longitude?);
        let (phi1, phi2) = (lat.to_radians(), latitude.to_radians());
        let d_phi = (latitude - lat).to_radians();
        let d_lambda = (longitude - lon).to_radians();
        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        Some(2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt()))
    }
}

impl Entity for Listing {
    const KIND: EntityKind = EntityKind::Listing;

    const RULES: &'static [FieldRule] = &[
        FieldRule::string("name").required().trim().length(3, 120),
        FieldRule::string("description").required().trim().min_len(10),
        FieldRule::reference("owner_id", EntityKind::Account).required(),
        FieldRule::number("price_per_night").required().positive(),
        FieldRule::integer("number_rooms").range(1.0, MAX_COUNT).default(DefaultValue::Int(1)),
        FieldRule::integer("number_bathrooms").range(1.0, MAX_COUNT).default(DefaultValue::Int(1)),
        FieldRule::integer("max_guests").range(1.0, MAX_COUNT).default(DefaultValue::Int(2)),
        FieldRule::number("latitude").nullable().range(-90.0, 90.0),
        FieldRule::number("longitude").nullable().range(-180.0, 180.0),
        FieldRule::string("city").trim().max_len(100).default(DefaultValue::Str("")),
        FieldRule::string("country").trim().max_len(100).default(DefaultValue::Str("")),
        FieldRule::string("status")
            .choices(&["active", "maintenance", "blocked"])
            .default(DefaultValue::Str("active")),
        FieldRule::string("property_type")
            .choices(&["house", "apartment", "villa"])
            .default(DefaultValue::Str("apartment")),
        FieldRule::integer("minimum_stay").range(1.0, MAX_COUNT).default(DefaultValue::Int(1)),
    ];

    const HARD_DELETE_CASCADE: &'static [CascadeAction] = &[
        CascadeAction::hard_delete(EntityKind::Review, "listing_id"),
        CascadeAction::hard_delete(EntityKind::ListingAmenityLink, "listing_id"),
    ];

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn into_any(self) -> AnyEntity {
        AnyEntity::Listing(self)
    }

    /// A soft-deleted listing is blocked, nothing more.
    fn mark_deleted(&mut self) {
        self.status = ListingStatus::Blocked;
    }

    /// New listings need an active owner. Ownership is fixed once the
    /// listing exists.
    fn prepare<S: DataStore>(
        ctx: &Context<'_, S>,
        fields: &mut FieldMap,
        current: Option<&Self>,
    ) -> Result<()> {
        let Some(owner_id) = fields.get("owner_id").and_then(|v| v.as_str()) else {
            return Ok(());
        };
        match current {
            Some(current) if owner_id != current.owner_id => ValidationErrors::single(
                "owner_id",
                Rule::Immutable,
                "owner_id cannot be changed",
            )
            .into_result(),
            Some(_) => Ok(()),
            None => match ctx.store.get::<Account>(owner_id)? {
                Some(owner) if !owner.meta.is_active => ValidationErrors::single(
                    "owner_id",
                    Rule::Reference,
                    format!("owner account {owner_id} is paused"),
                )
                .into_result(),
                _ => Ok(()),
            },
        }
    }
}
