//! # Entity Model
//!
//! Every entity kind shares the [`Meta`] block (identity, timestamps and the two
//! visibility flags) and implements [`Entity`], which binds a concrete struct to:
//!
//! - its [`EntityKind`] tag, used by storage to pick a table or bucket,
//! - its static validation table ([`Entity::RULES`]),
//! - its cascade plans ([`Entity::SOFT_DELETE_CASCADE`], [`Entity::HARD_DELETE_CASCADE`]),
//! - its soft-delete transition ([`Entity::mark_deleted`]),
//! - entity-specific checks that need the store ([`Entity::prepare`]).
//!
//! Entities are plain serde structs. The stored document of an entity is its
//! JSON serialization with the `Meta` fields flattened in, so attribute
//! lookups and partial updates work uniformly on field names.
//!
//! | Kind | Struct | Soft delete | Hard delete cascade |
//! |------|--------|-------------|---------------------|
//! | Account | [`Account`] | cascade, then deactivate + delete flag | listings removed, reviews anonymized |
//! | Listing | [`Listing`] | `status = blocked` | reviews and amenity links removed |
//! | Amenity | [`Amenity`] | `category = blocked` | amenity links removed |
//! | Review | [`Review`] | rating cleared, text replaced | none |
//! | ListingAmenityLink | [`ListingAmenityLink`] | delete flag | none |

pub mod account;
pub mod amenity;
pub mod cascade;
pub mod link;
pub mod listing;
pub mod review;

pub use account::Account;
pub use amenity::{Amenity, AmenityCategory};
pub use cascade::{CascadeAction, CascadeEffect};
pub use link::ListingAmenityLink;
pub use listing::{Listing, ListingStatus, PropertyType};
pub use review::Review;

use crate::context::Context;
use crate::error::{HbnbError, Result};
use crate::store::DataStore;
use crate::validation::{FieldRule, Rule, ValidationErrors};
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// A proposed or stored set of field values, keyed by field name.
pub type FieldMap = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Account,
    Listing,
    Amenity,
    Review,
    ListingAmenityLink,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Account,
        EntityKind::Listing,
        EntityKind::Amenity,
        EntityKind::Review,
        EntityKind::ListingAmenityLink,
    ];

    /// Table name used by the SQLite backend.
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Account => "accounts",
            EntityKind::Listing => "listings",
            EntityKind::Amenity => "amenities",
            EntityKind::Review => "reviews",
            EntityKind::ListingAmenityLink => "listing_amenities",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Account => "Account",
            EntityKind::Listing => "Listing",
            EntityKind::Amenity => "Amenity",
            EntityKind::Review => "Review",
            EntityKind::ListingAmenityLink => "ListingAmenityLink",
        };
        f.write_str(name)
    }
}

fn default_true() -> bool {
    true
}

/// Identity, timestamps and visibility shared by every entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Default for Meta {
    fn default() -> Self {
        Self::new()
    }
}

impl Meta {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            is_active: true,
            is_deleted: false,
        }
    }

    /// Builds a fresh `Meta`, then applies any base fields present in `fields`.
    ///
    /// The base fields are removed from the map so the remainder can go through
    /// the entity's own rule table. Used when reconstructing stored entities.
    pub fn with_overrides(fields: &mut FieldMap) -> Result<Self> {
        let mut meta = Self::new();
        let mut errors = ValidationErrors::default();

        if let Some(value) = fields.remove("id") {
            match value.as_str() {
                Some(id) if !id.trim().is_empty() => meta.id = id.to_string(),
                _ => errors.push("id", Rule::Type, "id must be a non-empty string"),
            }
        }
        if let Some(value) = fields.remove("created_at") {
            match parse_timestamp(&value) {
                Some(ts) => meta.created_at = ts,
                None => errors.push("created_at", Rule::Format, "created_at must be an RFC 3339 timestamp"),
            }
        }
        if let Some(value) = fields.remove("updated_at") {
            match parse_timestamp(&value) {
                Some(ts) => meta.updated_at = ts,
                None => errors.push("updated_at", Rule::Format, "updated_at must be an RFC 3339 timestamp"),
            }
        }
        for flag in ["is_active", "is_deleted"] {
            if let Some(value) = fields.remove(flag) {
                match value.as_bool() {
                    Some(b) if flag == "is_active" => meta.is_active = b,
                    Some(b) => meta.is_deleted = b,
                    None => errors.push(flag, Rule::Type, format!("{flag} must be a boolean")),
                }
            }
        }

        errors.into_result()?;
        Ok(meta)
    }

    /// Advances `updated_at`, strictly, even when the clock has not moved.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Contract between a concrete entity struct and the generic lifecycle commands.
pub trait Entity: Serialize + DeserializeOwned + Clone + fmt::Debug {
    const KIND: EntityKind;

    /// Validation table for the entity's own fields.
    const RULES: &'static [FieldRule];

    /// Run, in order, before the entity itself is marked deleted.
    const SOFT_DELETE_CASCADE: &'static [CascadeAction] = &[];

    /// Run, in order, before the entity is removed from storage.
    const HARD_DELETE_CASCADE: &'static [CascadeAction] = &[];

    fn meta(&self) -> &Meta;

    fn meta_mut(&mut self) -> &mut Meta;

    fn into_any(self) -> AnyEntity;

    fn id(&self) -> &str {
        &self.meta().id
    }

    fn is_deleted(&self) -> bool {
        self.meta().is_deleted
    }

    /// Applies the kind's soft-delete transition in memory.
    fn mark_deleted(&mut self) {
        let meta = self.meta_mut();
        meta.is_deleted = true;
        meta.is_active = false;
    }

    /// Entity-specific checks and transforms on already validated fields.
    ///
    /// `current` is `None` on creation and the stored entity on update.
    fn prepare<S: DataStore>(
        _ctx: &Context<'_, S>,
        _fields: &mut FieldMap,
        _current: Option<&Self>,
    ) -> Result<()> {
        Ok(())
    }

    /// The stored document form of this entity.
    fn to_fields(&self) -> Result<FieldMap> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(HbnbError::Store(format!(
                "{} did not serialize to an object",
                Self::KIND
            ))),
        }
    }
}

/// Builds an entity from a document holding both meta and entity fields.
pub fn from_document<E: Entity>(doc: FieldMap) -> Result<E> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

/// Any entity, for kind-dispatched facade calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnyEntity {
    Account(Account),
    Listing(Listing),
    Amenity(Amenity),
    Review(Review),
    ListingAmenityLink(ListingAmenityLink),
}

impl AnyEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            AnyEntity::Account(_) => EntityKind::Account,
            AnyEntity::Listing(_) => EntityKind::Listing,
            AnyEntity::Amenity(_) => EntityKind::Amenity,
            AnyEntity::Review(_) => EntityKind::Review,
            AnyEntity::ListingAmenityLink(_) => EntityKind::ListingAmenityLink,
        }
    }

    pub fn meta(&self) -> &Meta {
        match self {
            AnyEntity::Account(e) => &e.meta,
            AnyEntity::Listing(e) => &e.meta,
            AnyEntity::Amenity(e) => &e.meta,
            AnyEntity::Review(e) => &e.meta,
            AnyEntity::ListingAmenityLink(e) => &e.meta,
        }
    }

    pub fn id(&self) -> &str {
        &self.meta().id
    }

    /// Permission check for an acting account.
    ///
    /// Admins manage everything. Otherwise an account manages itself, a review
    /// is managed by its author and a listing by its owner. Amenities and links
    /// are admin-only.
    pub fn can_be_managed_by(&self, actor_id: &str, is_admin: bool) -> bool {
        if is_admin {
            return true;
        }
        match self {
            AnyEntity::Account(a) => a.meta.id == actor_id,
            AnyEntity::Listing(l) => l.owner_id == actor_id,
            AnyEntity::Review(r) => r.author_id.as_deref() == Some(actor_id),
            AnyEntity::Amenity(_) | AnyEntity::ListingAmenityLink(_) => false,
        }
    }

    pub fn into_account(self) -> Option<Account> {
        match self {
            AnyEntity::Account(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_listing(self) -> Option<Listing> {
        match self {
            AnyEntity::Listing(l) => Some(l),
            _ => None,
        }
    }

    pub fn into_amenity(self) -> Option<Amenity> {
        match self {
            AnyEntity::Amenity(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_review(self) -> Option<Review> {
        match self {
            AnyEntity::Review(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_link(self) -> Option<ListingAmenityLink> {
        match self {
            AnyEntity::ListingAmenityLink(l) => Some(l),
            _ => None,
        }
    }
}

macro_rules! any_entity_from {
    ($($variant:ident),*) => {
        $(impl From<$variant> for AnyEntity {
            fn from(entity: $variant) -> Self {
                AnyEntity::$variant(entity)
            }
        })*
    };
}

any_entity_from!(Account, Listing, Amenity, Review, ListingAmenityLink);

/// Runs `$body` with `$E` bound to the struct type for a runtime [`EntityKind`].
macro_rules! with_entity {
    ($kind:expr, $E:ident => $body:expr) => {
        match $kind {
            $crate::model::EntityKind::Account => {
                type $E = $crate::model::Account;
                $body
            }
            $crate::model::EntityKind::Listing => {
                type $E = $crate::model::Listing;
                $body
            }
            $crate::model::EntityKind::Amenity => {
                type $E = $crate::model::Amenity;
                $body
            }
            $crate::model::EntityKind::Review => {
                type $E = $crate::model::Review;
                $body
            }
            $crate::model::EntityKind::ListingAmenityLink => {
                type $E = $crate::model::ListingAmenityLink;
                $body
            }
        }
    };
}
pub(crate) use with_entity;
