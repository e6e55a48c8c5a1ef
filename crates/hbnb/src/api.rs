//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for callers that work with entity kinds chosen at runtime.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Dispatches** a runtime [`EntityKind`] to the typed command functions
//! - **Normalizes inputs** (JSON data must be an object, criteria become [`Criteria`])
//! - **Returns structured types** ([`AnyEntity`], never strings)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: validation, cascades and lifecycle rules live in `commands/*.rs`
//! - **Presentation**: no output, no formatting
//!
//! ## Generic Over DataStore
//!
//! `HbnbApi<S: DataStore>` is generic over the storage backend:
//! - Production: [`open`] picks memory or SQLite from [`HbnbConfig`]
//! - Testing: `HbnbApi<InMemoryStore>`
//!
//! ## Testing Strategy
//!
//! API tests check dispatch and input normalization. Command behavior is
//! tested in the command modules, storage behavior in the store modules.

use crate::commands;
use crate::config::{HbnbConfig, StorageKind};
use crate::context::Context;
use crate::credentials::{CredentialHasher, Sha256Hasher};
use crate::error::Result;
use crate::model::{with_entity, Account, Amenity, AnyEntity, EntityKind, FieldMap, Listing, ListingAmenityLink};
use crate::store::{Criteria, DataStore, EntityStore, MemBackend, SqliteBackend, StorageBackend};
use crate::validation::{Rule, ValidationErrors};
use serde_json::Value;
use tracing::info;

/// Store type used when the backend is chosen by configuration.
pub type DynStore = EntityStore<Box<dyn StorageBackend>>;

/// The orchestration facade.
pub struct HbnbApi<S: DataStore> {
    store: S,
    hasher: Box<dyn CredentialHasher>,
}

/// Builds the facade over the backend selected by `config`.
pub fn open(config: &HbnbConfig) -> Result<HbnbApi<DynStore>> {
    let backend: Box<dyn StorageBackend> = match config.storage_kind()? {
        StorageKind::Memory => Box::new(MemBackend::new()),
        StorageKind::Sqlite => {
            let path = config.database_path();
            info!("opening SQLite store at {}", path.display());
            Box::new(SqliteBackend::open(&path)?)
        }
    };
    Ok(HbnbApi::new(EntityStore::with_backend(backend)))
}

fn into_fields(data: Value) -> Result<FieldMap> {
    match data {
        Value::Object(map) => Ok(map),
        other => Err(ValidationErrors::single(
            "data",
            Rule::Type,
            format!("data must be an object, got {other}"),
        )
        .into()),
    }
}

impl<S: DataStore> HbnbApi<S> {
    pub fn new(store: S) -> Self {
        Self::with_hasher(store, Box::new(Sha256Hasher))
    }

    pub fn with_hasher(store: S, hasher: Box<dyn CredentialHasher>) -> Self {
        Self { store, hasher }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn ctx(&self) -> Context<'_, S> {
        Context::new(&self.store, self.hasher.as_ref())
    }

    pub fn create(&self, kind: EntityKind, data: Value) -> Result<AnyEntity> {
        let fields = into_fields(data)?;
        let ctx = self.ctx();
        with_entity!(kind, E => commands::create::run::<E, S>(&ctx, fields).map(AnyEntity::from))
    }

    /// Fetches by id. Soft-deleted entities are returned too.
    pub fn get(&self, kind: EntityKind, id: &str) -> Result<AnyEntity> {
        let ctx = self.ctx();
        with_entity!(kind, E => commands::get::run::<E, S>(&ctx, id).map(AnyEntity::from))
    }

    pub fn update(&self, kind: EntityKind, id: &str, data: Value) -> Result<AnyEntity> {
        let fields = into_fields(data)?;
        let ctx = self.ctx();
        with_entity!(kind, E => commands::update::run::<E, S>(&ctx, id, fields).map(AnyEntity::from))
    }

    /// Soft delete, or physical removal with `hard`. Both run the kind's cascade.
    pub fn delete(&self, kind: EntityKind, id: &str, hard: bool) -> Result<()> {
        let ctx = self.ctx();
        if hard {
            with_entity!(kind, E => commands::purge::run::<E, S>(&ctx, id).map(|_| ()))
        } else {
            with_entity!(kind, E => commands::delete::run::<E, S>(&ctx, id).map(|_| ()))
        }
    }

    /// Live entities whose attributes equal every entry of `criteria`.
    pub fn find(&self, kind: EntityKind, criteria: Value) -> Result<Vec<AnyEntity>> {
        let criteria = match criteria {
            Value::Null => Criteria::new(),
            other => Criteria::from_map(&into_fields(other)?),
        };
        let ctx = self.ctx();
        with_entity!(kind, E => Ok(commands::find::run::<E, S>(&ctx, &criteria)?
            .into_iter()
            .map(AnyEntity::from)
            .collect()))
    }

    pub fn link_listing_amenity(&self, listing_id: &str, amenity_id: &str) -> Result<ListingAmenityLink> {
        commands::link::run(&self.ctx(), listing_id, amenity_id)
    }

    pub fn unlink_listing_amenity(&self, listing_id: &str, amenity_id: &str) -> Result<()> {
        commands::link::unlink(&self.ctx(), listing_id, amenity_id)
    }

    pub fn pause_account(&self, id: &str) -> Result<Account> {
        commands::accounts::pause(&self.ctx(), id)
    }

    pub fn reactivate_account(&self, id: &str) -> Result<Account> {
        commands::accounts::reactivate(&self.ctx(), id)
    }

    pub fn verify_credential(&self, account_id: &str, password: &str) -> Result<bool> {
        commands::accounts::verify_credential(&self.ctx(), account_id, password)
    }

    pub fn amenities_for_listing(&self, listing_id: &str) -> Result<Vec<Amenity>> {
        commands::link::amenities_for_listing(&self.ctx(), listing_id)
    }

    pub fn listings_for_amenity(&self, amenity_id: &str) -> Result<Vec<Listing>> {
        commands::link::listings_for_amenity(&self.ctx(), amenity_id)
    }

    pub fn listings_in_price_range(&self, min: Option<f64>, max: Option<f64>) -> Result<Vec<Listing>> {
        commands::listings::in_price_range(&self.ctx(), min, max)
    }

    pub fn listings_with_capacity(&self, min_guests: u32) -> Result<Vec<Listing>> {
        commands::listings::with_capacity(&self.ctx(), min_guests)
    }

    pub fn listings_near(&self, latitude: f64, longitude: f64, radius_km: f64) -> Result<Vec<Listing>> {
        commands::listings::near(&self.ctx(), latitude, longitude, radius_km)
    }

    pub fn average_rating(&self, listing_id: &str) -> Result<f64> {
        commands::listings::average_rating(&self.ctx(), listing_id)
    }
}
