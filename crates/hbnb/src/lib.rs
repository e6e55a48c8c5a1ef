//! # hbnb
//!
//! Entity lifecycle library for a booking platform: accounts, listings,
//! amenities, reviews and the links between listings and amenities.
//!
//! ## Layers
//!
//! - [`api`]: the facade, dispatching runtime [`model::EntityKind`]s to commands
//! - [`commands`]: create, update, soft and hard delete with cascades, lookups
//! - [`model`]: entity structs, their rule tables and cascade plans
//! - [`validation`]: the rule engine shared by every entity
//! - [`store`]: the [`store::DataStore`] contract, in-memory and SQLite backends
//!
//! Ambient pieces: [`config`] (confique), [`telemetry`] (tracing-subscriber),
//! [`credentials`] (password hashing) and [`error`].
//!
//! ```no_run
//! use hbnb::{open, EntityKind, HbnbConfig};
//! use serde_json::json;
//!
//! # fn main() -> hbnb::Result<()> {
//! let api = open(&HbnbConfig::default())?;
//! let wifi = api.create(EntityKind::Amenity, json!({"name": "Wifi"}))?;
//! api.delete(EntityKind::Amenity, wifi.id(), false)?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod commands;
pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod model;
pub mod store;
pub mod telemetry;
pub mod validation;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use api::{open, DynStore, HbnbApi};
pub use config::{HbnbConfig, StorageKind};
pub use error::{HbnbError, Result};
pub use model::{AnyEntity, EntityKind};
pub use store::{DataStore, InMemoryStore, SqliteStore};
