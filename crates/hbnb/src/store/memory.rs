use super::entity_store::EntityStore;
use super::mem_backend::MemBackend;

pub type InMemoryStore = EntityStore<MemBackend>;

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        EntityStore::with_backend(MemBackend::new())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::commands;
    use crate::context::Context;
    use crate::credentials::Sha256Hasher;
    use crate::model::{Account, Amenity, FieldMap, Listing, ListingAmenityLink, Review};
    use serde_json::{json, Value};

    pub fn fields(value: Value) -> FieldMap {
        match value {
            Value::Object(map) => map,
            other => panic!("fixture data must be an object, got {other}"),
        }
    }

    pub fn account_data(username: &str) -> FieldMap {
        fields(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "Passw0rdOk",
            "first_name": "Test",
            "last_name": "User",
        }))
    }

    pub fn listing_data(owner_id: &str) -> FieldMap {
        fields(json!({
            "name": "Seaside Cottage",
            "description": "A quiet cottage by the sea",
            "owner_id": owner_id,
            "price_per_night": 120,
            "max_guests": 4,
            "latitude": 48.85,
            "longitude": 2.35,
        }))
    }

    pub fn amenity_data(name: &str) -> FieldMap {
        fields(json!({"name": name, "category": "comfort"}))
    }

    pub fn review_data(listing_id: &str, author_id: &str, rating: u8) -> FieldMap {
        fields(json!({
            "listing_id": listing_id,
            "author_id": author_id,
            "text": "Lovely stay, would come back",
            "rating": rating,
        }))
    }

    /// Builds a seeded in-memory store through the regular create commands.
    pub struct StoreFixture {
        pub store: InMemoryStore,
        pub accounts: Vec<Account>,
        pub listings: Vec<Listing>,
        pub amenities: Vec<Amenity>,
        pub reviews: Vec<Review>,
        pub links: Vec<ListingAmenityLink>,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
                accounts: Vec::new(),
                listings: Vec::new(),
                amenities: Vec::new(),
                reviews: Vec::new(),
                links: Vec::new(),
            }
        }

        pub fn ctx(&self) -> Context<'_, InMemoryStore> {
            Context::new(&self.store, &Sha256Hasher)
        }

        pub fn with_account(mut self, username: &str) -> Self {
            let account = commands::create::run(&self.ctx(), account_data(username)).unwrap();
            self.accounts.push(account);
            self
        }

        /// Listing owned by the account at `owner`.
        pub fn with_listing(mut self, owner: usize) -> Self {
            let owner_id = self.accounts[owner].meta.id.clone();
            let listing = commands::create::run(&self.ctx(), listing_data(&owner_id)).unwrap();
            self.listings.push(listing);
            self
        }

        pub fn with_amenity(mut self, name: &str) -> Self {
            let amenity = commands::create::run(&self.ctx(), amenity_data(name)).unwrap();
            self.amenities.push(amenity);
            self
        }

        pub fn with_review(mut self, listing: usize, author: usize, rating: u8) -> Self {
            let data = review_data(
                &self.listings[listing].meta.id,
                &self.accounts[author].meta.id,
                rating,
            );
            let review = commands::create::run(&self.ctx(), data).unwrap();
            self.reviews.push(review);
            self
        }

        pub fn with_link(mut self, listing: usize, amenity: usize) -> Self {
            let link = commands::link::run(
                &self.ctx(),
                &self.listings[listing].meta.id,
                &self.amenities[amenity].meta.id,
            )
            .unwrap();
            self.links.push(link);
            self
        }
    }
}
