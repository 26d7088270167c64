//! Common test utilities for integration tests.
//!
//! Builds small pedigrees in an in-memory (or on-disk) SQLite store and wraps
//! them in a metered registry so tests can count store queries.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use familinx_core::{
    Gender, IdRange, Location, MeteredStore, PersonId, Registry, SqliteStore, Years,
};

pub type Metered = Arc<MeteredStore<SqliteStore>>;

/// Fluent builder for test pedigrees
pub struct Pedigree {
    store: SqliteStore,
}

impl Pedigree {
    pub fn new() -> Self {
        Self {
            store: SqliteStore::in_memory().expect("Failed to create in-memory store"),
        }
    }

    pub fn on_disk(path: &Path) -> Self {
        Self {
            store: SqliteStore::create(path).expect("Failed to create store"),
        }
    }

    /// Record `parents` as the parents of `child`
    pub fn child(self, child: PersonId, parents: &[PersonId]) -> Self {
        for &parent in parents {
            self.store
                .insert_relationship(parent, child)
                .expect("Failed to insert relationship");
        }
        self
    }

    pub fn gender(self, id: PersonId, gender: Gender) -> Self {
        self.store
            .insert_gender_code(id, gender.code())
            .expect("Failed to insert gender");
        self
    }

    pub fn years(self, id: PersonId, birth: i32, death: i32) -> Self {
        self.store
            .insert_years(id, Years::new(Some(birth), Some(death)))
            .expect("Failed to insert years");
        self
    }

    pub fn location(self, id: PersonId, location: Location) -> Self {
        self.store
            .insert_location(id, &location)
            .expect("Failed to insert location");
        self
    }

    pub fn into_store(self) -> SqliteStore {
        self.store
    }

    /// Registry over the metered store, with a handle to read the counters
    pub fn registry(self) -> (Registry, Metered) {
        let store = Arc::new(MeteredStore::new(self.store));
        (Registry::new(Arc::clone(&store)), store)
    }

    pub fn registry_with_bounds(self, min: PersonId, max: PersonId) -> (Registry, Metered) {
        let bounds = IdRange::new(min, max).expect("Invalid bounds");
        let store = Arc::new(MeteredStore::new(self.store));
        (Registry::with_bounds(Arc::clone(&store), bounds), store)
    }
}

/// Ids of a fallible person sequence, sorted
pub fn sorted_ids<I>(people: I) -> Vec<PersonId>
where
    I: IntoIterator<Item = familinx_core::Result<Arc<familinx_core::Person>>>,
{
    let mut ids: Vec<PersonId> = people
        .into_iter()
        .map(|p| p.expect("Traversal failed").id())
        .collect();
    ids.sort_unstable();
    ids
}
