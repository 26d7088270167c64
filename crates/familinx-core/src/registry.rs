//! Person Registry (identity map)
//!
//! Owns the mapping from person id to the single live [`Person`] for that id
//! and the data store every person resolves its fields through.
//!
//! ```text
//! Registry (cheap to clone, shared state behind Arc)
//! ├── DataStore (raw facts, one query per field)
//! ├── DashMap<PersonId, Arc<Person>> (identity map)
//! └── RegistryMetrics (lookup hits / misses / evictions)
//! ```
//!
//! Eviction is caller-driven only: a person stays cached until it is evicted
//! or the registry is cleared. Evicting a person drops the registry's
//! reference; clones held elsewhere keep their field caches, and the next
//! lookup of that id constructs a fresh person.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::error::{GraphError, Result};
use crate::person::Person;
use crate::store::DataStore;
use crate::types::{PersonId, MAX_PERSON_ID, MIN_PERSON_ID};

/// Inclusive range of valid person ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdRange {
    min: PersonId,
    max: PersonId,
}

impl Default for IdRange {
    fn default() -> Self {
        Self::POPULATION
    }
}

impl IdRange {
    /// Bounds of the full source population
    pub const POPULATION: IdRange = IdRange {
        min: MIN_PERSON_ID,
        max: MAX_PERSON_ID,
    };

    /// Create a range, rejecting `min > max`
    pub fn new(min: PersonId, max: PersonId) -> Result<Self> {
        if min > max {
            return Err(GraphError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> PersonId {
        self.min
    }

    pub fn max(&self) -> PersonId {
        self.max
    }

    pub fn contains(&self, id: PersonId) -> bool {
        (self.min..=self.max).contains(&id)
    }

    /// Number of ids in the range
    pub fn len(&self) -> u64 {
        u64::from(self.max) - u64::from(self.min) + 1
    }

    /// Always false: a range holds at least one id
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate the ids in ascending order
    pub fn iter(&self) -> std::ops::RangeInclusive<PersonId> {
        self.min..=self.max
    }
}

/// Registry lookup metrics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryMetrics {
    /// Lookups answered from the identity map
    pub hits: u64,
    /// Lookups that constructed a new person
    pub misses: u64,
    /// Persons evicted (single evictions and clears)
    pub evictions: u64,
}

impl RegistryMetrics {
    /// Get hit rate as a fraction (0.0 - 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub(crate) struct RegistryInner {
    store: Arc<dyn DataStore>,
    people: DashMap<PersonId, Arc<Person>>,
    bounds: IdRange,
    metrics: Mutex<RegistryMetrics>,
}

/// Identity map from person id to the live person for that id
///
/// Cloning a registry yields another handle to the same map.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    /// Create a registry over a store with the full population bounds
    pub fn new<S: DataStore + 'static>(store: S) -> Self {
        Self::with_bounds(store, IdRange::POPULATION)
    }

    /// Create a registry with custom population bounds
    pub fn with_bounds<S: DataStore + 'static>(store: S, bounds: IdRange) -> Self {
        Self::from_shared(Arc::new(store), bounds)
    }

    /// Create a registry over an already shared store
    pub fn from_shared(store: Arc<dyn DataStore>, bounds: IdRange) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                store,
                people: DashMap::new(),
                bounds,
                metrics: Mutex::new(RegistryMetrics::default()),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<RegistryInner>) -> Self {
        Self { inner }
    }

    /// The store persons resolve their fields through
    pub fn store(&self) -> &Arc<dyn DataStore> {
        &self.inner.store
    }

    /// Population bounds used by [`Registry::iter_people`]
    pub fn bounds(&self) -> IdRange {
        self.inner.bounds
    }

    /// Get the live person for `id`, constructing it on first lookup.
    ///
    /// Never returns two different instances for the same id while the
    /// person is cached. No data store query is made here.
    pub fn get_or_create(&self, id: PersonId) -> Arc<Person> {
        if let Some(person) = self.inner.people.get(&id) {
            self.inner.metrics.lock().hits += 1;
            return person.value().clone();
        }

        let mut created = false;
        let person = self
            .inner
            .people
            .entry(id)
            .or_insert_with(|| {
                created = true;
                Arc::new(Person::new(id, Arc::downgrade(&self.inner)))
            })
            .value()
            .clone();

        let mut metrics = self.inner.metrics.lock();
        if created {
            trace!(person = id, "registered person");
            metrics.misses += 1;
        } else {
            metrics.hits += 1;
        }
        person
    }

    /// Get the person for `id` only if it is currently cached
    pub fn get_if_cached(&self, id: PersonId) -> Option<Arc<Person>> {
        self.inner.people.get(&id).map(|p| p.value().clone())
    }

    /// Check if a person is currently cached
    pub fn contains(&self, id: PersonId) -> bool {
        self.inner.people.contains_key(&id)
    }

    /// Number of cached persons
    pub fn len(&self) -> usize {
        self.inner.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.people.is_empty()
    }

    /// Iterate every person in the population bounds, in ascending id order
    pub fn iter_people(&self) -> PersonIter {
        let bounds = self.inner.bounds;
        PersonIter {
            registry: self.clone(),
            next: u64::from(bounds.min),
            end: u64::from(bounds.max) + 1,
        }
    }

    /// Iterate persons with ids in `[start, end)`, in ascending id order.
    ///
    /// A range reaching outside the population bounds is rejected rather
    /// than clamped.
    pub fn iter_range(&self, start: PersonId, end: PersonId) -> Result<PersonIter> {
        let bounds = self.inner.bounds;
        let out_of_bounds = start < bounds.min
            || u64::from(end) > u64::from(bounds.max) + 1
            || start > end;
        if out_of_bounds {
            return Err(GraphError::OutOfBounds {
                start,
                end,
                min: bounds.min,
                max: bounds.max,
            });
        }

        Ok(PersonIter {
            registry: self.clone(),
            next: u64::from(start),
            end: u64::from(end),
        })
    }

    /// Evict a single person.
    ///
    /// Returns true if the person was cached. Evicting an absent id is a no-op.
    pub fn evict(&self, id: PersonId) -> bool {
        let evicted = self.inner.people.remove(&id).is_some();
        if evicted {
            debug!(person = id, "evicted person");
            self.inner.metrics.lock().evictions += 1;
        }
        evicted
    }

    /// Evict all persons
    pub fn clear(&self) {
        let count = self.inner.people.len();
        self.inner.people.clear();
        self.inner.metrics.lock().evictions += count as u64;
        debug!(count, "cleared person registry");
    }

    /// Get a snapshot of lookup metrics
    pub fn metrics(&self) -> RegistryMetrics {
        self.inner.metrics.lock().clone()
    }

    /// Reset lookup metrics
    pub fn reset_metrics(&self) {
        *self.inner.metrics.lock() = RegistryMetrics::default();
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("cached", &self.len())
            .field("bounds", &self.inner.bounds)
            .finish()
    }
}

/// Lazy iterator over a contiguous id range, resolving through the registry
pub struct PersonIter {
    registry: Registry,
    next: u64,
    end: u64,
}

impl Iterator for PersonIter {
    type Item = Arc<Person>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        // Bounded by IdRange, so the id always fits
        let id = self.next as PersonId;
        self.next += 1;
        Some(self.registry.get_or_create(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PersonIter {}
