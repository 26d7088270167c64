//! Metered Data Store
//!
//! Wraps any [`DataStore`] and counts the queries issued per field. Used to
//! observe how many store round-trips a traversal costs and to verify that
//! lazy fields resolve at most once.

use parking_lot::Mutex;
use tracing::trace;

use super::{DataStore, StoreError};
use crate::types::{Field, FounderStats, Location, PersonId, Years};

/// Query counters per field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMetrics {
    pub age: u64,
    pub years: u64,
    pub gender: u64,
    pub location: u64,
    pub parents: u64,
    pub children: u64,
    pub founder_stats: u64,
    /// Number of queries that returned an error
    pub failures: u64,
}

impl QueryMetrics {
    /// Total number of queries issued
    pub fn total(&self) -> u64 {
        self.age
            + self.years
            + self.gender
            + self.location
            + self.parents
            + self.children
            + self.founder_stats
    }

    /// Number of queries issued for one field
    pub fn count(&self, field: Field) -> u64 {
        match field {
            Field::Age => self.age,
            Field::Years => self.years,
            Field::Gender => self.gender,
            Field::Location => self.location,
            Field::Parents => self.parents,
            Field::Children => self.children,
            Field::FounderStats => self.founder_stats,
        }
    }

    fn record(&mut self, field: Field) {
        let counter = match field {
            Field::Age => &mut self.age,
            Field::Years => &mut self.years,
            Field::Gender => &mut self.gender,
            Field::Location => &mut self.location,
            Field::Parents => &mut self.parents,
            Field::Children => &mut self.children,
            Field::FounderStats => &mut self.founder_stats,
        };
        *counter += 1;
    }
}

/// A data store decorator that counts queries
pub struct MeteredStore<S> {
    inner: S,
    metrics: Mutex<QueryMetrics>,
}

impl<S: DataStore> MeteredStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            metrics: Mutex::new(QueryMetrics::default()),
        }
    }

    /// Get a snapshot of the query counters
    pub fn metrics(&self) -> QueryMetrics {
        self.metrics.lock().clone()
    }

    /// Reset all query counters
    pub fn reset_metrics(&self) {
        *self.metrics.lock() = QueryMetrics::default();
    }

    fn metered<T>(
        &self,
        field: Field,
        id: PersonId,
        query: impl FnOnce(&S) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        trace!(person = id, field = field.as_str(), "store query");
        let result = query(&self.inner);

        let mut metrics = self.metrics.lock();
        metrics.record(field);
        if result.is_err() {
            metrics.failures += 1;
        }
        result
    }
}

impl<S: DataStore> DataStore for MeteredStore<S> {
    fn age(&self, id: PersonId) -> Result<Option<i32>, StoreError> {
        self.metered(Field::Age, id, |s| s.age(id))
    }

    fn years(&self, id: PersonId) -> Result<Years, StoreError> {
        self.metered(Field::Years, id, |s| s.years(id))
    }

    fn gender_code(&self, id: PersonId) -> Result<Option<i64>, StoreError> {
        self.metered(Field::Gender, id, |s| s.gender_code(id))
    }

    fn location(&self, id: PersonId) -> Result<Option<Location>, StoreError> {
        self.metered(Field::Location, id, |s| s.location(id))
    }

    fn parent_ids(&self, id: PersonId) -> Result<Vec<PersonId>, StoreError> {
        self.metered(Field::Parents, id, |s| s.parent_ids(id))
    }

    fn child_ids(&self, id: PersonId) -> Result<Vec<PersonId>, StoreError> {
        self.metered(Field::Children, id, |s| s.child_ids(id))
    }

    fn founder_stats(&self, id: PersonId) -> Result<Option<FounderStats>, StoreError> {
        self.metered(Field::FounderStats, id, |s| s.founder_stats(id))
    }
}
