//! Data Store Contract
//!
//! The core consumes raw person facts through the [`DataStore`] trait:
//! one point query per field, keyed by person id. Absent data is reported as
//! `None` (or an empty list), never as an error; errors are reserved for
//! transport and integrity failures and are never retried here.
//!
//! # Implementations
//!
//! ```text
//! DataStore
//! ├── SqliteStore (rusqlite, one table per field)
//! └── MeteredStore<S> (per-query counters around any store)
//! ```

pub mod metered;
pub mod schema;
pub mod sqlite;
#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;
use thiserror::Error;

use crate::types::{FounderStats, Location, PersonId, Years};

pub use metered::{MeteredStore, QueryMetrics};
pub use sqlite::SqliteStore;

/// Errors reported by a data store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch { expected: String, found: String },

    #[error("Invalid value in {table} for person {id}: {message}")]
    InvalidValue {
        table: &'static str,
        id: PersonId,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Create an InvalidValue error.
    pub fn invalid_value(table: &'static str, id: PersonId, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            table,
            id,
            message: message.into(),
        }
    }
}

/// Point queries by person id returning raw facts.
///
/// Stateless from the core's perspective; connection lifecycle belongs to the
/// implementation and its owner.
pub trait DataStore: Send + Sync {
    /// Age in years, if recorded
    fn age(&self, id: PersonId) -> Result<Option<i32>, StoreError>;

    /// Birth and death year; a missing record yields [`Years::UNKNOWN`]
    fn years(&self, id: PersonId) -> Result<Years, StoreError>;

    /// Raw gender code, if recorded (mapping is done by the caller)
    fn gender_code(&self, id: PersonId) -> Result<Option<i64>, StoreError>;

    /// Resolved location, if recorded
    fn location(&self, id: PersonId) -> Result<Option<Location>, StoreError>;

    /// Ids of the immediate ancestors, possibly empty
    fn parent_ids(&self, id: PersonId) -> Result<Vec<PersonId>, StoreError>;

    /// Ids of the immediate descendants, possibly empty
    fn child_ids(&self, id: PersonId) -> Result<Vec<PersonId>, StoreError>;

    /// Lineage statistics, recorded only for founders
    fn founder_stats(&self, id: PersonId) -> Result<Option<FounderStats>, StoreError>;
}

impl<S: DataStore + ?Sized> DataStore for Arc<S> {
    fn age(&self, id: PersonId) -> Result<Option<i32>, StoreError> {
        (**self).age(id)
    }

    fn years(&self, id: PersonId) -> Result<Years, StoreError> {
        (**self).years(id)
    }

    fn gender_code(&self, id: PersonId) -> Result<Option<i64>, StoreError> {
        (**self).gender_code(id)
    }

    fn location(&self, id: PersonId) -> Result<Option<Location>, StoreError> {
        (**self).location(id)
    }

    fn parent_ids(&self, id: PersonId) -> Result<Vec<PersonId>, StoreError> {
        (**self).parent_ids(id)
    }

    fn child_ids(&self, id: PersonId) -> Result<Vec<PersonId>, StoreError> {
        (**self).child_ids(id)
    }

    fn founder_stats(&self, id: PersonId) -> Result<Option<FounderStats>, StoreError> {
        (**self).founder_stats(id)
    }
}
