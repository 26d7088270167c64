//! Person graph error types.

use thiserror::Error;

use crate::store::StoreError;
use crate::types::{Field, PersonId};

/// Errors that can occur while resolving persons and traversing the graph
#[derive(Debug, Error)]
pub enum GraphError {
    /// The data store failed while resolving a field
    #[error("failed to load {field} of person {id}: {source}")]
    Store {
        id: PersonId,
        field: Field,
        #[source]
        source: StoreError,
    },

    /// The store holds a gender code outside the known code set
    #[error("unknown gender code {code} for person {id}")]
    UnknownGenderCode { id: PersonId, code: i64 },

    /// The registry owning this person no longer exists
    #[error("registry for person {id} has been dropped")]
    RegistryDropped { id: PersonId },

    /// An id range reaches outside the configured population bounds
    #[error("id range [{start}, {end}) is outside population bounds [{min}, {max}]")]
    OutOfBounds {
        start: PersonId,
        end: PersonId,
        min: PersonId,
        max: PersonId,
    },

    /// Population bounds are inverted
    #[error("invalid id range: min {min} is greater than max {max}")]
    InvalidRange { min: PersonId, max: PersonId },
}

impl GraphError {
    /// Create a Store error for a failed field resolution.
    pub fn store(id: PersonId, field: Field, source: StoreError) -> Self {
        Self::Store { id, field, source }
    }
}

/// Result alias for person graph operations
pub type Result<T> = std::result::Result<T, GraphError>;
