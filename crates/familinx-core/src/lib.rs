//! FamiLinx Core - Lazily populated person graph over a genealogical store
//!
//! This crate provides the in-process object model over a large population
//! graph whose raw facts live in an external data store:
//! - Identity-mapped registry handing out one live person per id
//! - Per-field lazy resolution with explicit invalidation
//! - Descendant enumeration and bounded neighborhood walks
//! - SQLite data store and a query-counting decorator
//! - Graphviz export of person sets
//!
//! ```ignore
//! use familinx_core::{Registry, SqliteStore};
//!
//! let registry = Registry::new(SqliteStore::open_read_only(path)?);
//! let person = registry.get_or_create(42);
//! for relative in person.walk().radius(2) {
//!     println!("{}", relative?);
//! }
//! ```

pub mod error;
pub mod export;
pub mod lazy;
pub mod person;
pub mod registry;
pub mod store;
pub mod traversal;
pub mod types;

// Re-exports for convenience
pub use error::{GraphError, Result};
pub use lazy::LazyField;
pub use person::Person;
pub use registry::{IdRange, PersonIter, Registry, RegistryMetrics};
pub use traversal::{Descendants, Walk};
pub use types::{
    Continent, Field, FounderStats, Gender, Location, PersonId, PersonStats, Years,
    MAX_PERSON_ID, MIN_PERSON_ID,
};

// Store re-exports
pub use store::{DataStore, MeteredStore, QueryMetrics, SqliteStore, StoreError};

// Export re-exports
pub use export::{
    graph_lines, render, write_graph, write_graph_file, ExportError, NodeStyles, RenderOptions,
};
