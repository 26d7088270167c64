//! SQLite Schema Definitions for the Person Store
//!
//! One table per person field, mirroring the point queries of the
//! [`DataStore`](super::DataStore) contract. Every table is keyed by person id;
//! a missing row means the fact is unknown.

/// Schema version for store databases
pub const STORE_SCHEMA_VERSION: &str = "1.0";

/// SQL to create the age table
pub const SCHEMA_CREATE_AGE: &str = r#"
CREATE TABLE IF NOT EXISTS age (
    id INTEGER PRIMARY KEY NOT NULL,
    age INTEGER
)
"#;

/// SQL to create the years table
///
/// Birth and death year are stored side by side and always read together.
pub const SCHEMA_CREATE_YEARS: &str = r#"
CREATE TABLE IF NOT EXISTS years (
    id INTEGER PRIMARY KEY NOT NULL,
    birth_year INTEGER,
    death_year INTEGER
)
"#;

/// SQL to create the gender table
///
/// Stores the raw code (1 = male, 2 = female); other codes are rejected on read.
pub const SCHEMA_CREATE_GENDER: &str = r#"
CREATE TABLE IF NOT EXISTS gender (
    id INTEGER PRIMARY KEY NOT NULL,
    code INTEGER NOT NULL
)
"#;

/// SQL to create the location table
pub const SCHEMA_CREATE_LOCATION: &str = r#"
CREATE TABLE IF NOT EXISTS location (
    id INTEGER PRIMARY KEY NOT NULL,
    lon REAL NOT NULL,
    lat REAL NOT NULL,

    -- Country name as geocoded
    country TEXT,

    -- Two-letter continent code (AF, AS, EU, NA, OC, SA, AN)
    continent TEXT,

    -- Geocoding resolution level
    resolution INTEGER
)
"#;

/// SQL to create the relationship table
///
/// One row per parent -> child edge. The autoincrement id preserves insertion
/// order for parent and child lists.
pub const SCHEMA_CREATE_RELATIONSHIP: &str = r#"
CREATE TABLE IF NOT EXISTS relationship (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    parent_id INTEGER NOT NULL,
    child_id INTEGER NOT NULL,

    UNIQUE(parent_id, child_id)
)
"#;

/// SQL to create the founders table
pub const SCHEMA_CREATE_FOUNDERS: &str = r#"
CREATE TABLE IF NOT EXISTS founders (
    founder_id INTEGER PRIMARY KEY NOT NULL,
    leaf_count INTEGER NOT NULL,
    min_depth INTEGER NOT NULL,
    max_depth INTEGER NOT NULL,
    median_depth REAL NOT NULL
)
"#;

/// SQL to create the metadata table
pub const SCHEMA_CREATE_METADATA: &str = r#"
CREATE TABLE IF NOT EXISTS store_metadata (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)
"#;

/// SQL to create indexes for efficient edge queries
pub const SCHEMA_CREATE_INDEXES: &str = r#"
-- Parent lookups (child -> parents)
CREATE INDEX IF NOT EXISTS idx_relationship_child ON relationship(child_id);

-- Child lookups (parent -> children)
CREATE INDEX IF NOT EXISTS idx_relationship_parent ON relationship(parent_id);
"#;

/// All table definitions, in creation order
pub const SCHEMA_TABLES: [&str; 7] = [
    SCHEMA_CREATE_AGE,
    SCHEMA_CREATE_YEARS,
    SCHEMA_CREATE_GENDER,
    SCHEMA_CREATE_LOCATION,
    SCHEMA_CREATE_RELATIONSHIP,
    SCHEMA_CREATE_FOUNDERS,
    SCHEMA_CREATE_METADATA,
];
