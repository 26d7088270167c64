//! SQLite Data Store
//!
//! A [`DataStore`] backed by a single SQLite database with one table per
//! person field. Also provides the loaders used to populate a store.

use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Result as SqliteResult};
use std::path::Path;
use tracing::debug;

use super::schema::{SCHEMA_CREATE_INDEXES, SCHEMA_TABLES, STORE_SCHEMA_VERSION};
use super::{DataStore, StoreError};
use crate::types::{Continent, FounderStats, Location, PersonId, Years};

/// A connection to a person store database
///
/// The connection is guarded by a mutex so the store can be shared by
/// reference; queries are still executed one at a time.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open an existing store database for reading and writing
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::configure_connection(&conn)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.check_schema_version()?;
        debug!("Opened person store at {:?}", path);
        Ok(store)
    }

    /// Open an existing store database without write access
    pub fn open_read_only(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.pragma_update(None, "cache_size", -64000)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.check_schema_version()?;
        debug!("Opened read-only person store at {:?}", path);
        Ok(store)
    }

    /// Create a new store database with schema
    pub fn create(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::configure_connection(&conn)?;
        Self::create_schema(&conn)?;
        debug!("Created person store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store database (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::configure_connection(&conn)?;
        Self::create_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn create_schema(conn: &Connection) -> Result<(), StoreError> {
        for table in SCHEMA_TABLES {
            conn.execute(table, [])?;
        }
        conn.execute_batch(SCHEMA_CREATE_INDEXES)?;
        conn.execute(
            "INSERT OR REPLACE INTO store_metadata (key, value) VALUES ('schema_version', ?1)",
            [STORE_SCHEMA_VERSION],
        )?;
        Ok(())
    }

    /// Configure connection with read-heavy settings
    fn configure_connection(conn: &Connection) -> SqliteResult<()> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        // Negative value = KB
        conn.pragma_update(None, "cache_size", -64000)?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        conn.pragma_update(None, "mmap_size", 268435456)?;
        Ok(())
    }

    fn check_schema_version(&self) -> Result<(), StoreError> {
        match self.get_metadata("schema_version")? {
            Some(version) if version == STORE_SCHEMA_VERSION => Ok(()),
            Some(version) => Err(StoreError::SchemaVersionMismatch {
                expected: STORE_SCHEMA_VERSION.to_string(),
                found: version,
            }),
            None => Err(StoreError::SchemaVersionMismatch {
                expected: STORE_SCHEMA_VERSION.to_string(),
                found: "none".to_string(),
            }),
        }
    }

    // =========================================================================
    // Metadata Operations
    // =========================================================================

    /// Get a metadata value
    fn get_metadata(&self, key: &str) -> Result<Option<String>, StoreError> {
        let result = self
            .conn
            .lock()
            .query_row(
                "SELECT value FROM store_metadata WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(result)
    }

    // =========================================================================
    // Loaders
    // =========================================================================

    /// Record the age of a person
    pub fn insert_age(&self, id: PersonId, age: Option<i32>) -> Result<(), StoreError> {
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO age (id, age) VALUES (?1, ?2)",
            params![id, age],
        )?;
        Ok(())
    }

    /// Record birth and death year of a person
    pub fn insert_years(&self, id: PersonId, years: Years) -> Result<(), StoreError> {
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO years (id, birth_year, death_year) VALUES (?1, ?2, ?3)",
            params![id, years.birth, years.death],
        )?;
        Ok(())
    }

    /// Record a raw gender code; codes are not validated on write
    pub fn insert_gender_code(&self, id: PersonId, code: i64) -> Result<(), StoreError> {
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO gender (id, code) VALUES (?1, ?2)",
            params![id, code],
        )?;
        Ok(())
    }

    /// Record the location of a person
    pub fn insert_location(&self, id: PersonId, location: &Location) -> Result<(), StoreError> {
        self.conn.lock().execute(
            r#"
            INSERT OR REPLACE INTO location (id, lon, lat, country, continent, resolution)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                id,
                location.longitude,
                location.latitude,
                location.country,
                location.continent.map(|c| c.code()),
                location.resolution,
            ],
        )?;
        Ok(())
    }

    /// Record a parent -> child edge
    pub fn insert_relationship(&self, parent: PersonId, child: PersonId) -> Result<(), StoreError> {
        self.conn.lock().execute(
            "INSERT OR IGNORE INTO relationship (parent_id, child_id) VALUES (?1, ?2)",
            params![parent, child],
        )?;
        Ok(())
    }

    /// Record multiple parent -> child edges in a transaction
    pub fn insert_relationships(&self, edges: &[(PersonId, PersonId)]) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let tx = conn.unchecked_transaction()?;

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO relationship (parent_id, child_id) VALUES (?1, ?2)",
            )?;
            for (parent, child) in edges {
                stmt.execute(params![parent, child])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Record lineage statistics for a founder
    pub fn insert_founder_stats(
        &self,
        id: PersonId,
        stats: &FounderStats,
    ) -> Result<(), StoreError> {
        let leaf_count = i64::try_from(stats.leaf_count)
            .map_err(|_| StoreError::invalid_value("founders", id, "leaf count overflows"))?;

        self.conn.lock().execute(
            r#"
            INSERT OR REPLACE INTO founders (founder_id, leaf_count, min_depth, max_depth, median_depth)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                id,
                leaf_count,
                stats.min_depth,
                stats.max_depth,
                stats.median_depth
            ],
        )?;
        Ok(())
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Count distinct persons with at least one recorded fact or edge
    pub fn person_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self.conn.lock().query_row(
            r#"
            SELECT COUNT(*) FROM (
                SELECT id FROM age
                UNION SELECT id FROM years
                UNION SELECT id FROM gender
                UNION SELECT id FROM location
                UNION SELECT parent_id FROM relationship
                UNION SELECT child_id FROM relationship
            )
            "#,
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Get relationship (edge) count
    pub fn relationship_count(&self) -> Result<usize, StoreError> {
        let count: i64 =
            self.conn
                .lock()
                .query_row("SELECT COUNT(*) FROM relationship", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn query_ids(&self, sql: &str, id: PersonId) -> Result<Vec<PersonId>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(sql)?;
        let ids = stmt
            .query_map([id], |row| row.get(0))?
            .collect::<SqliteResult<Vec<PersonId>>>()?;
        Ok(ids)
    }
}

impl DataStore for SqliteStore {
    fn age(&self, id: PersonId) -> Result<Option<i32>, StoreError> {
        let age = self
            .conn
            .lock()
            .prepare_cached("SELECT age FROM age WHERE id = ?1")?
            .query_row([id], |row| row.get::<_, Option<i32>>(0))
            .optional()?;
        Ok(age.flatten())
    }

    fn years(&self, id: PersonId) -> Result<Years, StoreError> {
        let years = self
            .conn
            .lock()
            .prepare_cached("SELECT birth_year, death_year FROM years WHERE id = ?1")?
            .query_row([id], |row| Ok(Years::new(row.get(0)?, row.get(1)?)))
            .optional()?;
        Ok(years.unwrap_or(Years::UNKNOWN))
    }

    fn gender_code(&self, id: PersonId) -> Result<Option<i64>, StoreError> {
        let code = self
            .conn
            .lock()
            .prepare_cached("SELECT code FROM gender WHERE id = ?1")?
            .query_row([id], |row| row.get(0))
            .optional()?;
        Ok(code)
    }

    fn location(&self, id: PersonId) -> Result<Option<Location>, StoreError> {
        type Row = (f64, f64, Option<String>, Option<String>, Option<i32>);

        let row: Option<Row> = self
            .conn
            .lock()
            .prepare_cached(
                "SELECT lon, lat, country, continent, resolution FROM location WHERE id = ?1",
            )?
            .query_row([id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })
            .optional()?;

        let Some((longitude, latitude, country, continent, resolution)) = row else {
            return Ok(None);
        };

        let continent = continent
            .map(|code| code.parse::<Continent>())
            .transpose()
            .map_err(|message| StoreError::invalid_value("location", id, message))?;

        Ok(Some(Location {
            longitude,
            latitude,
            country,
            continent,
            resolution,
        }))
    }

    fn parent_ids(&self, id: PersonId) -> Result<Vec<PersonId>, StoreError> {
        self.query_ids(
            "SELECT parent_id FROM relationship WHERE child_id = ?1 ORDER BY id",
            id,
        )
    }

    fn child_ids(&self, id: PersonId) -> Result<Vec<PersonId>, StoreError> {
        self.query_ids(
            "SELECT child_id FROM relationship WHERE parent_id = ?1 ORDER BY id",
            id,
        )
    }

    fn founder_stats(&self, id: PersonId) -> Result<Option<FounderStats>, StoreError> {
        let row: Option<(i64, u32, u32, f64)> = self
            .conn
            .lock()
            .prepare_cached(
                r#"
                SELECT leaf_count, min_depth, max_depth, median_depth
                FROM founders WHERE founder_id = ?1
                "#,
            )?
            .query_row([id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })
            .optional()?;

        let Some((leaf_count, min_depth, max_depth, median_depth)) = row else {
            return Ok(None);
        };

        let leaf_count = u64::try_from(leaf_count)
            .map_err(|_| StoreError::invalid_value("founders", id, "negative leaf count"))?;

        Ok(Some(FounderStats {
            leaf_count,
            min_depth,
            max_depth,
            median_depth,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_location() -> Location {
        Location {
            longitude: 10.75,
            latitude: 59.91,
            country: Some("Norway".to_string()),
            continent: Some(Continent::Europe),
            resolution: Some(3),
        }
    }

    #[test]
    fn test_create_in_memory() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.person_count().unwrap(), 0);
        assert_eq!(store.relationship_count().unwrap(), 0);
        assert_eq!(
            store.get_metadata("schema_version").unwrap(),
            Some(STORE_SCHEMA_VERSION.to_string())
        );
    }

    #[test]
    fn test_absent_facts_resolve_to_none() {
        let store = SqliteStore::in_memory().unwrap();

        assert_eq!(store.age(1).unwrap(), None);
        assert_eq!(store.years(1).unwrap(), Years::UNKNOWN);
        assert_eq!(store.gender_code(1).unwrap(), None);
        assert_eq!(store.location(1).unwrap(), None);
        assert!(store.parent_ids(1).unwrap().is_empty());
        assert!(store.child_ids(1).unwrap().is_empty());
        assert_eq!(store.founder_stats(1).unwrap(), None);
    }

    #[test]
    fn test_scalar_facts_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();

        store.insert_age(4, Some(71)).unwrap();
        store.insert_years(4, Years::new(Some(1790), None)).unwrap();
        store.insert_gender_code(4, 2).unwrap();
        store.insert_location(4, &sample_location()).unwrap();

        assert_eq!(store.age(4).unwrap(), Some(71));
        assert_eq!(store.years(4).unwrap(), Years::new(Some(1790), None));
        assert_eq!(store.gender_code(4).unwrap(), Some(2));
        assert_eq!(store.location(4).unwrap(), Some(sample_location()));
        assert_eq!(store.person_count().unwrap(), 1);
    }

    #[test]
    fn test_relationships_keep_insertion_order() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .insert_relationships(&[(10, 30), (10, 20), (11, 20), (10, 40)])
            .unwrap();
        // Duplicate edges are ignored
        store.insert_relationship(10, 20).unwrap();

        assert_eq!(store.child_ids(10).unwrap(), vec![30, 20, 40]);
        assert_eq!(store.parent_ids(20).unwrap(), vec![10, 11]);
        assert_eq!(store.relationship_count().unwrap(), 4);
        assert_eq!(store.person_count().unwrap(), 5);
    }

    #[test]
    fn test_founder_stats_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();
        let stats = FounderStats {
            leaf_count: 1200,
            min_depth: 2,
            max_depth: 11,
            median_depth: 6.5,
        };
        store.insert_founder_stats(8, &stats).unwrap();
        assert_eq!(store.founder_stats(8).unwrap(), Some(stats));
    }

    #[test]
    fn test_invalid_continent_is_error() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .conn
            .lock()
            .execute(
                "INSERT INTO location (id, lon, lat, continent) VALUES (1, 0.0, 0.0, 'XX')",
                [],
            )
            .unwrap();

        let err = store.location(1).unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidValue {
                table: "location",
                id: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_create_and_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("familinx.db");

        {
            let store = SqliteStore::create(&db_path).unwrap();
            store.insert_relationship(1, 2).unwrap();
        }

        let store = SqliteStore::open(&db_path).unwrap();
        assert_eq!(store.child_ids(1).unwrap(), vec![2]);

        let read_only = SqliteStore::open_read_only(&db_path).unwrap();
        assert_eq!(read_only.parent_ids(2).unwrap(), vec![1]);
    }

    #[test]
    fn test_open_rejects_foreign_schema() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("other.db");

        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute(
                "CREATE TABLE store_metadata (key TEXT PRIMARY KEY NOT NULL, value TEXT NOT NULL)",
                [],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO store_metadata (key, value) VALUES ('schema_version', '0.1')",
                [],
            )
            .unwrap();
        }

        let err = SqliteStore::open(&db_path).err().unwrap();
        assert!(matches!(err, StoreError::SchemaVersionMismatch { .. }));
    }
}
