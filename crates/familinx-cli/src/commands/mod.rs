//! CLI command implementations
//!
//! This module contains all FamiLinx CLI command implementations.

pub mod config;
pub mod descendants;
pub mod export;
pub mod init;
pub mod person;
pub mod scan;
pub mod walk;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use familinx_config::{ConfigLoader, FamilinxConfig};
use familinx_core::{IdRange, Person, PersonId, Registry, SqliteStore};
use serde::Serialize;
use tracing::debug;

use crate::GlobalOptions;

/// Resolved options and configuration shared by every command
pub struct Context {
    pub global: GlobalOptions,
    /// Directory relative store paths and the local config resolve against
    pub root: PathBuf,
    pub config: FamilinxConfig,
}

impl Context {
    /// Resolve the working directory and load the merged configuration.
    pub fn load(global: GlobalOptions) -> Result<Self> {
        let root = std::env::current_dir().context("Failed to get current directory")?;
        let overrides = global.to_config_overrides();

        let config = match global.config {
            Some(ref path) => ConfigLoader::new()
                .load_file(path, Some(&overrides))
                .with_context(|| format!("Failed to load config file {}", path.display()))?,
            None => ConfigLoader::new()
                .load(&root, Some(&overrides))
                .context("Failed to load configuration")?,
        };
        config.validate().context("Invalid configuration")?;

        Ok(Self {
            global,
            root,
            config,
        })
    }

    /// Effective store database path
    pub fn store_path(&self) -> PathBuf {
        self.config.store_path(&self.root)
    }

    /// Configured population bounds
    pub fn bounds(&self) -> Result<IdRange> {
        let population = &self.config.population;
        IdRange::new(population.min_id, population.max_id).context("Invalid population bounds")
    }

    /// Open the store and wrap it in a fresh registry.
    pub fn open_registry(&self) -> Result<Registry> {
        let path = self.store_path();
        if !path.exists() {
            anyhow::bail!(
                "Store not found at {} (run 'familinx init' or pass --db)",
                path.display()
            );
        }

        let store = if self.config.store.read_only {
            SqliteStore::open_read_only(&path)
        } else {
            SqliteStore::open(&path)
        }
        .with_context(|| format!("Failed to open store {}", path.display()))?;

        debug!(path = %path.display(), read_only = self.config.store.read_only, "opened store");
        Ok(Registry::with_bounds(store, self.bounds()?))
    }
}

/// One line of person list output
#[derive(Debug, Serialize)]
pub struct PersonEntry {
    pub id: PersonId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<u32>,
}

/// Print a list of persons as ids (text) or a JSON array
pub fn print_people(entries: &[PersonEntry], global: &GlobalOptions) -> Result<()> {
    if global.json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    for entry in entries {
        match entry.distance {
            Some(distance) => println!("{}\t{}", entry.id, distance),
            None => println!("{}", entry.id),
        }
    }
    Ok(())
}

/// Look up the start person of a traversal, rejecting ids outside the population
pub fn start_person(registry: &Registry, id: PersonId) -> Result<Arc<Person>> {
    let bounds = registry.bounds();
    if !bounds.contains(id) {
        anyhow::bail!(
            "Person {} is outside the population bounds [{}, {}]",
            id,
            bounds.min(),
            bounds.max()
        );
    }
    Ok(registry.get_or_create(id))
}

/// Print an info message (respects quiet flag).
pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", message);
    }
}
