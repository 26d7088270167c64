//! FamiLinx Configuration Management
//!
//! Provides configuration loading with support for:
//! - Global config: `~/.familinx/config.toml`
//! - Local config: `.familinx/config.toml` (in the working directory)
//! - CLI overrides via `ConfigOverrides`
//!
//! Configuration is merged in order: global → local → CLI overrides.
//!
//! # Example TOML
//!
//! ```toml
//! [store]
//! path = "data/familinx.db"
//! read_only = true
//!
//! [population]
//! min_id = 1
//! max_id = 43589549
//!
//! [export]
//! command = "dot"
//! format = "svg"
//! render = true
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Lowest person id of the source population
pub const DEFAULT_MIN_ID: u32 = 1;

/// Highest person id of the source population
pub const DEFAULT_MAX_ID: u32 = 43_589_549;

/// Root configuration for FamiLinx.
///
/// Represents the fully merged configuration from all sources.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct FamilinxConfig {
    /// Backing store configuration
    pub store: StoreConfig,

    /// Population bounds
    pub population: PopulationConfig,

    /// Graph export configuration
    pub export: ExportConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Backing store configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database path, relative paths resolve against the working directory
    pub path: PathBuf,

    /// Open the database read-only
    pub read_only: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("familinx.db"),
            read_only: true,
        }
    }
}

/// Inclusive id bounds of the population.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PopulationConfig {
    pub min_id: u32,
    pub max_id: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            min_id: DEFAULT_MIN_ID,
            max_id: DEFAULT_MAX_ID,
        }
    }
}

/// Graphviz export configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Renderer binary
    pub command: String,

    /// Rendered output format
    pub format: String,

    /// Render after writing the DOT file
    pub render: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            command: "dot".to_string(),
            format: "pdf".to_string(),
            render: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON structured logging
    Json,
}

/// CLI overrides for configuration values.
///
/// Used to apply command-line arguments over file-based config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override database path
    pub store_path: Option<PathBuf>,

    /// Override population lower bound
    pub min_id: Option<u32>,

    /// Override population upper bound
    pub max_id: Option<u32>,

    /// Override rendered output format
    pub export_format: Option<String>,

    /// Override rendering after export
    pub render: Option<bool>,

    /// Override log level
    pub log_level: Option<String>,
}

impl FamilinxConfig {
    /// Apply CLI overrides to this configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref path) = overrides.store_path {
            self.store.path = path.clone();
        }

        if let Some(min_id) = overrides.min_id {
            self.population.min_id = min_id;
        }

        if let Some(max_id) = overrides.max_id {
            self.population.max_id = max_id;
        }

        if let Some(ref format) = overrides.export_format {
            self.export.format = format.clone();
        }

        if let Some(render) = overrides.render {
            self.export.render = render;
        }

        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let population = &self.population;
        if population.min_id == 0 {
            return Err(ConfigError::invalid_value(
                "population.min_id",
                "person ids start at 1",
            ));
        }
        if population.min_id > population.max_id {
            return Err(ConfigError::invalid_value(
                "population.max_id",
                format!(
                    "{} is lower than min_id {}",
                    population.max_id, population.min_id
                ),
            ));
        }

        if self.export.format.trim().is_empty() {
            return Err(ConfigError::invalid_value("export.format", "must not be empty"));
        }

        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("unknown level '{}'", self.logging.level),
            ));
        }

        Ok(())
    }

    /// Get the effective database path for a working directory.
    pub fn store_path(&self, root: &Path) -> PathBuf {
        if self.store.path.is_absolute() {
            self.store.path.clone()
        } else {
            root.join(&self.store.path)
        }
    }
}
