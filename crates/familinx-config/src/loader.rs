//! Configuration loader with inheritance support.
//!
//! Loads configuration from multiple sources and merges them:
//! 1. Global config: `~/.familinx/config.toml`
//! 2. Local config: `.familinx/config.toml` (in the working directory)
//! 3. CLI overrides
//!
//! Later sources override earlier ones. Each file is read as a layer that
//! only carries the keys it actually sets, so a local file can also put a
//! key back to its default after the global file changed it.

use crate::error::ConfigError;
use crate::{ConfigOverrides, FamilinxConfig, LogFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration directory name, both under the home directory and locally.
const CONFIG_DIR: &str = ".familinx";

/// Configuration loader with caching and inheritance support.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Global config directory (e.g., `~/.familinx`)
    global_config_dir: Option<PathBuf>,

    /// Cached global config layer
    global_layer: Option<ConfigLayer>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    ///
    /// Automatically detects the global config directory (`~/.familinx`).
    pub fn new() -> Self {
        Self {
            global_config_dir: dirs::home_dir().map(|h| h.join(CONFIG_DIR)),
            global_layer: None,
        }
    }

    /// Create a loader with a custom global config directory.
    pub fn with_global_dir(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_config_dir: Some(global_dir.into()),
            global_layer: None,
        }
    }

    /// Get the global config file path.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_config_dir
            .as_ref()
            .map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Get the local config file path for a working directory.
    pub fn local_config_path(&self, root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    /// Load configuration for a working directory with optional CLI overrides.
    ///
    /// Merges config in order: global → local → overrides.
    pub fn load(
        &mut self,
        root: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<FamilinxConfig, ConfigError> {
        let mut config = FamilinxConfig::default();

        if let Some(layer) = self.global_layer()? {
            layer.apply_to(&mut config);
        }

        if let Some(layer) = self.local_layer(root)? {
            layer.apply_to(&mut config);
        }

        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }

        Ok(config)
    }

    /// Load a single explicit config file over the defaults, then apply overrides.
    ///
    /// Global and local files are ignored.
    pub fn load_file(
        &self,
        path: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<FamilinxConfig, ConfigError> {
        debug!("Loading config from {:?}", path);
        let mut config = FamilinxConfig::default();
        read_layer(path)?.apply_to(&mut config);
        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }
        Ok(config)
    }

    /// Load only the global configuration, filled in with defaults.
    pub fn load_global(&mut self) -> Result<Option<FamilinxConfig>, ConfigError> {
        Ok(self.global_layer()?.map(ConfigLayer::into_config))
    }

    /// Load only the local configuration for a working directory, filled in
    /// with defaults.
    pub fn load_local(&self, root: &Path) -> Result<Option<FamilinxConfig>, ConfigError> {
        Ok(self.local_layer(root)?.map(ConfigLayer::into_config))
    }

    fn global_layer(&mut self) -> Result<Option<ConfigLayer>, ConfigError> {
        if let Some(ref layer) = self.global_layer {
            return Ok(Some(layer.clone()));
        }

        let Some(global_path) = self.global_config_path() else {
            debug!("No home directory found, skipping global config");
            return Ok(None);
        };

        if !global_path.exists() {
            trace!("Global config not found at {:?}", global_path);
            return Ok(None);
        }

        debug!("Loading global config from {:?}", global_path);
        let layer = read_layer(&global_path)?;
        self.global_layer = Some(layer.clone());

        Ok(Some(layer))
    }

    fn local_layer(&self, root: &Path) -> Result<Option<ConfigLayer>, ConfigError> {
        let local_path = self.local_config_path(root);

        if !local_path.exists() {
            trace!("Local config not found at {:?}", local_path);
            return Ok(None);
        }

        debug!("Loading local config from {:?}", local_path);
        read_layer(&local_path).map(Some)
    }

    /// Save configuration to the local config file for a working directory.
    pub fn save_local(&self, root: &Path, config: &FamilinxConfig) -> Result<(), ConfigError> {
        save_config_file(&self.local_config_path(root), config)
    }

    /// Initialize local configuration for a working directory.
    ///
    /// Creates `.familinx/config.toml` with default configuration unless one
    /// already exists. Returns the config file path.
    pub fn init_local(&self, root: &Path) -> Result<PathBuf, ConfigError> {
        let config_path = self.local_config_path(root);
        if !config_path.exists() {
            save_config_file(&config_path, &FamilinxConfig::default())?;
        }

        Ok(config_path)
    }

    /// Clear cached global configuration.
    ///
    /// Forces reload on next `load_global()` call.
    pub fn clear_cache(&mut self) {
        self.global_layer = None;
    }
}

/// Read a configuration file as a layer of explicitly set keys.
fn read_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

    toml::from_str(&content).map_err(|e| ConfigError::parse_toml(path, e))
}

/// Save a configuration file to disk.
fn save_config_file(path: &Path, config: &FamilinxConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
}

/// One configuration file. Absent keys stay `None` and leave the value
/// underneath untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    store: StoreLayer,
    population: PopulationLayer,
    export: ExportLayer,
    logging: LoggingLayer,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct StoreLayer {
    path: Option<PathBuf>,
    read_only: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct PopulationLayer {
    min_id: Option<u32>,
    max_id: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ExportLayer {
    command: Option<String>,
    format: Option<String>,
    render: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct LoggingLayer {
    level: Option<String>,
    format: Option<LogFormat>,
}

/// Replace `target` when the layer sets a value.
fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl ConfigLayer {
    fn apply_to(self, config: &mut FamilinxConfig) {
        set(&mut config.store.path, self.store.path);
        set(&mut config.store.read_only, self.store.read_only);

        set(&mut config.population.min_id, self.population.min_id);
        set(&mut config.population.max_id, self.population.max_id);

        set(&mut config.export.command, self.export.command);
        set(&mut config.export.format, self.export.format);
        set(&mut config.export.render, self.export.render);

        set(&mut config.logging.level, self.logging.level);
        set(&mut config.logging.format, self.logging.format);
    }

    fn into_config(self) -> FamilinxConfig {
        let mut config = FamilinxConfig::default();
        self.apply_to(&mut config);
        config
    }
}
