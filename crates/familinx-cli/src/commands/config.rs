//! Config command - View and manage configuration
//!
//! - Show the effective (merged) configuration
//! - Show configuration file paths
//! - Write a default local configuration

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Subcommand;
use familinx_config::ConfigLoader;
use serde::Serialize;

use super::{print_info, Context};

/// Config management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Show configuration file paths
    Path,

    /// Write `.familinx/config.toml` with defaults
    Init,
}

/// Configuration paths
#[derive(Debug, Clone, Serialize)]
pub struct ConfigPaths {
    /// Global config file path
    pub global: Option<PathBuf>,
    /// Local config file path
    pub local: PathBuf,
    /// Effective store path
    pub store: PathBuf,
    pub global_exists: bool,
    pub local_exists: bool,
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, ctx: &Context) -> Result<()> {
    match cmd {
        ConfigCommand::Show => execute_show(ctx),
        ConfigCommand::Path => execute_path(ctx),
        ConfigCommand::Init => execute_init(ctx),
    }
}

fn execute_show(ctx: &Context) -> Result<()> {
    if ctx.global.json {
        println!("{}", serde_json::to_string_pretty(&ctx.config)?);
    } else {
        print!(
            "{}",
            toml::to_string_pretty(&ctx.config).context("Failed to serialize configuration")?
        );
    }
    Ok(())
}

fn execute_path(ctx: &Context) -> Result<()> {
    let loader = ConfigLoader::new();
    let global = loader.global_config_path();
    let local = loader.local_config_path(&ctx.root);

    let paths = ConfigPaths {
        global_exists: global.as_ref().is_some_and(|p| p.exists()),
        local_exists: local.exists(),
        global,
        local,
        store: ctx.store_path(),
    };

    if ctx.global.json {
        println!("{}", serde_json::to_string_pretty(&paths)?);
        return Ok(());
    }

    let marker = |exists: bool| if exists { "" } else { " (not found)" };
    match paths.global {
        Some(ref path) => println!("Global: {}{}", path.display(), marker(paths.global_exists)),
        None => println!("Global: (no home directory)"),
    }
    println!("Local:  {}{}", paths.local.display(), marker(paths.local_exists));
    println!("Store:  {}", paths.store.display());
    Ok(())
}

fn execute_init(ctx: &Context) -> Result<()> {
    let path = ConfigLoader::new()
        .init_local(&ctx.root)
        .context("Failed to write local configuration")?;
    print_info(&format!("Configuration: {}", path.display()), ctx.global.quiet);
    Ok(())
}
