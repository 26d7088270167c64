//! Init command - Create an empty store and local configuration

use anyhow::{Context as _, Result};
use clap::Args;
use familinx_config::ConfigLoader;
use familinx_core::SqliteStore;
use tracing::info;

use super::{print_info, Context};

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Skip writing `.familinx/config.toml`
    #[arg(long)]
    no_config: bool,
}

/// Execute the init command
pub fn execute(args: InitArgs, ctx: &Context) -> Result<()> {
    let quiet = ctx.global.quiet;
    let store_path = ctx.store_path();

    if store_path.exists() {
        print_info(
            &format!("Store already exists at {}", store_path.display()),
            quiet,
        );
    } else {
        SqliteStore::create(&store_path)
            .with_context(|| format!("Failed to create store {}", store_path.display()))?;
        info!(path = %store_path.display(), "created store");
        print_info(&format!("Created store {}", store_path.display()), quiet);
    }

    if !args.no_config {
        let config_path = ConfigLoader::new()
            .init_local(&ctx.root)
            .context("Failed to write local configuration")?;
        print_info(&format!("Configuration: {}", config_path.display()), quiet);
    }

    Ok(())
}
