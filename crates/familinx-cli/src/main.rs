//! FamiLinx CLI - Explore a genealogical population graph
//!
//! A command-line interface over a FamiLinx SQLite store: inspect persons,
//! enumerate descendants, walk neighborhoods and export them to Graphviz.
//!
//! # Usage
//!
//! ```bash
//! # Create an empty store and local config
//! familinx init
//!
//! # Show one person
//! familinx person 42
//!
//! # Relatives within two steps, female line only
//! familinx walk 42 --radius 2 --gender female
//!
//! # Export the neighborhood to family.dot and render family.pdf
//! familinx export 42 --output family.dot --radius 3
//! ```

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use familinx_config::{ConfigOverrides, LogFormat, LoggingConfig};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod commands;
mod progress;

/// FamiLinx - Lazily populated genealogical graph explorer
#[derive(Parser, Debug)]
#[command(name = "familinx")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Args, Debug, Clone)]
struct GlobalOptions {
    /// Path to the SQLite store
    #[arg(long, global = true, env = "FAMILINX_DB")]
    db: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, short = 'c', global = true, env = "FAMILINX_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    json: bool,
}

impl GlobalOptions {
    /// Convert global options to config overrides
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            store_path: self.db.clone(),
            ..Default::default()
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an empty store and a local configuration file
    Init(commands::init::InitArgs),

    /// Show the fields of one person
    Person(commands::person::PersonArgs),

    /// List every descendant of a person
    Descendants(commands::descendants::DescendantsArgs),

    /// Walk the neighborhood of a person
    Walk(commands::walk::WalkArgs),

    /// Export a neighborhood or descendant set to Graphviz
    Export(commands::export::ExportArgs),

    /// Scan a population range and count founders and leaves
    Scan(commands::scan::ScanArgs),

    /// View and manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let ctx = commands::Context::load(cli.global)?;
    init_logging(&ctx.global, &ctx.config.logging)?;

    match cli.command {
        Commands::Init(args) => commands::init::execute(args, &ctx),
        Commands::Person(args) => commands::person::execute(args, &ctx),
        Commands::Descendants(args) => commands::descendants::execute(args, &ctx),
        Commands::Walk(args) => commands::walk::execute(args, &ctx),
        Commands::Export(args) => commands::export::execute(args, &ctx),
        Commands::Scan(args) => commands::scan::execute(args, &ctx),
        Commands::Config(cmd) => commands::config::execute(cmd, &ctx),
    }
}

/// Install the stderr subscriber, flags taking precedence over `[logging]`
fn init_logging(global: &GlobalOptions, logging: &LoggingConfig) -> Result<()> {
    let level = if global.quiet {
        "error".to_string()
    } else if global.verbose {
        "debug".to_string()
    } else {
        logging.level.to_lowercase()
    };

    let filter = EnvFilter::try_new(&level)
        .with_context(|| format!("Invalid log level '{}'", level))?;
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Text => {
            tracing::subscriber::set_global_default(builder.with_ansi(true).finish())?
        }
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }

    Ok(())
}
