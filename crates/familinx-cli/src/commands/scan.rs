//! Scan command - Iterate a population range and count founders and leaves

use anyhow::{Context as _, Result};
use clap::Args;
use familinx_core::PersonId;
use serde::Serialize;
use tracing::debug;

use super::Context;
use crate::progress;

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// First id to scan (default: population minimum)
    #[arg(long)]
    start: Option<PersonId>,

    /// Id to stop before (default: one past the population maximum)
    #[arg(long)]
    end: Option<PersonId>,
}

/// Counts collected over a scanned range
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct ScanSummary {
    pub scanned: u64,
    /// Persons with no recorded parents
    pub founders: u64,
    /// Persons with no recorded children
    pub leaves: u64,
    /// Persons with neither parents nor children
    pub isolated: u64,
}

/// Execute the scan command
pub fn execute(args: ScanArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.open_registry()?;
    let bounds = registry.bounds();

    let people = match (args.start, args.end) {
        (None, None) => registry.iter_people(),
        (start, end) => registry.iter_range(
            start.unwrap_or(bounds.min()),
            end.unwrap_or(bounds.max().saturating_add(1)),
        )?,
    };

    let quiet = ctx.global.quiet || ctx.global.json;
    let pb = progress::progress_bar(people.len() as u64, "Scanning", quiet);

    let mut summary = ScanSummary::default();
    for person in people {
        let id = person.id();
        let is_founder = person
            .is_founder()
            .with_context(|| format!("Failed to read parents of {}", id))?;
        let is_leaf = person
            .is_leaf()
            .with_context(|| format!("Failed to read children of {}", id))?;

        summary.scanned += 1;
        summary.founders += u64::from(is_founder);
        summary.leaves += u64::from(is_leaf);
        summary.isolated += u64::from(is_founder && is_leaf);

        // Each person is read once; keep the identity map from growing
        registry.evict(id);
        if let Some(ref pb) = pb {
            pb.inc(1);
        }
    }
    progress::finish_progress(pb);
    debug!(?summary, metrics = ?registry.metrics(), "scan complete");

    if ctx.global.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if !ctx.global.quiet {
        println!("Scanned:  {}", summary.scanned);
        println!("Founders: {}", summary.founders);
        println!("Leaves:   {}", summary.leaves);
        println!("Isolated: {}", summary.isolated);
    }

    Ok(())
}
