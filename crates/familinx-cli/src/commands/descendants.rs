//! Descendants command - List every descendant of a person

use anyhow::{Context as _, Result};
use clap::Args;
use familinx_core::PersonId;

use super::{print_info, print_people, start_person, Context, PersonEntry};

/// Arguments for the descendants command
#[derive(Args, Debug)]
pub struct DescendantsArgs {
    /// Person id to start from
    id: PersonId,

    /// Stop after this many descendants
    #[arg(long, short = 'n')]
    limit: Option<usize>,
}

/// Execute the descendants command
pub fn execute(args: DescendantsArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.open_registry()?;
    let start = start_person(&registry, args.id)?;

    let limit = args.limit.unwrap_or(usize::MAX);
    let mut entries = Vec::new();
    for person in start.descendants().take(limit) {
        let person = person.with_context(|| format!("Failed to traverse from {}", args.id))?;
        entries.push(PersonEntry {
            id: person.id(),
            distance: None,
        });
    }

    print_people(&entries, &ctx.global)?;
    print_info(
        &format!("{} descendants of {}", entries.len(), args.id),
        ctx.global.quiet || ctx.global.json,
    );
    Ok(())
}
