//! Walk command - Neighborhood of a person over parent and child edges

use anyhow::{Context as _, Result};
use clap::Args;
use familinx_core::{Gender, PersonId, Walk};

use super::{print_info, print_people, start_person, Context, PersonEntry};

/// Arguments for the walk command
#[derive(Args, Debug)]
pub struct WalkArgs {
    /// Person id to start from
    id: PersonId,

    /// Maximum number of edges from the start
    #[arg(long, short = 'r')]
    radius: Option<u32>,

    /// Only walk through persons of this gender (male, female)
    #[arg(long, short = 'g')]
    gender: Option<Gender>,
}

/// Execute the walk command
pub fn execute(args: WalkArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.open_registry()?;
    let start = start_person(&registry, args.id)?;

    let mut walk = Walk::new(start);
    if let Some(radius) = args.radius {
        walk = walk.radius(radius);
    }
    if let Some(gender) = args.gender {
        // A person whose gender cannot be read is not walked through
        walk = walk.visitable(move |p| matches!(p.gender(), Ok(Some(g)) if g == gender));
    }

    let mut entries = Vec::new();
    while let Some(person) = walk.next() {
        let person = person.with_context(|| format!("Failed to walk from {}", args.id))?;
        entries.push(PersonEntry {
            id: person.id(),
            distance: walk.distance(person.id()),
        });
    }

    print_people(&entries, &ctx.global)?;
    print_info(
        &format!("{} persons reached from {}", entries.len(), args.id),
        ctx.global.quiet || ctx.global.json,
    );
    Ok(())
}
