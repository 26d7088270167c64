//! Person command - Show the fields of one person

use anyhow::{Context as _, Result};
use clap::Args;
use familinx_core::{PersonId, PersonStats};
use serde::Serialize;

use super::{start_person, Context};

/// Arguments for the person command
#[derive(Args, Debug)]
pub struct PersonArgs {
    /// Person id
    id: PersonId,
}

/// Stats snapshot plus the derived relations
#[derive(Debug, Serialize)]
struct PersonReport {
    #[serde(flatten)]
    stats: PersonStats,
    mother: Option<PersonId>,
    father: Option<PersonId>,
    partners: Vec<PersonId>,
}

/// Execute the person command
pub fn execute(args: PersonArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.open_registry()?;
    let person = start_person(&registry, args.id)?;

    let context = || format!("Failed to read person {}", args.id);
    let report = PersonReport {
        stats: person.stats().with_context(context)?,
        mother: person.mother().with_context(context)?.map(|p| p.id()),
        father: person.father().with_context(context)?.map(|p| p.id()),
        partners: person
            .partners()
            .with_context(context)?
            .iter()
            .map(|p| p.id())
            .collect(),
    };

    if ctx.global.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let stats = &report.stats;
    println!("Person: {}", stats.id);
    println!("  Gender: {}", display(stats.gender));
    println!("  Age: {}", display(stats.age));
    println!("  Born: {}", display(stats.birth));
    println!("  Died: {}", display(stats.death));
    if let (Some(lon), Some(lat)) = (stats.lon, stats.lat) {
        println!("  Location: {:.4}, {:.4}", lat, lon);
        if let Some(ref country) = stats.country {
            println!("  Country: {}", country);
        }
        if let Some(continent) = stats.continent {
            println!("  Continent: {}", continent.name());
        }
    }
    println!("  Parents: {}", join_ids(&stats.parents));
    println!("  Children: {}", join_ids(&stats.children));
    println!("  Mother: {}", display(report.mother));
    println!("  Father: {}", display(report.father));
    println!("  Partners: {}", join_ids(&report.partners));

    if let Some(founder) = person.founder_stats().with_context(context)? {
        println!("  Founder of {} leaves", founder.leaf_count);
        println!(
            "    Depth: min {}, max {}, median {:.1}",
            founder.min_depth, founder.max_depth, founder.median_depth
        );
    }

    Ok(())
}

fn display<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}

fn join_ids(ids: &[PersonId]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
