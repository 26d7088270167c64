//! Export command - Write a neighborhood or descendant set as Graphviz

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;
use familinx_core::{
    render, write_graph_file, ExportError, NodeStyles, Person, PersonId, RenderOptions,
};
use serde::Serialize;

use super::{print_info, start_person, Context};
use crate::progress;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Person id to start from (highlighted in the output)
    id: PersonId,

    /// DOT file to write
    #[arg(long, short = 'o')]
    output: PathBuf,

    /// Maximum number of edges from the start
    #[arg(long, short = 'r', conflicts_with = "descendants")]
    radius: Option<u32>,

    /// Export the start and all its descendants instead of a neighborhood
    #[arg(long)]
    descendants: bool,

    /// Rendered output format (overrides `[export] format`)
    #[arg(long, short = 'f')]
    format: Option<String>,

    /// Only write the DOT file
    #[arg(long)]
    no_render: bool,
}

#[derive(Debug, Serialize)]
struct ExportReport {
    dot: PathBuf,
    rendered: Option<PathBuf>,
    people: usize,
}

/// Execute the export command
pub fn execute(args: ExportArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.open_registry()?;
    let start = start_person(&registry, args.id)?;

    let people = collect_people(&start, &args)
        .with_context(|| format!("Failed to traverse from {}", args.id))?;

    write_graph_file(&args.output, &people, &highlight(args.id))
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    print_info(
        &format!("Wrote {} persons to {}", people.len(), args.output.display()),
        ctx.global.quiet || ctx.global.json,
    );

    let rendered = if ctx.config.export.render && !args.no_render {
        let options = RenderOptions {
            command: ctx.config.export.command.clone(),
            format: args
                .format
                .clone()
                .unwrap_or_else(|| ctx.config.export.format.clone()),
        };
        Some(render_with_progress(&args, &options, ctx)?)
    } else {
        None
    };

    if ctx.global.json {
        let report = ExportReport {
            dot: args.output,
            rendered,
            people: people.len(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

fn collect_people(
    start: &Arc<Person>,
    args: &ExportArgs,
) -> familinx_core::Result<Vec<Arc<Person>>> {
    if args.descendants {
        let mut people = vec![Arc::clone(start)];
        for person in start.descendants() {
            people.push(person?);
        }
        return Ok(people);
    }

    let mut walk = start.walk();
    if let Some(radius) = args.radius {
        walk = walk.radius(radius);
    }
    walk.collect()
}

/// Node style marking the start person
fn highlight(id: PersonId) -> NodeStyles {
    let attrs = BTreeMap::from([
        ("style".to_string(), "filled".to_string()),
        ("fillcolor".to_string(), "gold".to_string()),
    ]);
    NodeStyles::from([(id, attrs)])
}

fn render_with_progress(
    args: &ExportArgs,
    options: &RenderOptions,
    ctx: &Context,
) -> Result<PathBuf> {
    let quiet = ctx.global.quiet || ctx.global.json;
    let pb = progress::spinner(&format!("Rendering with {}...", options.command), quiet);

    match render(&args.output, options) {
        Ok(path) => {
            progress::finish_spinner(pb, &format!("Rendered {}", path.display()));
            Ok(path)
        }
        Err(e) => {
            progress::fail_spinner(pb);
            let hint = match &e {
                ExportError::RendererNotFound { .. } => " (install Graphviz or pass --no-render)",
                _ => "",
            };
            let message = format!("Failed to render {}{}", args.output.display(), hint);
            Err(anyhow::Error::new(e).context(message))
        }
    }
}
