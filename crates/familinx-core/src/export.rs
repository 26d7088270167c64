//! Graphviz export
//!
//! Writes a set of persons as a DOT digraph: optional per-node attribute
//! lines followed by one `parent -> child` edge for every pair with both ends
//! in the set. [`render`] hands the file to an external Graphviz binary.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::error::GraphError;
use crate::person::Person;
use crate::types::PersonId;

/// DOT attributes per person id, e.g. `{3: {"color": "red"}}`
pub type NodeStyles = BTreeMap<PersonId, BTreeMap<String, String>>;

/// Errors that can occur while exporting a graph
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to read graph: {0}")]
    Graph(#[from] GraphError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("renderer '{command}' not found")]
    RendererNotFound { command: String },

    #[error("renderer '{command}' failed ({status}): {stderr}")]
    RenderFailed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// External renderer invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Graphviz layout binary
    pub command: String,
    /// Output format passed as `-T<format>`, also used as the file extension
    pub format: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            command: "dot".to_string(),
            format: "pdf".to_string(),
        }
    }
}

/// Build the DOT document for `people`, one statement per line.
///
/// Resolves the child ids of every person in the set.
pub fn graph_lines(people: &[Arc<Person>], styles: &NodeStyles) -> Result<Vec<String>, GraphError> {
    let ids: HashSet<PersonId> = people.iter().map(|p| p.id()).collect();
    let mut lines = vec!["digraph graphname {".to_string()];

    for (id, attrs) in styles {
        let text = attrs
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(format!("{} [{}];", id, text));
    }

    for person in people {
        for child in person.child_ids()? {
            if ids.contains(&child) {
                lines.push(format!("{} -> {};", person.id(), child));
            }
        }
    }

    lines.push("}".to_string());
    Ok(lines)
}

/// Write the DOT document to any writer
pub fn write_graph<W: Write>(
    writer: &mut W,
    people: &[Arc<Person>],
    styles: &NodeStyles,
) -> Result<(), ExportError> {
    for line in graph_lines(people, styles)? {
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

/// Write the DOT document to a file, creating parent directories
pub fn write_graph_file(
    path: &Path,
    people: &[Arc<Person>],
    styles: &NodeStyles,
) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    write_graph(&mut writer, people, styles)?;
    writer.flush()?;

    debug!(path = %path.display(), people = people.len(), "wrote graph");
    Ok(())
}

/// Render a DOT file next to itself as `<stem>.<format>`.
///
/// Returns the path of the rendered file.
pub fn render(path: &Path, options: &RenderOptions) -> Result<PathBuf, ExportError> {
    let output = path.with_extension(&options.format);

    let result = Command::new(&options.command)
        .arg("-o")
        .arg(&output)
        .arg(format!("-T{}", options.format))
        .arg(path)
        .output();

    let result = match result {
        Ok(result) => result,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ExportError::RendererNotFound {
                command: options.command.clone(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    if !result.status.success() {
        return Err(ExportError::RenderFailed {
            command: options.command.clone(),
            status: result.status.to_string(),
            stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
        });
    }

    info!(output = %output.display(), "rendered graph");
    Ok(output)
}
