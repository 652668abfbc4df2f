//! The `validate`, `layout`, `diff`, and `replay` subcommands.
//!
//! Every runner writes its report to the supplied writer so the CLI can pass
//! stdout and tests can pass a buffer.

use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use paneweave_core::{Bounds, PaneId};
use paneweave_layout::{DiffResult, LayoutDocument, ModelError, PaneTree, SolvedLayout, diff_trees};
use paneweave_runtime::{EngineConfig, LayoutCommand, LayoutController};

use crate::error::{DoctorError, Result};

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Layout document (JSON).
    pub file: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct LayoutArgs {
    /// Layout document (JSON).
    pub file: PathBuf,

    #[arg(long, default_value_t = 800)]
    pub width: i32,

    #[arg(long, default_value_t = 600)]
    pub height: i32,

    /// Divider thickness in pixels. Defaults to the engine config value.
    #[arg(long)]
    pub divider: Option<i32>,

    /// Print the solved layout as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct DiffArgs {
    pub old: PathBuf,
    pub new: PathBuf,

    /// Print the four pane sets as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// Starting layout document (JSON).
    pub file: PathBuf,

    /// JSON array of layout commands to apply in order.
    pub commands: PathBuf,

    /// Apply every command inside one transaction with this label, so a
    /// failure leaves the layout untouched.
    #[arg(long)]
    pub transaction: Option<String>,

    /// Write the resulting document here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| DoctorError::io(path, source))
}

fn read_document(path: &Path) -> Result<LayoutDocument> {
    LayoutDocument::from_json(&read_to_string(path)?).map_err(|source| DoctorError::Model {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a document into a tree, surfacing structural violations as
/// [`DoctorError::Invalid`].
pub fn load_tree(path: &Path) -> Result<PaneTree> {
    match PaneTree::from_document(read_document(path)?) {
        Ok(tree) => Ok(tree),
        Err(ModelError::InvalidStructure { violations }) => Err(DoctorError::Invalid {
            path: path.to_path_buf(),
            violations,
        }),
        Err(source) => Err(DoctorError::Model {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub fn run_validate(args: &ValidateArgs, out: &mut dyn Write) -> Result<()> {
    let tree = match load_tree(&args.file) {
        Ok(tree) => tree,
        Err(DoctorError::Invalid { path, violations }) => {
            for violation in &violations {
                writeln!(out, "{}: {violation}", path.display())?;
            }
            return Err(DoctorError::Invalid { path, violations });
        }
        Err(other) => return Err(other),
    };

    writeln!(
        out,
        "{}: ok ({} panes, {} splits, depth {}, state hash {:016x})",
        args.file.display(),
        tree.leaf_count(),
        tree.split_ids().count(),
        tree.depth(),
        tree.state_hash()
    )?;
    Ok(())
}

pub fn run_layout(args: &LayoutArgs, config: &EngineConfig, out: &mut dyn Write) -> Result<()> {
    let outer = Bounds::new(0, 0, args.width, args.height)
        .map_err(|err| DoctorError::invalid(err.to_string()))?;
    let divider = args.divider.unwrap_or(config.divider_thickness);
    if divider < 0 {
        return Err(DoctorError::invalid(format!(
            "divider thickness must be non-negative, got {divider}"
        )));
    }

    let tree = load_tree(&args.file)?;
    let layout = tree.solve(outer, divider);
    tracing::debug!(
        panes = layout.panes.len(),
        dividers = layout.dividers.len(),
        satisfied = layout.constraints.is_satisfied(),
        "layout solved"
    );

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &layout)?;
        writeln!(out)?;
    } else {
        out.write_all(render_layout(&layout).as_bytes())?;
    }
    Ok(())
}

/// Plain-text rendering: one line per pane, divider, and constraint issue.
#[must_use]
pub fn render_layout(layout: &SolvedLayout) -> String {
    let mut text = String::new();
    for (pane_id, bounds) in &layout.panes {
        let _ = writeln!(text, "pane {pane_id} {}", rect(*bounds));
    }
    for divider in &layout.dividers {
        let _ = writeln!(
            text,
            "divider {}[{}] {} {}",
            divider.node_id,
            divider.index,
            divider.orientation.as_str(),
            rect(divider.bounds)
        );
    }
    for violation in &layout.constraints.violations {
        let _ = writeln!(
            text,
            "warning: split {} needs {}px {}, has {}px",
            violation.node_id,
            violation.required,
            violation.orientation.as_str(),
            violation.available
        );
    }
    for clamp in &layout.constraints.clamped {
        let _ = writeln!(
            text,
            "clamped {} {} -> {}",
            clamp.pane_id,
            rect(clamp.proportional),
            rect(clamp.clamped)
        );
    }
    text
}

fn rect(bounds: Bounds) -> String {
    format!(
        "x={} y={} w={} h={}",
        bounds.x(),
        bounds.y(),
        bounds.width(),
        bounds.height()
    )
}

pub fn run_diff(args: &DiffArgs, out: &mut dyn Write) -> Result<()> {
    let old = load_tree(&args.old)?;
    let new = load_tree(&args.new)?;
    let diff = diff_trees(&old, &new);

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &diff)?;
        writeln!(out)?;
    } else {
        out.write_all(render_diff(&diff).as_bytes())?;
    }
    Ok(())
}

#[must_use]
pub fn render_diff(diff: &DiffResult) -> String {
    fn list<'a>(ids: impl Iterator<Item = &'a PaneId>) -> String {
        let joined = ids.map(PaneId::as_str).collect::<Vec<_>>().join(", ");
        if joined.is_empty() { "-".to_owned() } else { joined }
    }

    format!(
        "added: {}\nremoved: {}\nmoved: {}\nmodified: {}\n",
        list(diff.added.iter()),
        list(diff.removed.iter()),
        list(diff.moved.iter()),
        list(diff.modified.iter()),
    )
}

pub fn run_replay(args: &ReplayArgs, config: &EngineConfig, out: &mut dyn Write) -> Result<()> {
    let tree = load_tree(&args.file)?;
    let commands: Vec<LayoutCommand> = serde_json::from_str(&read_to_string(&args.commands)?)?;
    let mut ctl = LayoutController::with_config(tree, config.clone());

    let mut failed_at = None;
    let result = match &args.transaction {
        Some(label) => ctl.transaction(label.as_str(), |ctl| {
            apply_all(ctl, &commands, &mut failed_at)
        }),
        None => apply_all(&mut ctl, &commands, &mut failed_at),
    };
    if let Err(source) = result {
        let (index, description) = failed_at.unwrap_or_else(|| (commands.len(), "commit".to_owned()));
        return Err(DoctorError::Replay {
            index,
            description,
            source,
        });
    }

    tracing::debug!(
        commands = commands.len(),
        panes = ctl.tree().leaf_count(),
        "replay finished"
    );
    let json = ctl.tree().to_json().map_err(|source| DoctorError::Model {
        path: args.file.clone(),
        source,
    })?;
    match &args.output {
        Some(path) => {
            fs::write(path, json).map_err(|source| DoctorError::io(path, source))?;
            writeln!(
                out,
                "applied {} commands; {} panes written to {}",
                commands.len(),
                ctl.tree().leaf_count(),
                path.display()
            )?;
        }
        None => writeln!(out, "{json}")?,
    }
    Ok(())
}

fn apply_all(
    ctl: &mut LayoutController,
    commands: &[LayoutCommand],
    failed_at: &mut Option<(usize, String)>,
) -> std::result::Result<(), paneweave_runtime::ControllerError> {
    for (index, command) in commands.iter().enumerate() {
        if let Err(err) = ctl.execute_command(command.clone()) {
            *failed_at = Some((index, command.description()));
            return Err(err);
        }
    }
    Ok(())
}
