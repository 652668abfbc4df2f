#![forbid(unsafe_code)]

//! Undoable layout commands.
//!
//! A [`LayoutCommand`] names a mutation; a [`Command`] wraps one with the
//! state needed to run it against a [`PaneTree`] and take it back.
//!
//! # Invariants
//!
//! - `execute` followed by `undo` restores the tree to a state equal (by
//!   serialization) to the one before `execute`.
//! - `execute` twice without an `undo` in between fails the second time, and
//!   likewise for `undo`.
//! - A failed `execute` leaves the tree untouched.
//! - Re-executing an undone `Split` recreates the same pane and split ids,
//!   so later commands that name them still apply on redo.
//!
//! Undo is snapshot based: the whole tree is captured as a
//! [`LayoutDocument`] before every mutation and restored on undo.

use std::fmt;

use paneweave_core::{ContentId, NodeId, PaneId};
use paneweave_layout::{
    LayoutDocument, LeafNode, PaneTree, SizeConstraints, SplitPosition,
};
use serde::{Deserialize, Serialize};

use crate::error::CommandError;

/// A tree mutation intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum LayoutCommand {
    /// Add a pane showing `content` next to `target`. The target keeps
    /// `ratio` of its space.
    Split {
        target: PaneId,
        content: ContentId,
        position: SplitPosition,
        ratio: f64,
    },
    Remove {
        pane_id: PaneId,
    },
    SetRatios {
        node_id: NodeId,
        ratios: Vec<f64>,
    },
    SetConstraints {
        pane_id: PaneId,
        constraints: SizeConstraints,
    },
}

/// Discriminant of [`LayoutCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Split,
    Remove,
    SetRatios,
    SetConstraints,
}

impl CommandKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Split => "split",
            Self::Remove => "remove",
            Self::SetRatios => "set_ratios",
            Self::SetConstraints => "set_constraints",
        }
    }
}

impl LayoutCommand {
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::Split { .. } => CommandKind::Split,
            Self::Remove { .. } => CommandKind::Remove,
            Self::SetRatios { .. } => CommandKind::SetRatios,
            Self::SetConstraints { .. } => CommandKind::SetConstraints,
        }
    }

    /// Human-readable description for UI and logs.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Split {
                target, position, ..
            } => format!("Split {target} {}", position.as_str()),
            Self::Remove { pane_id } => format!("Remove {pane_id}"),
            Self::SetRatios { node_id, .. } => format!("Resize {node_id}"),
            Self::SetConstraints { pane_id, .. } => format!("Constrain {pane_id}"),
        }
    }
}

impl fmt::Display for LayoutCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// Identifiers a `Split` mints on first execution and reuses afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIds {
    pub pane_id: PaneId,
    pub node_id: NodeId,
}

/// Lifecycle of a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Pending,
    Executed,
    Undone,
}

/// A [`LayoutCommand`] plus its undo snapshot.
#[derive(Debug, Clone)]
pub struct Command {
    intent: LayoutCommand,
    state: CommandState,
    snapshot: Option<LayoutDocument>,
    split_ids: Option<SplitIds>,
}

impl From<LayoutCommand> for Command {
    fn from(intent: LayoutCommand) -> Self {
        Self::new(intent)
    }
}

impl Command {
    #[must_use]
    pub fn new(intent: LayoutCommand) -> Self {
        Self {
            intent,
            state: CommandState::Pending,
            snapshot: None,
            split_ids: None,
        }
    }

    #[must_use]
    pub fn split(
        target: PaneId,
        content: ContentId,
        position: SplitPosition,
        ratio: f64,
    ) -> Self {
        Self::new(LayoutCommand::Split {
            target,
            content,
            position,
            ratio,
        })
    }

    #[must_use]
    pub fn remove(pane_id: PaneId) -> Self {
        Self::new(LayoutCommand::Remove { pane_id })
    }

    #[must_use]
    pub fn set_ratios(node_id: NodeId, ratios: Vec<f64>) -> Self {
        Self::new(LayoutCommand::SetRatios { node_id, ratios })
    }

    #[must_use]
    pub fn set_constraints(pane_id: PaneId, constraints: SizeConstraints) -> Self {
        Self::new(LayoutCommand::SetConstraints {
            pane_id,
            constraints,
        })
    }

    /// Pin the ids a `Split` will create instead of generating them.
    #[must_use]
    pub fn with_split_ids(mut self, ids: SplitIds) -> Self {
        self.split_ids = Some(ids);
        self
    }

    #[must_use]
    pub fn intent(&self) -> &LayoutCommand {
        &self.intent
    }

    #[must_use]
    pub fn kind(&self) -> CommandKind {
        self.intent.kind()
    }

    #[must_use]
    pub fn description(&self) -> String {
        self.intent.description()
    }

    #[must_use]
    pub fn state(&self) -> CommandState {
        self.state
    }

    #[must_use]
    pub fn is_executed(&self) -> bool {
        self.state == CommandState::Executed
    }

    /// Pane and split ids of a `Split`, once known.
    #[must_use]
    pub fn split_ids(&self) -> Option<&SplitIds> {
        self.split_ids.as_ref()
    }

    /// Apply the command to `tree`.
    pub fn execute(&mut self, tree: &mut PaneTree) -> Result<(), CommandError> {
        if self.state == CommandState::Executed {
            return Err(CommandError::AlreadyExecuted {
                description: self.description(),
            });
        }

        let snapshot = tree.to_document();
        self.apply(tree)?;

        let violations = tree.validate_structure();
        if !violations.is_empty() {
            let description = self.description();
            tracing::error!(
                target: "paneweave.command",
                command = %description,
                violations = violations.len(),
                first = %violations[0],
                "command broke tree structure; restoring previous tree"
            );
            if let Ok(previous) = PaneTree::from_document(snapshot) {
                *tree = previous;
            }
            return Err(CommandError::Structural {
                description,
                violations,
            });
        }

        self.snapshot = Some(snapshot);
        self.state = CommandState::Executed;
        tracing::debug!(
            target: "paneweave.command",
            command = %self.intent,
            kind = self.kind().as_str(),
            state_hash = tree.state_hash(),
            "command executed"
        );
        Ok(())
    }

    /// Restore the tree captured before the last `execute`.
    pub fn undo(&mut self, tree: &mut PaneTree) -> Result<(), CommandError> {
        if self.state != CommandState::Executed {
            return Err(CommandError::NotExecuted {
                description: self.description(),
            });
        }
        let Some(snapshot) = self.snapshot.take() else {
            return Err(CommandError::NotExecuted {
                description: self.description(),
            });
        };

        match PaneTree::from_document(snapshot) {
            Ok(previous) => *tree = previous,
            Err(err) => {
                let description = self.description();
                tracing::error!(
                    target: "paneweave.command",
                    command = %description,
                    error = %err,
                    "undo snapshot failed to load"
                );
                return Err(CommandError::Structural {
                    description,
                    violations: match err {
                        paneweave_layout::ModelError::InvalidStructure { violations } => {
                            violations
                        }
                        _ => Vec::new(),
                    },
                });
            }
        }

        self.state = CommandState::Undone;
        tracing::debug!(
            target: "paneweave.command",
            command = %self.intent,
            "command undone"
        );
        Ok(())
    }

    fn apply(&mut self, tree: &mut PaneTree) -> Result<(), CommandError> {
        match &self.intent {
            LayoutCommand::Split {
                target,
                content,
                position,
                ratio,
            } => {
                let ids = self.split_ids.get_or_insert_with(|| SplitIds {
                    pane_id: PaneId::generate(),
                    node_id: NodeId::generate(),
                });
                tree.split_pane(
                    target,
                    LeafNode::new(ids.pane_id.clone(), content.clone()),
                    *position,
                    *ratio,
                    ids.node_id.clone(),
                )?;
            }
            LayoutCommand::Remove { pane_id } => {
                let _ = tree.remove_pane(pane_id)?;
            }
            LayoutCommand::SetRatios { node_id, ratios } => {
                let _ = tree.set_ratios(node_id, ratios.clone())?;
            }
            LayoutCommand::SetConstraints {
                pane_id,
                constraints,
            } => {
                let _ = tree.set_constraints(pane_id, *constraints)?;
            }
        }
        Ok(())
    }
}
