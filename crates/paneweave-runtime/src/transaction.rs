//! Transactions and undo-stack entries.
//!
//! A committed outermost transaction becomes one [`HistoryEntry`], so a
//! single undo takes back every command in it.

use paneweave_layout::{DiffResult, PaneTree};

use crate::command::Command;
use crate::error::CommandError;

/// One undo-stack unit.
#[derive(Debug, Clone)]
pub enum HistoryEntry {
    Single(Command),
    Transaction { label: String, commands: Vec<Command> },
}

impl HistoryEntry {
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Single(command) => command.description(),
            Self::Transaction { label, .. } => label.clone(),
        }
    }

    /// Number of commands in the entry.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Transaction { commands, .. } => commands.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn undo(&mut self, tree: &mut PaneTree) -> Result<(), CommandError> {
        match self {
            Self::Single(command) => command.undo(tree),
            Self::Transaction { commands, .. } => undo_all(commands, tree),
        }
    }

    pub(crate) fn redo(&mut self, tree: &mut PaneTree) -> Result<(), CommandError> {
        match self {
            Self::Single(command) => command.execute(tree),
            Self::Transaction { commands, .. } => {
                for index in 0..commands.len() {
                    if let Err(err) = commands[index].execute(tree) {
                        unwind(&mut commands[..index], tree);
                        return Err(err);
                    }
                }
                Ok(())
            }
        }
    }
}

/// Put the tree back the way a failed partial redo found it.
///
/// Keeps going past a failed undo; the original redo error is what the
/// caller reports.
fn unwind(done: &mut [Command], tree: &mut PaneTree) {
    for command in done.iter_mut().rev() {
        if let Err(err) = command.undo(tree) {
            tracing::error!(
                target: "paneweave.history",
                command = %command.description(),
                error = %err,
                "undo failed while unwinding a partial redo"
            );
        }
    }
}

/// Undo executed commands newest first.
pub(crate) fn undo_all(commands: &mut [Command], tree: &mut PaneTree) -> Result<(), CommandError> {
    for command in commands.iter_mut().rev() {
        if command.is_executed() {
            command.undo(tree)?;
        }
    }
    Ok(())
}

/// An open transaction.
#[derive(Debug)]
pub(crate) struct TransactionFrame {
    pub(crate) label: String,
    pub(crate) commands: Vec<Command>,
    pub(crate) rollback_requested: bool,
    /// Tree as it was when the frame opened, for the closing diff.
    pub(crate) before: PaneTree,
}

impl TransactionFrame {
    pub(crate) fn new(label: String, before: PaneTree) -> Self {
        Self {
            label,
            commands: Vec::new(),
            rollback_requested: false,
            before,
        }
    }
}

/// How a transaction ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// Changes were kept. For a nested transaction they now belong to the
    /// enclosing one.
    Committed {
        label: String,
        commands: usize,
        diff: DiffResult,
    },
    /// Every command in the transaction was undone.
    RolledBack {
        label: String,
        commands: usize,
        diff: DiffResult,
    },
    /// A nested transaction asked its enclosing transaction to roll back.
    /// Nothing is undone until the enclosing transaction closes.
    RollbackRequested { label: String },
}

impl TransactionOutcome {
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}
