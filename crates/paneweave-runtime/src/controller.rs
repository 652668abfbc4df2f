//! The layout controller: owns the tree, runs commands, keeps history, and
//! enforces transaction nesting.
//!
//! # Transactions
//!
//! - While any transaction is open, executed commands collect in the
//!   innermost frame instead of the undo stack, and `undo`/`redo`/loading
//!   are refused.
//! - A command that fails inside a transaction marks the innermost frame for
//!   rollback. Further commands are refused with
//!   [`ControllerError::RollbackPending`] until that frame is closed, and
//!   committing it rolls it back instead.
//! - Rolling back the outermost frame undoes its commands newest first.
//!   Rolling back a nested frame hands its commands to the enclosing frame
//!   and marks that frame for rollback; nothing is undone until the
//!   outermost rollback.
//! - Committing a nested frame hands its commands to the enclosing frame.
//!   Committing the outermost frame pushes all of them as one undo entry.

use paneweave_core::{Bounds, ContentId, PaneId};
use paneweave_layout::{
    DiffResult, LayoutDocument, PaneTree, SolvedLayout, SplitPosition, diff, diff_trees,
};

use crate::command::Command;
use crate::config::EngineConfig;
use crate::error::{CommandError, ControllerError};
use crate::history::History;
use crate::transaction::{HistoryEntry, TransactionFrame, TransactionOutcome, undo_all};

/// What an execute, undo, or redo changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub description: String,
    /// Panes the presentation layer has to add, drop, move, or refresh.
    pub diff: DiffResult,
}

/// Runs commands against one [`PaneTree`].
#[derive(Debug)]
pub struct LayoutController {
    tree: PaneTree,
    history: History,
    transactions: Vec<TransactionFrame>,
    config: EngineConfig,
}

impl Default for LayoutController {
    fn default() -> Self {
        Self::new(PaneTree::empty())
    }
}

impl LayoutController {
    #[must_use]
    pub fn new(tree: PaneTree) -> Self {
        Self::with_config(tree, EngineConfig::default())
    }

    #[must_use]
    pub fn with_config(tree: PaneTree, config: EngineConfig) -> Self {
        Self {
            tree,
            history: History::new(config.max_history),
            transactions: Vec::new(),
            config,
        }
    }

    #[must_use]
    pub fn tree(&self) -> &PaneTree {
        &self.tree
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn document(&self) -> LayoutDocument {
        self.tree.to_document()
    }

    /// Solve the current tree with the configured divider thickness.
    #[must_use]
    pub fn solve(&self, outer: Bounds) -> SolvedLayout {
        self.tree.solve(outer, self.config.divider_thickness)
    }

    /// Run a command. On success it lands on the undo stack (or in the open
    /// transaction) and the redo stack is cleared.
    pub fn execute_command(
        &mut self,
        command: impl Into<Command>,
    ) -> Result<ExecutionReport, ControllerError> {
        if self.transactions.iter().any(|frame| frame.rollback_requested) {
            return Err(ControllerError::RollbackPending);
        }

        let mut command = command.into();
        let before = self.tree.root().cloned();
        if let Err(err) = command.execute(&mut self.tree) {
            tracing::debug!(
                target: "paneweave.command",
                command = %command.intent(),
                error = %err,
                "command rejected"
            );
            if let Some(frame) = self.transactions.last_mut() {
                frame.rollback_requested = true;
                tracing::debug!(
                    target: "paneweave.transaction",
                    label = %frame.label,
                    "command failed inside transaction; rollback requested"
                );
            }
            return Err(err.into());
        }

        let report = ExecutionReport {
            description: command.description(),
            diff: diff(before.as_ref(), self.tree.root()),
        };
        match self.transactions.last_mut() {
            Some(frame) => frame.commands.push(command),
            None => self.history.push(HistoryEntry::Single(command)),
        }
        Ok(report)
    }

    /// Split `target` using the configured default ratio.
    pub fn split_pane(
        &mut self,
        target: PaneId,
        content: ContentId,
        position: SplitPosition,
    ) -> Result<ExecutionReport, ControllerError> {
        let ratio = self.config.default_split_ratio;
        self.execute_command(Command::split(target, content, position, ratio))
    }

    /// Focus a pane. Focus changes are not recorded in history.
    pub fn set_focus(&mut self, pane_id: &PaneId) -> Result<(), ControllerError> {
        self.tree
            .set_focus(pane_id)
            .map_err(|err| ControllerError::Command(CommandError::from(err)))
    }

    /// Undo the newest entry. `Ok(None)` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<Option<ExecutionReport>, ControllerError> {
        self.ensure_no_transaction()?;
        let Some(mut entry) = self.history.pop_undo() else {
            return Ok(None);
        };

        let before = self.tree.root().cloned();
        if let Err(err) = entry.undo(&mut self.tree) {
            self.history.push_undo_keep_redo(entry);
            return Err(err.into());
        }

        let report = ExecutionReport {
            description: entry.description(),
            diff: diff(before.as_ref(), self.tree.root()),
        };
        tracing::debug!(
            target: "paneweave.history",
            entry = %report.description,
            commands = entry.len(),
            "undo"
        );
        self.history.push_redo(entry);
        Ok(Some(report))
    }

    /// Re-apply the newest undone entry. `Ok(None)` when there is nothing to
    /// redo.
    pub fn redo(&mut self) -> Result<Option<ExecutionReport>, ControllerError> {
        self.ensure_no_transaction()?;
        let Some(mut entry) = self.history.pop_redo() else {
            return Ok(None);
        };

        let before = self.tree.root().cloned();
        if let Err(err) = entry.redo(&mut self.tree) {
            self.history.push_redo(entry);
            return Err(err.into());
        }

        let report = ExecutionReport {
            description: entry.description(),
            diff: diff(before.as_ref(), self.tree.root()),
        };
        tracing::debug!(
            target: "paneweave.history",
            entry = %report.description,
            commands = entry.len(),
            "redo"
        );
        self.history.push_undo_keep_redo(entry);
        Ok(Some(report))
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.transactions.is_empty() && self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.transactions.is_empty() && self.history.can_redo()
    }

    pub fn undo_descriptions(&self, limit: usize) -> Vec<String> {
        self.history.undo_descriptions(limit)
    }

    pub fn redo_descriptions(&self, limit: usize) -> Vec<String> {
        self.history.redo_descriptions(limit)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Replace the tree wholesale and forget history.
    pub fn load_document(
        &mut self,
        document: LayoutDocument,
    ) -> Result<ExecutionReport, ControllerError> {
        self.ensure_no_transaction()?;
        let tree = PaneTree::from_document(document)?;
        let report = ExecutionReport {
            description: "Load layout".to_owned(),
            diff: diff_trees(&self.tree, &tree),
        };
        self.tree = tree;
        self.history.clear();
        tracing::debug!(
            target: "paneweave.history",
            panes = self.tree.leaf_count(),
            "layout loaded; history cleared"
        );
        Ok(report)
    }

    pub fn load_json(&mut self, json: &str) -> Result<ExecutionReport, ControllerError> {
        self.load_document(LayoutDocument::from_json(json)?)
    }

    fn ensure_no_transaction(&self) -> Result<(), ControllerError> {
        if self.transactions.is_empty() {
            Ok(())
        } else {
            Err(ControllerError::TransactionOpen {
                depth: self.transactions.len(),
            })
        }
    }
}

// Transactions.
impl LayoutController {
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        !self.transactions.is_empty()
    }

    #[must_use]
    pub fn transaction_depth(&self) -> usize {
        self.transactions.len()
    }

    /// Open a (possibly nested) transaction; returns the new depth.
    pub fn begin_transaction(&mut self, label: impl Into<String>) -> usize {
        let label = label.into();
        tracing::debug!(
            target: "paneweave.transaction",
            label = %label,
            depth = self.transactions.len() + 1,
            "transaction begun"
        );
        self.transactions
            .push(TransactionFrame::new(label, self.tree.clone()));
        self.transactions.len()
    }

    /// Close the innermost transaction, keeping its changes unless a
    /// rollback was requested for it.
    pub fn commit_transaction(&mut self) -> Result<TransactionOutcome, ControllerError> {
        let Some(frame) = self.transactions.pop() else {
            return Err(ControllerError::NoTransaction);
        };
        if frame.rollback_requested {
            return self.finish_rollback(frame);
        }

        let label = frame.label;
        let commands = frame.commands.len();
        let diff = diff_trees(&frame.before, &self.tree);
        match self.transactions.last_mut() {
            Some(parent) => parent.commands.extend(frame.commands),
            None if commands > 0 => self.history.push(HistoryEntry::Transaction {
                label: label.clone(),
                commands: frame.commands,
            }),
            None => {}
        }

        tracing::debug!(
            target: "paneweave.transaction",
            label = %label,
            commands,
            depth = self.transactions.len() + 1,
            "transaction committed"
        );
        Ok(TransactionOutcome::Committed {
            label,
            commands,
            diff,
        })
    }

    /// Close the innermost transaction and take its changes back.
    pub fn rollback_transaction(&mut self) -> Result<TransactionOutcome, ControllerError> {
        let Some(frame) = self.transactions.pop() else {
            return Err(ControllerError::NoTransaction);
        };
        self.finish_rollback(frame)
    }

    fn finish_rollback(
        &mut self,
        mut frame: TransactionFrame,
    ) -> Result<TransactionOutcome, ControllerError> {
        if let Some(parent) = self.transactions.last_mut() {
            parent.commands.append(&mut frame.commands);
            parent.rollback_requested = true;
            tracing::debug!(
                target: "paneweave.transaction",
                label = %frame.label,
                enclosing = %parent.label,
                "nested rollback handed to enclosing transaction"
            );
            return Ok(TransactionOutcome::RollbackRequested { label: frame.label });
        }

        let commands = frame.commands.len();
        let before = self.tree.root().cloned();
        undo_all(&mut frame.commands, &mut self.tree)?;
        let diff = diff(before.as_ref(), self.tree.root());
        tracing::debug!(
            target: "paneweave.transaction",
            label = %frame.label,
            commands,
            "transaction rolled back"
        );
        Ok(TransactionOutcome::RolledBack {
            label: frame.label,
            commands,
            diff,
        })
    }

    /// Run `body` inside a transaction.
    ///
    /// Commits when `body` returns `Ok`, rolls back when it returns `Err`.
    /// Inner transactions `body` leaves open are rolled back first. If the
    /// commit turns into a rollback the result is
    /// [`ControllerError::RolledBack`].
    pub fn transaction<T>(
        &mut self,
        label: impl Into<String>,
        body: impl FnOnce(&mut Self) -> Result<T, ControllerError>,
    ) -> Result<T, ControllerError> {
        let label = label.into();
        let depth = self.begin_transaction(label.clone());
        let result = body(self);

        if self.transactions.len() < depth {
            // `body` closed our frame itself.
            return result;
        }
        while self.transactions.len() > depth {
            let _ = self.rollback_transaction()?;
        }

        match result {
            Ok(value) => match self.commit_transaction()? {
                TransactionOutcome::Committed { .. } => Ok(value),
                TransactionOutcome::RolledBack { .. }
                | TransactionOutcome::RollbackRequested { .. } => {
                    Err(ControllerError::RolledBack { label })
                }
            },
            Err(err) => {
                let _ = self.rollback_transaction()?;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paneweave_core::NodeId;

    fn pane(raw: &str) -> PaneId {
        PaneId::new(raw).expect("pane")
    }

    fn content(raw: &str) -> ContentId {
        ContentId::new(raw).expect("content")
    }

    fn controller() -> LayoutController {
        LayoutController::new(PaneTree::singleton(pane("p1"), content("c1")))
    }

    #[test]
    fn execute_pushes_and_reports_diff() {
        let mut ctl = controller();
        let report = ctl
            .split_pane(pane("p1"), content("c2"), SplitPosition::Right)
            .expect("split");
        assert_eq!(report.description, "Split p1 right");
        assert_eq!(report.diff.added.len(), 1);
        assert!(report.diff.moved.contains(&pane("p1")));
        assert!(ctl.can_undo());
        assert!(!ctl.can_redo());
    }

    #[test]
    fn undo_redo_move_between_stacks() {
        let mut ctl = controller();
        let original = ctl.tree().clone();
        let _ = ctl
            .split_pane(pane("p1"), content("c2"), SplitPosition::Right)
            .expect("split");
        let split = ctl.tree().clone();

        let undone = ctl.undo().expect("undo ok").expect("entry");
        assert_eq!(undone.diff.removed.len(), 1);
        assert_eq!(ctl.tree(), &original);
        assert!(ctl.can_redo());

        let redone = ctl.redo().expect("redo ok").expect("entry");
        assert_eq!(redone.diff.added, undone.diff.removed);
        assert_eq!(ctl.tree(), &split);
        assert_eq!(ctl.redo().expect("redo ok"), None);
    }

    #[test]
    fn new_command_clears_redo() {
        let mut ctl = controller();
        let _ = ctl
            .split_pane(pane("p1"), content("c2"), SplitPosition::Right)
            .expect("split");
        let _ = ctl.undo().expect("undo");
        let _ = ctl
            .split_pane(pane("p1"), content("c3"), SplitPosition::Bottom)
            .expect("split");
        assert!(!ctl.can_redo());
    }

    #[test]
    fn failed_command_is_not_recorded() {
        let mut ctl = controller();
        let err = ctl
            .execute_command(Command::remove(pane("ghost")))
            .expect_err("missing pane");
        assert!(matches!(
            err,
            ControllerError::Command(CommandError::NotFound { .. })
        ));
        assert!(!ctl.can_undo());
    }

    #[test]
    fn history_is_bounded_by_config() {
        let config = EngineConfig {
            max_history: 2,
            ..EngineConfig::default()
        };
        let mut ctl =
            LayoutController::with_config(PaneTree::singleton(pane("p1"), content("c1")), config);
        for i in 0..4 {
            let _ = ctl
                .split_pane(pane("p1"), content(&format!("c{i}")), SplitPosition::Right)
                .expect("split");
        }
        assert_eq!(ctl.history().undo_depth(), 2);
    }

    #[test]
    fn committed_transaction_is_one_undo_unit() {
        let mut ctl = controller();
        let original = ctl.tree().clone();
        let depth = ctl.begin_transaction("Three-way");
        assert_eq!(depth, 1);
        let _ = ctl
            .split_pane(pane("p1"), content("c2"), SplitPosition::Right)
            .expect("split");
        let _ = ctl
            .split_pane(pane("p1"), content("c3"), SplitPosition::Bottom)
            .expect("split");
        assert!(matches!(ctl.undo(), Err(ControllerError::TransactionOpen { depth: 1 })));

        let outcome = ctl.commit_transaction().expect("commit");
        let TransactionOutcome::Committed { commands, diff, .. } = outcome else {
            panic!("expected commit, got {outcome:?}");
        };
        assert_eq!(commands, 2);
        assert_eq!(diff.added.len(), 2);
        assert_eq!(ctl.undo_descriptions(5), ["Three-way"]);

        let _ = ctl.undo().expect("undo").expect("entry");
        assert_eq!(ctl.tree(), &original);
    }

    #[test]
    fn explicit_rollback_restores_tree() {
        let mut ctl = controller();
        let original = ctl.tree().clone();
        let _ = ctl.begin_transaction("Scratch");
        let _ = ctl
            .split_pane(pane("p1"), content("c2"), SplitPosition::Left)
            .expect("split");
        let outcome = ctl.rollback_transaction().expect("rollback");
        assert!(matches!(outcome, TransactionOutcome::RolledBack { commands: 1, .. }));
        assert_eq!(ctl.tree(), &original);
        assert!(!ctl.can_undo());
    }

    #[test]
    fn failure_inside_transaction_forces_rollback() {
        let mut ctl = controller();
        let original = ctl.tree().clone();
        let _ = ctl.begin_transaction("Broken");
        let _ = ctl
            .split_pane(pane("p1"), content("c2"), SplitPosition::Right)
            .expect("split");
        assert!(ctl.execute_command(Command::remove(pane("ghost"))).is_err());
        assert!(matches!(
            ctl.split_pane(pane("p1"), content("c3"), SplitPosition::Right),
            Err(ControllerError::RollbackPending)
        ));

        let outcome = ctl.commit_transaction().expect("close");
        assert!(matches!(outcome, TransactionOutcome::RolledBack { commands: 1, .. }));
        assert_eq!(ctl.tree(), &original);
    }

    #[test]
    fn closing_without_transaction_fails() {
        let mut ctl = controller();
        assert!(matches!(ctl.commit_transaction(), Err(ControllerError::NoTransaction)));
        assert!(matches!(ctl.rollback_transaction(), Err(ControllerError::NoTransaction)));
    }

    #[test]
    fn set_ratios_through_controller() {
        let mut ctl = controller();
        let _ = ctl
            .split_pane(pane("p1"), content("c2"), SplitPosition::Right)
            .expect("split");
        let node_id: NodeId = ctl
            .tree()
            .parent_of(&pane("p1"))
            .cloned()
            .expect("p1 has a parent");
        let _ = ctl
            .execute_command(Command::set_ratios(node_id, vec![0.75, 0.25]))
            .expect("ratios");
        let layout = ctl.solve(Bounds::from_size(1004, 100));
        assert_eq!(layout.pane_bounds(&pane("p1")).map(|b| b.width()), Some(750));
    }

    #[test]
    fn load_document_replaces_tree_and_clears_history() {
        let mut ctl = controller();
        let _ = ctl
            .split_pane(pane("p1"), content("c2"), SplitPosition::Right)
            .expect("split");
        let replacement = PaneTree::singleton(pane("solo"), content("x")).to_document();
        let report = ctl.load_document(replacement).expect("load");
        assert!(report.diff.added.contains(&pane("solo")));
        assert_eq!(report.diff.removed.len(), 2);
        assert!(!ctl.can_undo());
        assert_eq!(ctl.tree().pane_ids(), vec![pane("solo")]);
    }
}
