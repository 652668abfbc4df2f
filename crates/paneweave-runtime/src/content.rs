//! Keeping per-pane content handles in step with the tree.
//!
//! The engine never looks inside content. A [`ContentHost`] owns one handle
//! per visible pane, created by a [`ContentFactory`], and updates the set
//! from a [`DiffResult`]: removed panes drop their handle, added panes get a
//! new one, modified panes get a fresh handle for their new content, and
//! moved panes keep theirs.

use std::collections::BTreeMap;

use paneweave_core::{ContentId, PaneId};
use paneweave_layout::{DiffResult, PaneTree};

/// Builds the handle a pane shows.
pub trait ContentFactory<H> {
    fn create(&mut self, content: &ContentId, pane_id: &PaneId) -> H;
}

impl<H, F> ContentFactory<H> for F
where
    F: FnMut(&ContentId, &PaneId) -> H,
{
    fn create(&mut self, content: &ContentId, pane_id: &PaneId) -> H {
        self(content, pane_id)
    }
}

/// Handle changes made by one [`ContentHost::apply`].
#[derive(Debug)]
pub struct ContentChanges<H> {
    pub created: Vec<PaneId>,
    /// Handles that left the host, for the caller to tear down.
    pub dropped: Vec<(PaneId, H)>,
}

impl<H> Default for ContentChanges<H> {
    fn default() -> Self {
        Self {
            created: Vec::new(),
            dropped: Vec::new(),
        }
    }
}

/// One handle per visible pane.
#[derive(Debug)]
pub struct ContentHost<H, F> {
    factory: F,
    handles: BTreeMap<PaneId, H>,
}

impl<H, F: ContentFactory<H>> ContentHost<H, F> {
    #[must_use]
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            handles: BTreeMap::new(),
        }
    }

    /// Create a handle for every pane of `tree` that has none yet.
    pub fn populate(&mut self, tree: &PaneTree) -> Vec<PaneId> {
        let mut created = Vec::new();
        for leaf in tree.all_leaves() {
            if self.handles.contains_key(leaf.pane_id()) {
                continue;
            }
            let handle = self.factory.create(leaf.content(), leaf.pane_id());
            let _ = self.handles.insert(leaf.pane_id().clone(), handle);
            created.push(leaf.pane_id().clone());
        }
        created
    }

    /// Bring the handles in line with `tree`, which `diff` describes.
    pub fn apply(&mut self, diff: &DiffResult, tree: &PaneTree) -> ContentChanges<H> {
        let mut changes = ContentChanges::default();

        for pane_id in diff.removed.iter().chain(&diff.modified) {
            if let Some(handle) = self.handles.remove(pane_id) {
                tracing::debug!(pane_id = %pane_id, "content handle dropped");
                changes.dropped.push((pane_id.clone(), handle));
            }
        }

        for pane_id in diff.added.iter().chain(&diff.modified) {
            let Some(leaf) = tree.find_by_pane_id(pane_id) else {
                tracing::warn!(pane_id = %pane_id, "diff names a pane missing from the tree");
                continue;
            };
            let handle = self.factory.create(leaf.content(), pane_id);
            let _ = self.handles.insert(pane_id.clone(), handle);
            tracing::debug!(pane_id = %pane_id, content = %leaf.content(), "content handle created");
            changes.created.push(pane_id.clone());
        }
        changes
    }

    #[must_use]
    pub fn handle(&self, pane_id: &PaneId) -> Option<&H> {
        self.handles.get(pane_id)
    }

    pub fn handle_mut(&mut self, pane_id: &PaneId) -> Option<&mut H> {
        self.handles.get_mut(pane_id)
    }

    pub fn pane_ids(&self) -> impl Iterator<Item = &PaneId> {
        self.handles.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Remove every handle and hand them back.
    pub fn clear(&mut self) -> Vec<(PaneId, H)> {
        std::mem::take(&mut self.handles).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::LayoutController;
    use paneweave_layout::SplitPosition;

    fn pane(raw: &str) -> PaneId {
        PaneId::new(raw).expect("pane")
    }

    fn content(raw: &str) -> ContentId {
        ContentId::new(raw).expect("content")
    }

    fn label_factory() -> impl FnMut(&ContentId, &PaneId) -> String {
        |content: &ContentId, pane_id: &PaneId| format!("{pane_id}:{content}")
    }

    #[test]
    fn populate_creates_one_handle_per_pane() {
        let tree = PaneTree::singleton(pane("p1"), content("editor"));
        let mut host = ContentHost::new(label_factory());
        assert_eq!(host.populate(&tree), vec![pane("p1")]);
        assert_eq!(host.handle(&pane("p1")).map(String::as_str), Some("p1:editor"));
        assert!(host.populate(&tree).is_empty());
    }

    #[test]
    fn apply_follows_controller_changes() {
        let mut ctl = LayoutController::new(PaneTree::singleton(pane("p1"), content("editor")));
        let mut host = ContentHost::new(label_factory());
        let _ = host.populate(ctl.tree());

        let report = ctl
            .split_pane(pane("p1"), content("terminal"), SplitPosition::Bottom)
            .expect("split");
        let changes = host.apply(&report.diff, ctl.tree());
        assert_eq!(changes.created.len(), 1);
        assert!(changes.dropped.is_empty());
        assert_eq!(host.len(), 2);
        // p1 moved under the new split and keeps its handle.
        assert_eq!(host.handle(&pane("p1")).map(String::as_str), Some("p1:editor"));

        let undone = ctl.undo().expect("undo").expect("entry");
        let changes = host.apply(&undone.diff, ctl.tree());
        assert!(changes.created.is_empty());
        assert_eq!(changes.dropped.len(), 1);
        assert!(changes.dropped[0].1.ends_with(":terminal"));
        assert_eq!(host.len(), 1);
    }

    #[test]
    fn modified_pane_gets_a_fresh_handle() {
        let old = PaneTree::singleton(pane("p1"), content("a"));
        let new = PaneTree::singleton(pane("p1"), content("b"));
        let mut host = ContentHost::new(label_factory());
        let _ = host.populate(&old);

        let diff = paneweave_layout::diff_trees(&old, &new);
        let changes = host.apply(&diff, &new);
        assert_eq!(changes.created, vec![pane("p1")]);
        assert_eq!(changes.dropped, vec![(pane("p1"), "p1:a".to_owned())]);
        assert_eq!(host.handle(&pane("p1")).map(String::as_str), Some("p1:b"));
    }

    #[test]
    fn clear_returns_all_handles() {
        let tree = PaneTree::singleton(pane("p1"), content("a"));
        let mut host = ContentHost::new(label_factory());
        let _ = host.populate(&tree);
        assert_eq!(host.clear().len(), 1);
        assert!(host.is_empty());
    }
}
