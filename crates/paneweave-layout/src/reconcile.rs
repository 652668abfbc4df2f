//! Tree reconciliation.
//!
//! Each tree is flattened to `pane_id -> (content, parent split)` and the two
//! maps are compared. A pane whose parent split changed is *moved*, one whose
//! content reference changed is *modified*; a pane can be both. Subtrees are
//! never compared wholesale.

use std::collections::BTreeSet;

use paneweave_core::{ContentId, NodeId, PaneId};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::node::PaneNode;
use crate::tree::PaneTree;

/// The four pane sets a presentation layer needs to update itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    pub added: BTreeSet<PaneId>,
    pub removed: BTreeSet<PaneId>,
    pub moved: BTreeSet<PaneId>,
    pub modified: BTreeSet<PaneId>,
}

impl DiffResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.moved.is_empty()
            && self.modified.is_empty()
    }

    /// Every pane mentioned in any set.
    #[must_use]
    pub fn touched(&self) -> BTreeSet<&PaneId> {
        self.added
            .iter()
            .chain(&self.removed)
            .chain(&self.moved)
            .chain(&self.modified)
            .collect()
    }

    /// The diff that undoes this one.
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            added: self.removed.clone(),
            removed: self.added.clone(),
            moved: self.moved.clone(),
            modified: self.modified.clone(),
        }
    }
}

#[derive(Clone, Copy)]
struct Placement<'a> {
    content: &'a ContentId,
    parent: Option<&'a NodeId>,
}

fn flatten(root: Option<&PaneNode>) -> FxHashMap<&PaneId, Placement<'_>> {
    let mut map = FxHashMap::default();
    if let Some(root) = root {
        root.for_each_leaf(&mut |leaf| {
            let _ = map.insert(
                leaf.pane_id(),
                Placement {
                    content: leaf.content(),
                    parent: leaf.parent(),
                },
            );
        });
    }
    map
}

/// Compare two trees, either of which may be absent.
#[must_use]
pub fn diff(old: Option<&PaneNode>, new: Option<&PaneNode>) -> DiffResult {
    let before = flatten(old);
    let after = flatten(new);
    let mut result = DiffResult::default();

    for (pane_id, was) in &before {
        match after.get(pane_id) {
            None => {
                let _ = result.removed.insert((*pane_id).clone());
            }
            Some(now) => {
                if was.parent != now.parent {
                    let _ = result.moved.insert((*pane_id).clone());
                }
                if was.content != now.content {
                    let _ = result.modified.insert((*pane_id).clone());
                }
            }
        }
    }
    for pane_id in after.keys() {
        if !before.contains_key(pane_id) {
            let _ = result.added.insert((*pane_id).clone());
        }
    }
    result
}

/// [`diff`] over two whole trees.
#[must_use]
pub fn diff_trees(old: &PaneTree, new: &PaneTree) -> DiffResult {
    diff(old.root(), new.root())
}
