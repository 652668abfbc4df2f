//! The pane tree: owned root, per-instance registries, and structural edits.
//!
//! Two derived indexes map pane ids and split ids to child-index paths from
//! the root. They are rebuilt after every edit and after wholesale
//! replacement, and [`PaneTree::validate_structure`] checks that they still
//! agree with the tree.
//!
//! Every edit validates its arguments before touching the tree, so a
//! rejected edit leaves the tree exactly as it was.

use std::collections::BTreeMap;

use paneweave_core::{ContentId, NodeId, PaneId};
use serde::{Deserialize, Serialize};

use crate::error::{EditError, ModelError, StructureViolation, ViolationCode};
use crate::node::{LeafNode, Orientation, PaneNode, SizeConstraints, SplitNode};
use crate::ratio::{self, RatioError};

/// Where a new pane goes relative to the pane being split.
///
/// Directional positions wrap the target in a fresh split. `Before` and
/// `After` insert a sibling into the target's existing parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPosition {
    Left,
    Right,
    Top,
    Bottom,
    Before,
    After,
}

impl SplitPosition {
    /// Orientation of the split created for directional positions.
    #[must_use]
    pub const fn orientation(self) -> Option<Orientation> {
        match self {
            Self::Left | Self::Right => Some(Orientation::Horizontal),
            Self::Top | Self::Bottom => Some(Orientation::Vertical),
            Self::Before | Self::After => None,
        }
    }

    /// Whether the new pane precedes the target.
    #[must_use]
    pub const fn new_pane_first(self) -> bool {
        matches!(self, Self::Left | Self::Top | Self::Before)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

/// Result of [`PaneTree::remove_pane`].
#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    pub removed: LeafNode,
    /// Split that was left with one child and replaced by it.
    pub collapsed: Option<NodeId>,
}

/// A pane tree with its registries and focus.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaneTree {
    root: Option<PaneNode>,
    focused: Option<PaneId>,
    panes: BTreeMap<PaneId, Vec<usize>>,
    splits: BTreeMap<NodeId, Vec<usize>>,
}

impl PaneTree {
    /// A tree with no panes.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A tree holding one focused pane.
    #[must_use]
    pub fn singleton(pane_id: PaneId, content: ContentId) -> Self {
        let mut tree = Self::empty();
        tree.install(Some(PaneNode::leaf(pane_id.clone(), content)), Some(pane_id));
        tree
    }

    /// Adopt an assembled node tree, focusing its first leaf.
    pub fn with_root(root: PaneNode) -> Result<Self, ModelError> {
        let mut tree = Self::empty();
        let focus = root.first_leaf().map(|leaf| leaf.pane_id().clone());
        tree.install(Some(root), focus);
        let violations = tree.validate_structure();
        if violations.is_empty() {
            Ok(tree)
        } else {
            Err(ModelError::InvalidStructure { violations })
        }
    }

    /// Replace the whole tree. Back references and registries are rebuilt;
    /// nothing is validated.
    pub(crate) fn install(&mut self, root: Option<PaneNode>, focused: Option<PaneId>) {
        self.root = root;
        if let Some(root) = &mut self.root {
            root.relink_as_root();
        }
        self.reindex();
        self.focused = focused;
    }

    fn reindex(&mut self) {
        self.panes.clear();
        self.splits.clear();
        if let Some(root) = &self.root {
            let mut path = Vec::new();
            index_node(root, &mut path, &mut self.panes, &mut self.splits);
        }
    }

    #[must_use]
    pub fn root(&self) -> Option<&PaneNode> {
        self.root.as_ref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    #[must_use]
    pub fn focused(&self) -> Option<&PaneId> {
        self.focused.as_ref()
    }

    /// Focus an existing pane.
    pub fn set_focus(&mut self, pane_id: &PaneId) -> Result<(), EditError> {
        if !self.panes.contains_key(pane_id) {
            return Err(EditError::PaneNotFound {
                pane_id: pane_id.clone(),
            });
        }
        self.focused = Some(pane_id.clone());
        Ok(())
    }

    pub fn clear_focus(&mut self) {
        self.focused = None;
    }

    #[must_use]
    pub fn find_by_pane_id(&self, pane_id: &PaneId) -> Option<&LeafNode> {
        let path = self.panes.get(pane_id)?;
        self.node_at(path)?.as_leaf()
    }

    #[must_use]
    pub fn find_split(&self, node_id: &NodeId) -> Option<&SplitNode> {
        let path = self.splits.get(node_id)?;
        self.node_at(path)?.as_split()
    }

    #[must_use]
    pub fn contains(&self, pane_id: &PaneId) -> bool {
        self.panes.contains_key(pane_id)
    }

    /// Split owning `pane_id`; `None` for the root pane or an unknown id.
    #[must_use]
    pub fn parent_of(&self, pane_id: &PaneId) -> Option<&NodeId> {
        self.find_by_pane_id(pane_id)?.parent()
    }

    /// Every leaf in pre-order, left to right.
    #[must_use]
    pub fn all_leaves(&self) -> Vec<&LeafNode> {
        let mut leaves = Vec::new();
        if let Some(root) = &self.root {
            root.for_each_leaf(&mut |leaf| leaves.push(leaf));
        }
        leaves
    }

    #[must_use]
    pub fn pane_ids(&self) -> Vec<PaneId> {
        self.all_leaves()
            .into_iter()
            .map(|leaf| leaf.pane_id().clone())
            .collect()
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        if let Some(root) = &self.root {
            root.for_each_leaf(&mut |_| count += 1);
        }
        count
    }

    /// Split identifiers in index order.
    pub fn split_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.splits.keys()
    }

    /// Height of the tree: 0 when empty, 1 for a single pane.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, PaneNode::depth)
    }

    #[must_use]
    pub fn first_leaf(&self) -> Option<&LeafNode> {
        self.root.as_ref()?.first_leaf()
    }

    fn node_at(&self, path: &[usize]) -> Option<&PaneNode> {
        let mut node = self.root.as_ref()?;
        for &index in path {
            node = match node {
                PaneNode::Split(split) => split.children.get(index)?,
                PaneNode::Leaf(_) => return None,
            };
        }
        Some(node)
    }

    fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut PaneNode> {
        let mut node = self.root.as_mut()?;
        for &index in path {
            node = match node {
                PaneNode::Split(split) => split.children.get_mut(index)?,
                PaneNode::Leaf(_) => return None,
            };
        }
        Some(node)
    }

    fn pane_path(&self, pane_id: &PaneId) -> Result<Vec<usize>, EditError> {
        self.panes
            .get(pane_id)
            .cloned()
            .ok_or_else(|| EditError::PaneNotFound {
                pane_id: pane_id.clone(),
            })
    }

    /// Check every structural invariant and return all findings.
    ///
    /// An empty list means the tree is sound. Nothing is repaired.
    #[must_use]
    pub fn validate_structure(&self) -> Vec<StructureViolation> {
        let mut violations = Vec::new();
        let mut panes = BTreeMap::new();
        let mut splits = BTreeMap::new();

        if let Some(root) = &self.root {
            if let Some(parent) = root.parent() {
                violations.push(StructureViolation::new(
                    ViolationCode::ParentMismatch,
                    None,
                    format!("root node has a parent reference to {parent}"),
                ));
            }
            let mut path = Vec::new();
            check_node(root, &mut path, &mut panes, &mut splits, &mut violations);
        }

        if panes != self.panes || splits != self.splits {
            violations.push(StructureViolation::new(
                ViolationCode::RegistryOutOfSync,
                None,
                format!(
                    "registry holds {} panes and {} splits, tree holds {} and {}",
                    self.panes.len(),
                    self.splits.len(),
                    panes.len(),
                    splits.len()
                ),
            ));
        }

        if let Some(focused) = &self.focused
            && !panes.contains_key(focused)
        {
            violations.push(StructureViolation::new(
                ViolationCode::DanglingFocus,
                Some(focused.as_str()),
                "focused pane is not in the tree",
            ));
        }

        violations
    }

    /// Deterministic structural hash, for logs and diagnostics.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0001_0000_01b3;

        fn mix_bytes(hash: &mut u64, bytes: &[u8]) {
            for byte in bytes {
                *hash ^= u64::from(*byte);
                *hash = hash.wrapping_mul(PRIME);
            }
        }

        fn mix_str(hash: &mut u64, value: &str) {
            mix_bytes(hash, &(value.len() as u64).to_le_bytes());
            mix_bytes(hash, value.as_bytes());
        }

        fn mix_opt_i32(hash: &mut u64, value: Option<i32>) {
            match value {
                Some(value) => {
                    mix_bytes(hash, &[1]);
                    mix_bytes(hash, &value.to_le_bytes());
                }
                None => mix_bytes(hash, &[0]),
            }
        }

        fn mix_node(hash: &mut u64, node: &PaneNode) {
            match node {
                PaneNode::Leaf(leaf) => {
                    mix_bytes(hash, &[0]);
                    mix_str(hash, leaf.pane_id().as_str());
                    mix_str(hash, leaf.content().as_str());
                    let c = leaf.constraints();
                    mix_bytes(hash, &c.min_width.to_le_bytes());
                    mix_bytes(hash, &c.min_height.to_le_bytes());
                    mix_opt_i32(hash, c.max_width);
                    mix_opt_i32(hash, c.max_height);
                }
                PaneNode::Split(split) => {
                    mix_bytes(hash, &[1]);
                    mix_str(hash, split.node_id().as_str());
                    mix_bytes(hash, &[split.orientation() as u8]);
                    mix_bytes(hash, &(split.children().len() as u64).to_le_bytes());
                    for ratio in split.ratios() {
                        mix_bytes(hash, &ratio.to_bits().to_le_bytes());
                    }
                    for child in split.children() {
                        mix_node(hash, child);
                    }
                }
            }
        }

        let mut hash = OFFSET_BASIS;
        match &self.root {
            Some(root) => mix_node(&mut hash, root),
            None => mix_bytes(&mut hash, &[0xff]),
        }
        match &self.focused {
            Some(focused) => mix_str(&mut hash, focused.as_str()),
            None => mix_bytes(&mut hash, &[0]),
        }
        hash
    }
}

fn index_node(
    node: &PaneNode,
    path: &mut Vec<usize>,
    panes: &mut BTreeMap<PaneId, Vec<usize>>,
    splits: &mut BTreeMap<NodeId, Vec<usize>>,
) {
    match node {
        PaneNode::Leaf(leaf) => {
            let _ = panes
                .entry(leaf.pane_id().clone())
                .or_insert_with(|| path.clone());
        }
        PaneNode::Split(split) => {
            let _ = splits
                .entry(split.node_id().clone())
                .or_insert_with(|| path.clone());
            for (index, child) in split.children().iter().enumerate() {
                path.push(index);
                index_node(child, path, panes, splits);
                let _ = path.pop();
            }
        }
    }
}

fn check_node(
    node: &PaneNode,
    path: &mut Vec<usize>,
    panes: &mut BTreeMap<PaneId, Vec<usize>>,
    splits: &mut BTreeMap<NodeId, Vec<usize>>,
    out: &mut Vec<StructureViolation>,
) {
    match node {
        PaneNode::Leaf(leaf) => {
            let id = leaf.pane_id().as_str();
            if id.is_empty() || leaf.content().as_str().is_empty() {
                out.push(StructureViolation::new(
                    ViolationCode::EmptyIdentifier,
                    Some(id),
                    "leaf needs a non-empty pane id and content reference",
                ));
            }
            if let Err(err) = leaf.constraints().validate() {
                out.push(StructureViolation::new(
                    ViolationCode::InvalidConstraints,
                    Some(id),
                    err.to_string(),
                ));
            }
            if panes.contains_key(leaf.pane_id()) {
                out.push(StructureViolation::new(
                    ViolationCode::DuplicatePaneId,
                    Some(id),
                    "pane id appears more than once",
                ));
            } else {
                let _ = panes.insert(leaf.pane_id().clone(), path.clone());
            }
        }
        PaneNode::Split(split) => {
            let id = split.node_id().as_str();
            if splits.contains_key(split.node_id()) {
                out.push(StructureViolation::new(
                    ViolationCode::DuplicateNodeId,
                    Some(id),
                    "split id appears more than once",
                ));
            } else {
                let _ = splits.insert(split.node_id().clone(), path.clone());
            }

            let children = split.children().len();
            if children < 2 {
                out.push(StructureViolation::new(
                    ViolationCode::UnderfilledSplit,
                    Some(id),
                    format!("split has {children} children, needs at least 2"),
                ));
            }
            match ratio::validate_ratios(split.ratios(), children) {
                Ok(()) => {}
                Err(RatioError::WrongCount { expected, actual }) => {
                    out.push(StructureViolation::new(
                        ViolationCode::RatioCountMismatch,
                        Some(id),
                        format!("{actual} ratios for {expected} children"),
                    ));
                }
                Err(err) => {
                    out.push(StructureViolation::new(
                        ViolationCode::InvalidRatios,
                        Some(id),
                        err.to_string(),
                    ));
                }
            }

            for (index, child) in split.children().iter().enumerate() {
                if child.parent() != Some(split.node_id()) {
                    out.push(StructureViolation::new(
                        ViolationCode::ParentMismatch,
                        Some(id),
                        format!(
                            "child #{index} points at {}",
                            child.parent().map_or("nothing", NodeId::as_str)
                        ),
                    ));
                }
                path.push(index);
                check_node(child, path, panes, splits, out);
                let _ = path.pop();
            }
        }
    }
}

// Edits.
impl PaneTree {
    /// Place `new_leaf` next to `target`.
    ///
    /// `target` keeps `ratio` of its previous space and the new pane gets the
    /// rest. Directional positions wrap `target` in a new split named
    /// `split_id`; `Before`/`After` ignore `split_id` and fail on the root
    /// pane, which has no parent to insert into. Focus moves to the new pane.
    pub fn split_pane(
        &mut self,
        target: &PaneId,
        new_leaf: LeafNode,
        position: SplitPosition,
        ratio: f64,
        split_id: NodeId,
    ) -> Result<(), EditError> {
        if !(ratio.is_finite() && ratio > 0.0 && ratio < 1.0) {
            return Err(EditError::SplitRatioOutOfRange { ratio });
        }
        let path = self.pane_path(target)?;
        if self.panes.contains_key(new_leaf.pane_id()) {
            return Err(EditError::DuplicatePane {
                pane_id: new_leaf.pane_id().clone(),
            });
        }
        if let Err(source) = new_leaf.constraints().validate() {
            return Err(EditError::InvalidConstraints {
                pane_id: new_leaf.pane_id().clone(),
                source,
            });
        }
        let new_pane = new_leaf.pane_id().clone();

        match position.orientation() {
            Some(orientation) => {
                if self.splits.contains_key(&split_id) {
                    return Err(EditError::DuplicateNode { node_id: split_id });
                }
                let split = SplitSpec {
                    node_id: split_id,
                    orientation,
                    new_first: position.new_pane_first(),
                    ratio,
                };
                self.wrap_leaf(target, &path, new_leaf, split)?;
            }
            None => {
                self.insert_sibling(target, &path, new_leaf, position.new_pane_first(), ratio)?;
            }
        }

        self.reindex();
        self.focused = Some(new_pane);
        Ok(())
    }

    fn wrap_leaf(
        &mut self,
        target: &PaneId,
        path: &[usize],
        new_leaf: LeafNode,
        spec: SplitSpec,
    ) -> Result<(), EditError> {
        let Some(slot) = self.node_at_mut(path) else {
            return Err(EditError::PaneNotFound {
                pane_id: target.clone(),
            });
        };
        let placeholder = PaneNode::Split(SplitNode::new(
            spec.node_id.clone(),
            spec.orientation,
            Vec::new(),
            Vec::new(),
        ));
        let existing = std::mem::replace(slot, placeholder);
        let parent = existing.parent().cloned();

        let (children, ratios) = if spec.new_first {
            (
                vec![PaneNode::Leaf(new_leaf), existing],
                vec![1.0 - spec.ratio, spec.ratio],
            )
        } else {
            (
                vec![existing, PaneNode::Leaf(new_leaf)],
                vec![spec.ratio, 1.0 - spec.ratio],
            )
        };
        let mut split = SplitNode::new(spec.node_id, spec.orientation, children, ratios);
        split.parent = parent;
        *slot = PaneNode::Split(split);
        Ok(())
    }

    fn insert_sibling(
        &mut self,
        target: &PaneId,
        path: &[usize],
        new_leaf: LeafNode,
        new_first: bool,
        ratio: f64,
    ) -> Result<(), EditError> {
        let Some((&index, parent_path)) = path.split_last() else {
            return Err(EditError::RootHasNoParent {
                pane_id: target.clone(),
            });
        };
        let Some(PaneNode::Split(parent)) = self.node_at_mut(parent_path) else {
            return Err(EditError::PaneNotFound {
                pane_id: target.clone(),
            });
        };
        let Some(share) = parent.ratios.get(index).copied() else {
            return Err(EditError::PaneNotFound {
                pane_id: target.clone(),
            });
        };

        let kept = share * ratio;
        let given = share * (1.0 - ratio);
        if !(kept.is_finite() && kept > 0.0 && given.is_finite() && given > 0.0) {
            return Err(EditError::SplitRatioOutOfRange { ratio });
        }

        parent.ratios[index] = kept;
        let at = if new_first { index } else { index + 1 };
        parent.attach(at, PaneNode::Leaf(new_leaf), given);
        Ok(())
    }

    /// Remove a pane.
    ///
    /// Removing the root pane empties the tree. Otherwise the remaining
    /// siblings' ratios are renormalized, and a parent left with a single
    /// child is replaced by that child. If the removed pane had focus, focus
    /// moves to the first leaf of whatever now occupies the parent's slot.
    pub fn remove_pane(&mut self, target: &PaneId) -> Result<Removal, EditError> {
        let path = self.pane_path(target)?;
        let not_found = || EditError::PaneNotFound {
            pane_id: target.clone(),
        };

        let Some((&index, parent_path)) = path.split_last() else {
            return match self.root.take() {
                Some(PaneNode::Leaf(removed)) => {
                    self.focused = None;
                    self.reindex();
                    Ok(Removal {
                        removed,
                        collapsed: None,
                    })
                }
                other => {
                    self.root = other;
                    Err(not_found())
                }
            };
        };

        let Some(slot) = self.node_at_mut(parent_path) else {
            return Err(not_found());
        };
        let PaneNode::Split(parent) = slot else {
            return Err(not_found());
        };
        if !parent.children.get(index).is_some_and(PaneNode::is_leaf) {
            return Err(not_found());
        }

        let PaneNode::Leaf(removed) = parent.detach(index) else {
            return Err(not_found());
        };
        parent.ratios = ratio::normalize(&parent.ratios);

        let mut collapsed = None;
        if parent.children.len() == 1 {
            let grandparent = parent.parent.clone();
            collapsed = Some(parent.node_id().clone());
            let mut survivor = parent.detach(0);
            survivor.set_parent(grandparent);
            *slot = survivor;
        }

        self.reindex();
        if self.focused.as_ref() == Some(target) {
            self.focused = self
                .node_at(parent_path)
                .and_then(PaneNode::first_leaf)
                .map(|leaf| leaf.pane_id().clone());
        }
        Ok(Removal { removed, collapsed })
    }

    /// Replace a split's ratios; returns the previous list.
    pub fn set_ratios(&mut self, node_id: &NodeId, ratios: Vec<f64>) -> Result<Vec<f64>, EditError> {
        let not_found = || EditError::NodeNotFound {
            node_id: node_id.clone(),
        };
        let path = self.splits.get(node_id).cloned().ok_or_else(not_found)?;
        let Some(PaneNode::Split(split)) = self.node_at_mut(&path) else {
            return Err(not_found());
        };
        ratio::validate_ratios(&ratios, split.children.len()).map_err(|source| {
            EditError::InvalidRatios {
                node_id: node_id.clone(),
                source,
            }
        })?;
        Ok(std::mem::replace(&mut split.ratios, ratios))
    }

    /// Replace a leaf's size constraints; returns the previous record.
    pub fn set_constraints(
        &mut self,
        pane_id: &PaneId,
        constraints: SizeConstraints,
    ) -> Result<SizeConstraints, EditError> {
        constraints
            .validate()
            .map_err(|source| EditError::InvalidConstraints {
                pane_id: pane_id.clone(),
                source,
            })?;
        let path = self.pane_path(pane_id)?;
        let Some(PaneNode::Leaf(leaf)) = self.node_at_mut(&path) else {
            return Err(EditError::PaneNotFound {
                pane_id: pane_id.clone(),
            });
        };
        let previous = *leaf.constraints();
        leaf.set_constraints(constraints);
        Ok(previous)
    }
}

struct SplitSpec {
    node_id: NodeId,
    orientation: Orientation,
    new_first: bool,
    ratio: f64,
}
