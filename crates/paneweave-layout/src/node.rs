//! Tree nodes: leaves hold content, splits divide space among children.
//!
//! Ownership is strictly top-down. The `parent` field on each node is a
//! back reference by identifier, written by the owning [`SplitNode`] when a
//! child is attached and never serialized.

use paneweave_core::{Bounds, ContentId, NodeId, PaneId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Axis along which a split lays out its children.
///
/// `Horizontal` places children side by side (left to right), `Vertical`
/// stacks them (top to bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Extent of `bounds` along this axis.
    #[must_use]
    pub const fn main_extent(self, bounds: &Bounds) -> i32 {
        match self {
            Self::Horizontal => bounds.width(),
            Self::Vertical => bounds.height(),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

/// Invalid [`SizeConstraints`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("minimum {axis} must be non-negative, got {value}")]
    NegativeMinimum { axis: Axis, value: i32 },
    #[error("maximum {axis} {max} is below minimum {min}")]
    MaxBelowMin { axis: Axis, min: i32, max: i32 },
}

/// Width or height, for constraint messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Width => "width",
            Self::Height => "height",
        })
    }
}

/// Size limits for a leaf, in pixels. Maximums are optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeConstraints {
    pub min_width: i32,
    pub min_height: i32,
    pub max_width: Option<i32>,
    pub max_height: Option<i32>,
}

impl SizeConstraints {
    /// No limits at all.
    pub const NONE: Self = Self {
        min_width: 0,
        min_height: 0,
        max_width: None,
        max_height: None,
    };

    #[must_use]
    pub const fn with_min(min_width: i32, min_height: i32) -> Self {
        Self {
            min_width,
            min_height,
            max_width: None,
            max_height: None,
        }
    }

    #[must_use]
    pub const fn with_max(mut self, max_width: Option<i32>, max_height: Option<i32>) -> Self {
        self.max_width = max_width;
        self.max_height = max_height;
        self
    }

    pub fn validate(&self) -> Result<(), ConstraintError> {
        check_axis(Axis::Width, self.min_width, self.max_width)?;
        check_axis(Axis::Height, self.min_height, self.max_height)
    }

    /// Minimum extent along `orientation`'s axis.
    #[must_use]
    pub const fn min_along(&self, orientation: Orientation) -> i32 {
        match orientation {
            Orientation::Horizontal => self.min_width,
            Orientation::Vertical => self.min_height,
        }
    }

    /// Clamp a width into `[min_width, max_width]`.
    #[must_use]
    pub fn clamp_width(&self, width: i32) -> i32 {
        clamp_axis(width, self.min_width, self.max_width)
    }

    /// Clamp a height into `[min_height, max_height]`.
    #[must_use]
    pub fn clamp_height(&self, height: i32) -> i32 {
        clamp_axis(height, self.min_height, self.max_height)
    }
}

fn check_axis(axis: Axis, min: i32, max: Option<i32>) -> Result<(), ConstraintError> {
    if min < 0 {
        return Err(ConstraintError::NegativeMinimum { axis, value: min });
    }
    if let Some(max) = max
        && max < min
    {
        return Err(ConstraintError::MaxBelowMin { axis, min, max });
    }
    Ok(())
}

fn clamp_axis(value: i32, min: i32, max: Option<i32>) -> i32 {
    let upper = max.unwrap_or(i32::MAX).max(min);
    value.clamp(min, upper)
}

/// A visible pane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafNode {
    pane_id: PaneId,
    #[serde(rename = "content_reference")]
    content: ContentId,
    #[serde(default)]
    constraints: SizeConstraints,
    #[serde(skip)]
    pub(crate) parent: Option<NodeId>,
}

impl LeafNode {
    #[must_use]
    pub fn new(pane_id: PaneId, content: ContentId) -> Self {
        Self {
            pane_id,
            content,
            constraints: SizeConstraints::NONE,
            parent: None,
        }
    }

    #[must_use]
    pub fn with_constraints(mut self, constraints: SizeConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    #[must_use]
    pub fn pane_id(&self) -> &PaneId {
        &self.pane_id
    }

    #[must_use]
    pub fn content(&self) -> &ContentId {
        &self.content
    }

    #[must_use]
    pub fn constraints(&self) -> &SizeConstraints {
        &self.constraints
    }

    pub(crate) fn set_constraints(&mut self, constraints: SizeConstraints) {
        self.constraints = constraints;
    }

    /// Split that owns this leaf; `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }
}

/// An internal node dividing its space among two or more children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitNode {
    node_id: NodeId,
    orientation: Orientation,
    pub(crate) ratios: Vec<f64>,
    pub(crate) children: Vec<PaneNode>,
    #[serde(skip)]
    pub(crate) parent: Option<NodeId>,
}

impl SplitNode {
    /// Build a split and link every child back to it.
    ///
    /// Nothing is validated here; [`crate::PaneTree::with_root`] checks the
    /// assembled tree.
    #[must_use]
    pub fn new(
        node_id: NodeId,
        orientation: Orientation,
        children: Vec<PaneNode>,
        ratios: Vec<f64>,
    ) -> Self {
        let mut split = Self {
            node_id,
            orientation,
            ratios,
            children,
            parent: None,
        };
        split.link_children();
        split
    }

    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[must_use]
    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    #[must_use]
    pub fn children(&self) -> &[PaneNode] {
        &self.children
    }

    #[must_use]
    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    /// Insert `child` at `index`, pointing its back reference at this split.
    pub(crate) fn attach(&mut self, index: usize, mut child: PaneNode, ratio: f64) {
        child.set_parent(Some(self.node_id.clone()));
        self.children.insert(index, child);
        self.ratios.insert(index, ratio);
    }

    /// Remove the child at `index` together with its ratio.
    pub(crate) fn detach(&mut self, index: usize) -> PaneNode {
        let _ = self.ratios.remove(index);
        let mut child = self.children.remove(index);
        child.set_parent(None);
        child
    }

    pub(crate) fn link_children(&mut self) {
        let id = self.node_id.clone();
        for child in &mut self.children {
            child.set_parent(Some(id.clone()));
        }
    }
}

/// A node of the pane tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaneNode {
    Leaf(LeafNode),
    Split(SplitNode),
}

impl PaneNode {
    #[must_use]
    pub fn leaf(pane_id: PaneId, content: ContentId) -> Self {
        Self::Leaf(LeafNode::new(pane_id, content))
    }

    #[must_use]
    pub fn split(
        node_id: NodeId,
        orientation: Orientation,
        children: Vec<PaneNode>,
        ratios: Vec<f64>,
    ) -> Self {
        Self::Split(SplitNode::new(node_id, orientation, children, ratios))
    }

    #[must_use]
    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Split(_) => None,
        }
    }

    #[must_use]
    pub fn as_split(&self) -> Option<&SplitNode> {
        match self {
            Self::Split(split) => Some(split),
            Self::Leaf(_) => None,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    #[must_use]
    pub fn parent(&self) -> Option<&NodeId> {
        match self {
            Self::Leaf(leaf) => leaf.parent.as_ref(),
            Self::Split(split) => split.parent.as_ref(),
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        match self {
            Self::Leaf(leaf) => leaf.parent = parent,
            Self::Split(split) => split.parent = parent,
        }
    }

    /// Leftmost leaf of this subtree.
    #[must_use]
    pub fn first_leaf(&self) -> Option<&LeafNode> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Split(split) => split.children.first().and_then(Self::first_leaf),
        }
    }

    /// Height of this subtree; a lone leaf has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Split(split) => {
                1 + split
                    .children
                    .iter()
                    .map(Self::depth)
                    .max()
                    .unwrap_or(0)
            }
        }
    }

    /// Visit every leaf in pre-order, left to right.
    pub fn for_each_leaf<'a>(&'a self, visit: &mut impl FnMut(&'a LeafNode)) {
        match self {
            Self::Leaf(leaf) => visit(leaf),
            Self::Split(split) => {
                for child in &split.children {
                    child.for_each_leaf(visit);
                }
            }
        }
    }

    /// Re-point every back reference below this node, and clear this
    /// node's own parent. Used after wholesale replacement.
    pub(crate) fn relink_as_root(&mut self) {
        self.set_parent(None);
        self.relink_descendants();
    }

    fn relink_descendants(&mut self) {
        if let Self::Split(split) = self {
            split.link_children();
            for child in &mut split.children {
                child.relink_descendants();
            }
        }
    }
}
