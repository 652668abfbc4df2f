//! Geometry solver: pane and divider rectangles for a tree inside an outer
//! rectangle.
//!
//! A split first reserves `(n - 1) * divider` pixels along its axis, then
//! hands each child except the last a truncated proportional share of what
//! remains. The last child takes everything up to the split's far edge, so
//! children and dividers always tile the split exactly with no gap or
//! overlap. When the dividers alone do not fit, every child collapses to
//! zero length and the dividers are clipped at the edge.
//!
//! All functions here are pure.

use std::collections::BTreeMap;

use paneweave_core::{Bounds, NodeId, PaneId};
use serde::Serialize;

use crate::node::{LeafNode, Orientation, PaneNode, SplitNode};
use crate::tree::PaneTree;

/// The strip between two adjacent children of a split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DividerRect {
    /// Split that owns the divider.
    pub node_id: NodeId,
    /// The divider sits between child `index` and child `index + 1`.
    pub index: usize,
    pub orientation: Orientation,
    pub bounds: Bounds,
}

/// A split whose children cannot all reach their minimum size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintViolation {
    pub node_id: NodeId,
    pub orientation: Orientation,
    /// Sum of child minimums plus dividers along the split axis.
    pub required: i32,
    /// Length the split actually received along that axis.
    pub available: i32,
}

/// A pane whose proportional rectangle was clamped to its constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClampedPane {
    pub pane_id: PaneId,
    pub proportional: Bounds,
    pub clamped: Bounds,
}

/// What [`apply_constraints`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConstraintReport {
    pub violations: Vec<ConstraintViolation>,
    pub clamped: Vec<ClampedPane>,
}

impl ConstraintReport {
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Pane rectangles, divider rectangles, and the constraint report for one
/// solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolvedLayout {
    pub outer: Bounds,
    pub divider_thickness: i32,
    /// Proportional, pixel-exact partition.
    pub panes: BTreeMap<PaneId, Bounds>,
    pub dividers: Vec<DividerRect>,
    pub constraints: ConstraintReport,
}

impl SolvedLayout {
    /// Layout of an empty tree.
    #[must_use]
    pub fn empty(outer: Bounds, divider_thickness: i32) -> Self {
        Self {
            outer,
            divider_thickness,
            panes: BTreeMap::new(),
            dividers: Vec::new(),
            constraints: ConstraintReport::default(),
        }
    }

    #[must_use]
    pub fn pane_bounds(&self, pane_id: &PaneId) -> Option<Bounds> {
        self.panes.get(pane_id).copied()
    }

    /// Pane under the point, if any.
    #[must_use]
    pub fn pane_at(&self, x: i32, y: i32) -> Option<&PaneId> {
        self.panes
            .iter()
            .find(|(_, bounds)| bounds.contains(x, y))
            .map(|(pane_id, _)| pane_id)
    }

    /// Divider under the point, if any.
    #[must_use]
    pub fn divider_at(&self, x: i32, y: i32) -> Option<&DividerRect> {
        self.dividers
            .iter()
            .find(|divider| divider.bounds.contains(x, y))
    }
}

/// One contiguous run along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    start: i64,
    len: i64,
}

fn allocate(start: i64, length: i64, ratios: &[f64], divider: i64) -> (Vec<Segment>, Vec<Segment>) {
    let n = ratios.len();
    let mut children = Vec::with_capacity(n);
    let mut dividers = Vec::with_capacity(n.saturating_sub(1));
    if n == 0 {
        return (children, dividers);
    }

    let end = start + length;
    let available = (length - divider * (n as i64 - 1)).max(0);
    let mut offset = start;

    for (i, ratio) in ratios.iter().enumerate() {
        let last = i + 1 == n;
        let len = if last {
            (end - offset).max(0)
        } else {
            let reserved = (n - 1 - i) as i64 * divider;
            let room = (end - offset - reserved).max(0);
            let share = (available as f64 * ratio.max(0.0)).trunc() as i64;
            share.clamp(0, room)
        };
        children.push(Segment { start: offset, len });
        offset += len;

        if !last {
            let len = divider.min(end - offset).max(0);
            dividers.push(Segment { start: offset, len });
            offset += len;
        }
    }
    (children, dividers)
}

fn to_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

fn along(orientation: Orientation, bounds: Bounds, segment: Segment) -> Bounds {
    match orientation {
        Orientation::Horizontal => Bounds::saturating(
            to_i32(segment.start),
            bounds.y(),
            to_i32(segment.len),
            bounds.height(),
        ),
        Orientation::Vertical => Bounds::saturating(
            bounds.x(),
            to_i32(segment.start),
            bounds.width(),
            to_i32(segment.len),
        ),
    }
}

enum Visit<'a> {
    Leaf(&'a LeafNode, Bounds),
    Split(&'a SplitNode, Bounds),
    Divider(DividerRect),
}

fn walk<'a>(node: &'a PaneNode, bounds: Bounds, divider: i64, visit: &mut impl FnMut(Visit<'a>)) {
    match node {
        PaneNode::Leaf(leaf) => visit(Visit::Leaf(leaf, bounds)),
        PaneNode::Split(split) => {
            visit(Visit::Split(split, bounds));
            let orientation = split.orientation();
            let (start, length) = match orientation {
                Orientation::Horizontal => (bounds.x(), bounds.width()),
                Orientation::Vertical => (bounds.y(), bounds.height()),
            };
            let (children, dividers) =
                allocate(i64::from(start), i64::from(length), split.ratios(), divider);

            for (index, segment) in dividers.into_iter().enumerate() {
                visit(Visit::Divider(DividerRect {
                    node_id: split.node_id().clone(),
                    index,
                    orientation,
                    bounds: along(orientation, bounds, segment),
                }));
            }
            for (child, segment) in split.children().iter().zip(children) {
                walk(child, along(orientation, bounds, segment), divider, visit);
            }
        }
    }
}

/// Rectangle of every pane.
#[must_use]
pub fn compute(root: &PaneNode, outer: Bounds, divider_thickness: i32) -> BTreeMap<PaneId, Bounds> {
    let mut panes = BTreeMap::new();
    walk(root, outer, i64::from(divider_thickness.max(0)), &mut |visit| {
        if let Visit::Leaf(leaf, bounds) = visit {
            let _ = panes.insert(leaf.pane_id().clone(), bounds);
        }
    });
    panes
}

/// Rectangle of every divider, parents before children.
#[must_use]
pub fn compute_dividers(root: &PaneNode, outer: Bounds, divider_thickness: i32) -> Vec<DividerRect> {
    let mut dividers = Vec::new();
    walk(root, outer, i64::from(divider_thickness.max(0)), &mut |visit| {
        if let Visit::Divider(divider) = visit {
            dividers.push(divider);
        }
    });
    dividers
}

/// Smallest length `node` can occupy along `axis`.
fn min_extent(node: &PaneNode, axis: Orientation, divider: i64) -> i64 {
    match node {
        PaneNode::Leaf(leaf) => i64::from(leaf.constraints().min_along(axis)),
        PaneNode::Split(split) => split_min_extent(split, axis, divider),
    }
}

fn split_min_extent(split: &SplitNode, axis: Orientation, divider: i64) -> i64 {
    let mins = split
        .children()
        .iter()
        .map(|child| min_extent(child, axis, divider));
    if split.orientation() == axis {
        let gaps = split.children().len().saturating_sub(1) as i64 * divider;
        mins.sum::<i64>() + gaps
    } else {
        mins.max().unwrap_or(0)
    }
}

/// Clamp every pane in `panes` to its constraints and report splits whose
/// children's minimums cannot fit.
///
/// Clamped space is not redistributed to siblings; fixing the ratios is up
/// to the caller. Each violation is also logged at warn level.
pub fn apply_constraints(
    root: &PaneNode,
    outer: Bounds,
    divider_thickness: i32,
    panes: &mut BTreeMap<PaneId, Bounds>,
) -> ConstraintReport {
    let divider = i64::from(divider_thickness.max(0));
    let mut report = ConstraintReport::default();

    walk(root, outer, divider, &mut |visit| match visit {
        Visit::Split(split, bounds) => {
            let axis = split.orientation();
            let required = split_min_extent(split, axis, divider);
            let available = i64::from(axis.main_extent(&bounds));
            if required > available {
                tracing::warn!(
                    node_id = %split.node_id(),
                    orientation = axis.as_str(),
                    required,
                    available,
                    "minimum pane sizes exceed available space"
                );
                report.violations.push(ConstraintViolation {
                    node_id: split.node_id().clone(),
                    orientation: axis,
                    required: to_i32(required),
                    available: to_i32(available),
                });
            }
        }
        Visit::Leaf(leaf, _) => {
            let Some(bounds) = panes.get_mut(leaf.pane_id()) else {
                return;
            };
            let c = leaf.constraints();
            let clamped = Bounds::saturating(
                bounds.x(),
                bounds.y(),
                c.clamp_width(bounds.width()),
                c.clamp_height(bounds.height()),
            );
            if clamped != *bounds {
                report.clamped.push(ClampedPane {
                    pane_id: leaf.pane_id().clone(),
                    proportional: *bounds,
                    clamped,
                });
                *bounds = clamped;
            }
        }
        Visit::Divider(_) => {}
    });

    report
}

/// Solve panes, dividers, and constraints in one call.
///
/// `panes` holds the proportional partition; clamped rectangles are listed
/// in the constraint report.
#[must_use]
pub fn solve(root: &PaneNode, outer: Bounds, divider_thickness: i32) -> SolvedLayout {
    let panes = compute(root, outer, divider_thickness);
    let mut clamped = panes.clone();
    let constraints = apply_constraints(root, outer, divider_thickness, &mut clamped);
    SolvedLayout {
        outer,
        divider_thickness,
        panes,
        dividers: compute_dividers(root, outer, divider_thickness),
        constraints,
    }
}

impl PaneTree {
    /// Solve this tree; an empty tree yields an empty layout.
    #[must_use]
    pub fn solve(&self, outer: Bounds, divider_thickness: i32) -> SolvedLayout {
        match self.root() {
            Some(root) => solve(root, outer, divider_thickness),
            None => SolvedLayout::empty(outer, divider_thickness),
        }
    }
}
