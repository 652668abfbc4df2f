#![forbid(unsafe_code)]

//! Split-pane layout model.
//!
//! A layout is a tree of [`PaneNode`]s: leaves are visible panes, splits
//! divide their rectangle among two or more children along one axis.
//!
//! - [`tree`]: [`PaneTree`] with its pane/split registries, queries,
//!   structural validation, and edits.
//! - [`solver`]: pixel-exact pane and divider rectangles.
//! - [`reconcile`]: added/removed/moved/modified panes between two trees.
//! - [`document`]: the versioned JSON envelope.
//!
//! # Example
//!
//! ```
//! use paneweave_core::{Bounds, ContentId, NodeId, PaneId};
//! use paneweave_layout::{LeafNode, PaneTree, SplitPosition};
//!
//! let p1 = PaneId::new("p1").unwrap();
//! let mut tree = PaneTree::singleton(p1.clone(), ContentId::new("c1").unwrap());
//! tree.split_pane(
//!     &p1,
//!     LeafNode::new(PaneId::new("p2").unwrap(), ContentId::new("c2").unwrap()),
//!     SplitPosition::Right,
//!     0.5,
//!     NodeId::generate(),
//! )
//! .unwrap();
//!
//! let layout = tree.solve(Bounds::from_size(800, 600), 4);
//! assert_eq!(layout.pane_bounds(&p1), Bounds::new(0, 0, 398, 600).ok());
//! ```

pub mod document;
pub mod error;
pub mod node;
pub mod ratio;
pub mod reconcile;
pub mod solver;
pub mod tree;

pub use document::{LAYOUT_SCHEMA_MAJOR, LAYOUT_SCHEMA_VERSION, LayoutDocument};
pub use error::{EditError, ModelError, StructureViolation, ViolationCode};
pub use node::{Axis, ConstraintError, LeafNode, Orientation, PaneNode, SizeConstraints, SplitNode};
pub use ratio::{RATIO_TOLERANCE, RatioError, equal_ratios, normalize, validate_ratios};
pub use reconcile::{DiffResult, diff, diff_trees};
pub use solver::{
    ClampedPane, ConstraintReport, ConstraintViolation, DividerRect, SolvedLayout,
    apply_constraints, compute, compute_dividers, solve,
};
pub use tree::{PaneTree, Removal, SplitPosition};
