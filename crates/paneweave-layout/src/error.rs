use std::fmt;

use paneweave_core::{NodeId, PaneId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::ConstraintError;
use crate::ratio::RatioError;

/// Stable code for a structural finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    /// Ratio count differs from child count.
    RatioCountMismatch,
    /// A ratio is not positive, or the ratios do not sum to one.
    InvalidRatios,
    /// A split holds fewer than two children.
    UnderfilledSplit,
    /// A leaf carries an empty pane id or content reference.
    EmptyIdentifier,
    /// A child's back reference does not name its owning split.
    ParentMismatch,
    /// The same pane id appears on more than one leaf.
    DuplicatePaneId,
    /// The same split id appears on more than one split.
    DuplicateNodeId,
    /// The pane or split index disagrees with the tree.
    RegistryOutOfSync,
    /// A leaf's size constraints are contradictory.
    InvalidConstraints,
    /// Focus names a pane that is not in the tree.
    DanglingFocus,
}

impl ViolationCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RatioCountMismatch => "ratio_count_mismatch",
            Self::InvalidRatios => "invalid_ratios",
            Self::UnderfilledSplit => "underfilled_split",
            Self::EmptyIdentifier => "empty_identifier",
            Self::ParentMismatch => "parent_mismatch",
            Self::DuplicatePaneId => "duplicate_pane_id",
            Self::DuplicateNodeId => "duplicate_node_id",
            Self::RegistryOutOfSync => "registry_out_of_sync",
            Self::InvalidConstraints => "invalid_constraints",
            Self::DanglingFocus => "dangling_focus",
        }
    }
}

/// One broken invariant, as reported by [`crate::PaneTree::validate_structure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureViolation {
    pub code: ViolationCode,
    /// Pane or split identifier the finding is attached to, if any.
    pub subject: Option<String>,
    pub message: String,
}

impl StructureViolation {
    pub(crate) fn new(
        code: ViolationCode,
        subject: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            subject: subject.map(str::to_owned),
            message: message.into(),
        }
    }
}

impl fmt::Display for StructureViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subject {
            Some(subject) => write!(f, "[{}] {subject}: {}", self.code.as_str(), self.message),
            None => write!(f, "[{}] {}", self.code.as_str(), self.message),
        }
    }
}

fn summarize(violations: &[StructureViolation]) -> String {
    match violations {
        [] => "no findings".to_owned(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}

/// Failure loading or storing a layout document.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unsupported layout schema version {found:?}; this build reads major version {supported}")]
    UnsupportedSchemaVersion { found: String, supported: u32 },
    #[error("malformed layout schema version {0:?}")]
    MalformedSchemaVersion(String),
    #[error("layout failed structural validation: {}", summarize(.violations))]
    InvalidStructure { violations: Vec<StructureViolation> },
    #[error("layout json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A tree edit was refused; the tree was left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("pane {pane_id} not found")]
    PaneNotFound { pane_id: PaneId },
    #[error("split node {node_id} not found")]
    NodeNotFound { node_id: NodeId },
    #[error("pane {pane_id} is the root and has no parent to hold a sibling")]
    RootHasNoParent { pane_id: PaneId },
    #[error("pane {pane_id} already exists")]
    DuplicatePane { pane_id: PaneId },
    #[error("split node {node_id} already exists")]
    DuplicateNode { node_id: NodeId },
    #[error("split ratio must lie strictly between 0 and 1, got {ratio}")]
    SplitRatioOutOfRange { ratio: f64 },
    #[error("invalid ratios for {node_id}: {source}")]
    InvalidRatios {
        node_id: NodeId,
        #[source]
        source: RatioError,
    },
    #[error("invalid constraints for {pane_id}: {source}")]
    InvalidConstraints {
        pane_id: PaneId,
        #[source]
        source: ConstraintError,
    },
}

impl EditError {
    /// Whether the edit referenced an identifier absent from the tree.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::PaneNotFound { .. } | Self::NodeNotFound { .. })
    }
}
