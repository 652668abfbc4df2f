use paneweave_layout::{EditError, ModelError, StructureViolation};
use thiserror::Error;

/// Why a command did not apply.
///
/// `NotFound` and `InvalidArgument` are expected outcomes the caller can
/// report and move on from; in both cases the tree is untouched.
/// `Structural` means an edit produced a tree that breaks an invariant. That
/// is a bug in the edit, not in the caller's input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("command {description:?} was already executed")]
    AlreadyExecuted { description: String },
    #[error("command {description:?} has not been executed")]
    NotExecuted { description: String },
    #[error("command {description:?} broke tree structure: {}", first_violation(.violations))]
    Structural {
        description: String,
        violations: Vec<StructureViolation>,
    },
}

fn first_violation(violations: &[StructureViolation]) -> String {
    violations
        .first()
        .map_or_else(|| "unknown violation".to_owned(), ToString::to_string)
}

impl CommandError {
    /// Whether the caller can shrug this off (the tree is unchanged and
    /// still sound).
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Structural { .. })
    }
}

impl From<EditError> for CommandError {
    fn from(err: EditError) -> Self {
        match err {
            EditError::PaneNotFound { pane_id } => Self::NotFound {
                kind: "pane",
                id: pane_id.into(),
            },
            EditError::NodeNotFound { node_id } => Self::NotFound {
                kind: "split node",
                id: node_id.into(),
            },
            other => Self::InvalidArgument(other.to_string()),
        }
    }
}

/// Controller-level failure.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("no transaction is open")]
    NoTransaction,
    #[error("not allowed while {depth} transaction(s) are open")]
    TransactionOpen { depth: usize },
    #[error("transaction has a pending rollback; commit or roll it back first")]
    RollbackPending,
    #[error("transaction {label:?} was rolled back")]
    RolledBack { label: String },
    #[error("failed to load layout: {0}")]
    Load(#[from] ModelError),
}
