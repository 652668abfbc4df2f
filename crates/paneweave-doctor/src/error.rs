use std::path::PathBuf;

use paneweave_layout::{ModelError, StructureViolation};
use paneweave_runtime::{ConfigError, ControllerError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DoctorError>;

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("{path}: {} structural violation(s), first: {}", .violations.len(), first(.violations))]
    Invalid {
        path: PathBuf,
        violations: Vec<StructureViolation>,
    },

    #[error("command {index} ({description}) failed: {source}")]
    Replay {
        index: usize,
        description: String,
        #[source]
        source: ControllerError,
    },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

fn first(violations: &[StructureViolation]) -> String {
    violations
        .first()
        .map_or_else(|| "none".to_owned(), ToString::to_string)
}

impl DoctorError {
    /// 2 for documents that load but are unsound, 1 for everything else.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Invalid { .. } => 2,
            Self::Model {
                source: ModelError::InvalidStructure { .. },
                ..
            } => 2,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DoctorError;

    #[test]
    fn invalid_argument_exits_with_one() {
        let error = DoctorError::invalid("width must be positive");
        assert_eq!(error.exit_code(), 1);
        assert_eq!(error.to_string(), "invalid argument: width must be positive");
    }

    #[test]
    fn structural_problems_exit_with_two() {
        let error = DoctorError::Invalid {
            path: "layout.json".into(),
            violations: Vec::new(),
        };
        assert_eq!(error.exit_code(), 2);
        assert!(error.to_string().contains("first: none"));
    }
}
