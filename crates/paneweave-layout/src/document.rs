//! Persisted form of a pane tree.
//!
//! ```json
//! {
//!   "root": { "type": "split", "node_id": "...", "orientation": "horizontal",
//!             "ratios": [0.5, 0.5], "children": [ ... ] },
//!   "focused_pane_id": "pane_...",
//!   "schema_version": "1.0"
//! }
//! ```
//!
//! Loading rejects documents whose major schema version differs from
//! [`LAYOUT_SCHEMA_MAJOR`] and re-validates the tree before accepting it.

use paneweave_core::PaneId;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::node::PaneNode;
use crate::tree::PaneTree;

/// Major schema version this build reads and writes.
pub const LAYOUT_SCHEMA_MAJOR: u32 = 1;
/// Full schema version written into new documents.
pub const LAYOUT_SCHEMA_VERSION: &str = "1.0";

/// Serialized envelope around a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub root: Option<PaneNode>,
    #[serde(default)]
    pub focused_pane_id: Option<PaneId>,
    pub schema_version: String,
}

impl LayoutDocument {
    /// Parse and check the schema major version.
    pub fn schema_major(&self) -> Result<u32, ModelError> {
        let major = self
            .schema_version
            .split('.')
            .next()
            .unwrap_or_default()
            .trim();
        major
            .parse::<u32>()
            .map_err(|_| ModelError::MalformedSchemaVersion(self.schema_version.clone()))
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl PaneTree {
    /// Snapshot the tree into a document.
    #[must_use]
    pub fn to_document(&self) -> LayoutDocument {
        LayoutDocument {
            root: self.root().cloned(),
            focused_pane_id: self.focused().cloned(),
            schema_version: LAYOUT_SCHEMA_VERSION.to_owned(),
        }
    }

    /// Rebuild a tree from a document.
    ///
    /// A focus naming a pane that is not in the tree is dropped with a
    /// warning rather than failing the load.
    pub fn from_document(document: LayoutDocument) -> Result<Self, ModelError> {
        let major = document.schema_major()?;
        if major != LAYOUT_SCHEMA_MAJOR {
            return Err(ModelError::UnsupportedSchemaVersion {
                found: document.schema_version,
                supported: LAYOUT_SCHEMA_MAJOR,
            });
        }

        let mut tree = Self::empty();
        tree.install(document.root, None);
        let violations = tree.validate_structure();
        if !violations.is_empty() {
            return Err(ModelError::InvalidStructure { violations });
        }

        if let Some(focus) = document.focused_pane_id
            && tree.set_focus(&focus).is_err()
        {
            tracing::warn!(
                pane_id = %focus,
                "dropping focus on unknown pane while loading layout"
            );
        }
        Ok(tree)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        self.to_document().to_json()
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Self::from_document(LayoutDocument::from_json(json)?)
    }
}
