//! Engine configuration.
//!
//! ```toml
//! # paneweave.toml
//! max_history = 200
//! divider_thickness = 6
//! default_split_ratio = 0.5
//! ```
//!
//! Missing keys fall back to [`EngineConfig::default`]. Loading does not
//! validate; call [`EngineConfig::validate`] or use [`EngineConfig::load`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunables for [`crate::LayoutController`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Undo entries kept before the oldest is evicted.
    pub max_history: usize,
    /// Divider thickness in pixels used when solving geometry.
    pub divider_thickness: i32,
    /// Share kept by the target pane when splitting without an explicit
    /// ratio.
    pub default_split_ratio: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_history: 100,
            divider_thickness: 4,
            default_split_ratio: 0.5,
        }
    }
}

impl EngineConfig {
    /// Load from a TOML string.
    #[cfg(feature = "toml-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "toml-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Load a file by extension (`.json`, otherwise TOML) and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_file(path)?
        } else {
            Self::load_toml(path)?
        };
        let problems = config.validate();
        if problems.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(problems))
        }
    }

    #[cfg(feature = "toml-config")]
    fn load_toml(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    #[cfg(not(feature = "toml-config"))]
    fn load_toml(path: &Path) -> Result<Self, ConfigError> {
        Err(ConfigError::UnsupportedFormat(path.display().to_string()))
    }

    /// Check every field; an empty list means the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.max_history == 0 {
            errors.push("max_history must be at least 1".to_owned());
        }
        if self.divider_thickness < 0 {
            errors.push(format!(
                "divider_thickness must be non-negative, got {}",
                self.divider_thickness
            ));
        }
        let ratio = self.default_split_ratio;
        if !(ratio.is_finite() && ratio > 0.0 && ratio < 1.0) {
            errors.push(format!(
                "default_split_ratio must lie strictly between 0 and 1, got {ratio}"
            ));
        }
        errors
    }
}

/// Failure loading an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "toml-config")]
    #[error("TOML parse error: {0}")]
    Toml(toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(serde_json::Error),
    #[cfg(not(feature = "toml-config"))]
    #[error("TOML support is disabled, cannot read {0}")]
    UnsupportedFormat(String),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
