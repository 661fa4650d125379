//! Validator configuration
//!
//! Every field has a default, so an empty JSON object (or no file at all) is
//! a valid configuration.
//!
//! ```json
//! {
//!   "error_marker": "ERROR",
//!   "parallel": true,
//!   "store_dir": "claims/",
//!   "log_filter": "claimcheck=debug"
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classification::DEFAULT_ERROR_MARKER;
use crate::{Error, Result};

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Token counted in execution logs by the confidence scorer.
    pub error_marker: String,
    /// Classify runs on the rayon pool (needs the `parallel` feature).
    pub parallel: bool,
    /// Directory for the JSON Lines claim store; in-memory when unset.
    pub store_dir: Option<PathBuf>,
    /// Default `tracing` filter directive, overridden by `RUST_LOG`.
    pub log_filter: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            error_marker: DEFAULT_ERROR_MARKER.to_string(),
            parallel: false,
            store_dir: None,
            log_filter: "info".to_string(),
        }
    }
}

impl ValidatorConfig {
    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for malformed JSON, unknown fields or an
    /// empty error marker.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Check invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the error marker is blank.
    pub fn validate(&self) -> Result<()> {
        if self.error_marker.trim().is_empty() {
            return Err(Error::Config("error_marker must not be empty".to_string()));
        }
        Ok(())
    }
}
