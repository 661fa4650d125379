//! Loading a batch of run records from JSON

use std::path::Path;

use super::RunRecord;
use crate::{Error, Result};

/// Parse a JSON array of run records.
///
/// # Errors
///
/// Returns [`Error::Serialization`] for malformed JSON and
/// [`Error::InvalidInput`] if a record has a blank run id or experiment name.
///
/// # Examples
///
/// ```rust
/// use claimcheck::experiment::parse_run_batch;
///
/// let runs = parse_run_batch(r#"[
///     {"run_id": "run-1", "experiment_name": "cache_warmup", "success": true,
///      "source_control": {"commit": "3f2a9c1", "branch": "feature/cache"}},
///     {"run_id": "run-2", "experiment_name": "cache_warmup", "success": false}
/// ]"#)?;
/// assert_eq!(runs.len(), 2);
/// # Ok::<(), claimcheck::Error>(())
/// ```
pub fn parse_run_batch(json: &str) -> Result<Vec<RunRecord>> {
    let runs: Vec<RunRecord> = serde_json::from_str(json)?;
    for (index, run) in runs.iter().enumerate() {
        if run.run_id().trim().is_empty() {
            return Err(Error::InvalidInput(format!("run #{index} has a blank run_id")));
        }
        if run.experiment_name().trim().is_empty() {
            return Err(Error::InvalidInput(format!(
                "run '{}' has a blank experiment_name",
                run.run_id()
            )));
        }
    }
    Ok(runs)
}

/// Read and parse a JSON batch file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails [`parse_run_batch`].
pub fn load_run_batch(path: impl AsRef<Path>) -> Result<Vec<RunRecord>> {
    parse_run_batch(&std::fs::read_to_string(path)?)
}
