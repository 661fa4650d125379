//! Run Record - one finished execution of an experiment

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::duration::parse_duration_secs;

/// Source-control context a run was executed from.
///
/// Both halves are optional; blank strings count as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceControl {
    #[serde(default)]
    commit: Option<String>,
    #[serde(default)]
    branch: Option<String>,
}

impl SourceControl {
    /// Create a context from an optional commit id and branch name.
    #[must_use]
    pub fn new(commit: Option<impl Into<String>>, branch: Option<impl Into<String>>) -> Self {
        Self {
            commit: commit.map(Into::into),
            branch: branch.map(Into::into),
        }
    }

    /// Get the commit id, if present and non-blank.
    #[must_use]
    pub fn commit(&self) -> Option<&str> {
        non_blank(self.commit.as_deref())
    }

    /// Get the branch name, if present and non-blank.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        non_blank(self.branch.as_deref())
    }

    /// Whether both the commit and the branch are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.commit().is_some() && self.branch().is_some()
    }

    /// Fill whichever half is absent from `fallback`.
    #[must_use]
    pub fn fill_from(self, fallback: Self) -> Self {
        let has_commit = self.commit().is_some();
        let has_branch = self.branch().is_some();
        let commit = if has_commit { self.commit } else { fallback.commit };
        let branch = if has_branch { self.branch } else { fallback.branch };
        Self { commit, branch }
    }
}

/// Run Record represents a single completed execution of an experiment,
/// as handed over by the execution provider.
///
/// Every field other than the run id, experiment name and success flag is
/// optional. Missing metadata never fails classification; it only switches
/// the corresponding scoring rule to its "absent" behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunRecord {
    run_id: String,
    experiment_name: String,
    #[serde(default)]
    hypothesis_id: Option<String>,
    success: bool,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    source_control: Option<SourceControl>,
    #[serde(default)]
    log_path: Option<PathBuf>,
}

impl RunRecord {
    /// Create a run record with only the required fields.
    ///
    /// # Arguments
    ///
    /// * `run_id` - Unique identifier for the run
    /// * `experiment_name` - Name of the experiment that was executed
    /// * `success` - Whether the run reported success
    #[must_use]
    pub fn new(run_id: impl Into<String>, experiment_name: impl Into<String>, success: bool) -> Self {
        Self {
            run_id: run_id.into(),
            experiment_name: experiment_name.into(),
            hypothesis_id: None,
            success,
            duration: None,
            source_control: None,
            log_path: None,
        }
    }

    /// Create a builder for constructing a run record with optional fields.
    #[must_use]
    pub fn builder(
        run_id: impl Into<String>,
        experiment_name: impl Into<String>,
        success: bool,
    ) -> RunRecordBuilder {
        RunRecordBuilder::new(run_id, experiment_name, success)
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the experiment name.
    #[must_use]
    pub fn experiment_name(&self) -> &str {
        &self.experiment_name
    }

    /// Get the hypothesis ID, if present and non-blank.
    #[must_use]
    pub fn hypothesis_id(&self) -> Option<&str> {
        non_blank(self.hypothesis_id.as_deref())
    }

    /// Whether the run reported success.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.success
    }

    /// Get the raw duration string as reported by the runner.
    #[must_use]
    pub fn duration(&self) -> Option<&str> {
        non_blank(self.duration.as_deref())
    }

    /// Get the parsed duration in seconds.
    ///
    /// `None` when the duration is absent or cannot be parsed.
    #[must_use]
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration().and_then(parse_duration_secs)
    }

    /// Get the source-control context recorded with the run, if any.
    #[must_use]
    pub const fn source_control(&self) -> Option<&SourceControl> {
        self.source_control.as_ref()
    }

    /// Get the path of the execution log, if the runner kept one.
    #[must_use]
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }
}

/// Builder for `RunRecord`.
#[derive(Debug)]
pub struct RunRecordBuilder {
    record: RunRecord,
}

impl RunRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(run_id: impl Into<String>, experiment_name: impl Into<String>, success: bool) -> Self {
        Self {
            record: RunRecord::new(run_id, experiment_name, success),
        }
    }

    /// Set the hypothesis ID the run was testing.
    #[must_use]
    pub fn hypothesis_id(mut self, hypothesis_id: impl Into<String>) -> Self {
        self.record.hypothesis_id = Some(hypothesis_id.into());
        self
    }

    /// Set the free-form execution duration (`"12s"`, `"12"`, `"0:00:12"`).
    #[must_use]
    pub fn duration(mut self, duration: impl Into<String>) -> Self {
        self.record.duration = Some(duration.into());
        self
    }

    /// Set the commit id and branch name.
    #[must_use]
    pub fn source_control(mut self, commit: impl Into<String>, branch: impl Into<String>) -> Self {
        self.record.source_control = Some(SourceControl::new(Some(commit), Some(branch)));
        self
    }

    /// Set an already assembled (possibly partial) source-control context.
    #[must_use]
    pub fn source_control_context(mut self, context: SourceControl) -> Self {
        self.record.source_control = Some(context);
        self
    }

    /// Set the path of the execution log.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.record.log_path = Some(path.into());
        self
    }

    /// Build the `RunRecord`.
    #[must_use]
    pub fn build(self) -> RunRecord {
        self.record
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_record_new() {
        let run = RunRecord::new("run-1", "cache_warmup", true);
        assert_eq!(run.run_id(), "run-1");
        assert_eq!(run.experiment_name(), "cache_warmup");
        assert!(run.success());
        assert!(run.hypothesis_id().is_none());
        assert!(run.source_control().is_none());
        assert!(run.duration_secs().is_none());
    }

    #[test]
    fn test_run_record_builder() {
        let run = RunRecord::builder("run-2", "cache_warmup", false)
            .hypothesis_id("hyp-cache-42")
            .duration("90s")
            .source_control("abc1234", "feature/cache")
            .log_path("/tmp/run-2.log")
            .build();

        assert_eq!(run.hypothesis_id(), Some("hyp-cache-42"));
        assert_eq!(run.duration_secs(), Some(90.0));
        let scm = run.source_control().unwrap();
        assert_eq!(scm.commit(), Some("abc1234"));
        assert_eq!(scm.branch(), Some("feature/cache"));
        assert_eq!(run.log_path(), Some(Path::new("/tmp/run-2.log")));
    }

    #[test]
    fn test_blank_metadata_is_absent() {
        let run = RunRecord::builder("run-3", "x", true)
            .hypothesis_id("  ")
            .source_control_context(SourceControl::new(Some(""), None::<String>))
            .build();

        assert!(run.hypothesis_id().is_none());
        assert!(run.source_control().unwrap().commit().is_none());
        assert!(run.source_control().unwrap().branch().is_none());
    }

    #[test]
    fn test_run_record_from_partial_json() {
        let run: RunRecord =
            serde_json::from_str(r#"{"run_id":"r","experiment_name":"e","success":true}"#)
                .unwrap();
        assert!(run.success());
        assert!(run.duration().is_none());
    }

    #[test]
    fn test_fill_from_keeps_recorded_fields() {
        let partial = SourceControl::new(Some("abc1234"), Some("  "));
        assert!(!partial.is_complete());

        let merged = partial.fill_from(SourceControl::new(Some("def5678"), Some("feature/x")));
        assert!(merged.is_complete());
        assert_eq!(merged.commit(), Some("abc1234"));
        assert_eq!(merged.branch(), Some("feature/x"));
    }
}
