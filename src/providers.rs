//! External collaborators
//!
//! The engine never reaches out on its own. Logs, source-control context and
//! baseline metrics come from injected providers, so tests can swap in
//! fixed answers and the engine stays free of process or filesystem
//! side-effects.
//!
//! | Trait | Stock implementations |
//! |-------|-----------------------|
//! | [`LogReader`] | [`NoLogReader`], [`FsLogReader`] |
//! | [`SourceControlProvider`] | [`RecordedSourceControl`], [`StaticSourceControl`], [`GitCliSourceControl`] |
//! | [`BaselineComparator`] | [`MetricBaseline`] |

use std::path::PathBuf;
use std::process::Command;

use crate::experiment::{mean_for_key, MetricSample, RunRecord, SourceControl};
use crate::{Error, Result};

/// Supplies the textual execution log of a run.
pub trait LogReader: Send + Sync {
    /// Read the log of `run`.
    ///
    /// Returns `Ok(None)` when the run has no log source at all.
    ///
    /// # Errors
    ///
    /// Returns an error when a log source exists but cannot be read.
    fn read_log(&self, run: &RunRecord) -> Result<Option<String>>;
}

/// Log reader for runners that keep no logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLogReader;

impl LogReader for NoLogReader {
    fn read_log(&self, _run: &RunRecord) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Reads the file named by [`RunRecord::log_path`], optionally relative to a root.
#[derive(Debug, Clone, Default)]
pub struct FsLogReader {
    root: Option<PathBuf>,
}

impl FsLogReader {
    /// Resolve log paths as given.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative log paths against `root`.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }
}

impl LogReader for FsLogReader {
    fn read_log(&self, run: &RunRecord) -> Result<Option<String>> {
        let Some(path) = run.log_path() else {
            return Ok(None);
        };
        let path = match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        };
        Ok(Some(std::fs::read_to_string(path)?))
    }
}

/// Supplies source-control context for runs that did not record their own.
///
/// Asked whenever the run's recorded context lacks a commit or a branch.
/// Recorded fields win; the provider only fills the missing ones.
pub trait SourceControlProvider: Send + Sync {
    /// Context for `run`, `None` when unknown.
    fn context(&self, run: &RunRecord) -> Option<SourceControl>;
}

/// Uses only what the run itself recorded.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordedSourceControl;

impl SourceControlProvider for RecordedSourceControl {
    fn context(&self, run: &RunRecord) -> Option<SourceControl> {
        run.source_control().cloned()
    }
}

/// Same context for every run (e.g. a whole batch executed from one checkout).
#[derive(Debug, Clone)]
pub struct StaticSourceControl {
    context: SourceControl,
}

impl StaticSourceControl {
    /// Answer every query with `context`.
    #[must_use]
    pub const fn new(context: SourceControl) -> Self {
        Self { context }
    }
}

impl SourceControlProvider for StaticSourceControl {
    fn context(&self, _run: &RunRecord) -> Option<SourceControl> {
        Some(self.context.clone())
    }
}

/// Asks the `git` binary about the checkout at `repo_dir`.
///
/// Any failure (no git, not a repository, detached state without a commit)
/// degrades to an absent commit or branch.
#[derive(Debug, Clone)]
pub struct GitCliSourceControl {
    repo_dir: PathBuf,
}

impl GitCliSourceControl {
    /// Query the repository at `repo_dir`.
    #[must_use]
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    fn rev_parse(&self, args: &[&str]) -> Option<String> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_dir)
            .arg("rev-parse")
            .args(args)
            .output();

        match output {
            Ok(out) if out.status.success() => {
                let text = String::from_utf8_lossy(&out.stdout).trim().to_string();
                (!text.is_empty()).then_some(text)
            }
            Ok(out) => {
                tracing::debug!(
                    repo = %self.repo_dir.display(),
                    status = %out.status,
                    "git rev-parse failed"
                );
                None
            }
            Err(err) => {
                tracing::debug!(repo = %self.repo_dir.display(), error = %err, "git unavailable");
                None
            }
        }
    }
}

impl SourceControlProvider for GitCliSourceControl {
    fn context(&self, _run: &RunRecord) -> Option<SourceControl> {
        let commit = self.rev_parse(&["HEAD"]);
        // "HEAD" here means detached; there is no branch to report.
        let branch = self
            .rev_parse(&["--abbrev-ref", "HEAD"])
            .filter(|b| b != "HEAD");
        if commit.is_none() && branch.is_none() {
            return None;
        }
        Some(SourceControl::new(commit, branch))
    }
}

/// Compares the current batch against historical metrics.
pub trait BaselineComparator: Send + Sync {
    /// Percentage change of current metrics versus the baseline.
    ///
    /// # Errors
    ///
    /// Returns an error when no meaningful comparison can be made.
    fn delta_percent(&self) -> Result<f64>;
}

/// Baseline comparison over the mean of one metric.
///
/// `delta = (mean(current) - mean(baseline)) / |mean(baseline)| * 100`
#[derive(Debug, Clone)]
pub struct MetricBaseline {
    key: String,
    baseline: Vec<MetricSample>,
    current: Vec<MetricSample>,
}

impl MetricBaseline {
    /// Compare `current` against `baseline` on metric `key`.
    #[must_use]
    pub fn new(key: impl Into<String>, baseline: Vec<MetricSample>, current: Vec<MetricSample>) -> Self {
        Self {
            key: key.into(),
            baseline,
            current,
        }
    }

    /// Metric key being compared.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl BaselineComparator for MetricBaseline {
    fn delta_percent(&self) -> Result<f64> {
        let baseline = mean_for_key(&self.baseline, &self.key)
            .ok_or_else(|| Error::Baseline(format!("no historical samples for '{}'", self.key)))?;
        let current = mean_for_key(&self.current, &self.key)
            .ok_or_else(|| Error::Baseline(format!("no current samples for '{}'", self.key)))?;

        if baseline == 0.0 {
            return Err(Error::Baseline(format!(
                "baseline mean for '{}' is zero",
                self.key
            )));
        }
        Ok((current - baseline) / baseline.abs() * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "claimcheck-providers-{name}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_no_log_reader() {
        let run = RunRecord::new("r", "x", true);
        assert!(NoLogReader.read_log(&run).unwrap().is_none());
    }

    #[test]
    fn test_fs_log_reader() {
        let dir = scratch_dir("fs-log");
        std::fs::write(dir.join("run.log"), "ok\nERROR boom\n").unwrap();

        let run = RunRecord::builder("r", "x", true).log_path("run.log").build();
        let text = FsLogReader::with_root(&dir).read_log(&run).unwrap().unwrap();
        assert!(text.contains("ERROR"));

        let missing = RunRecord::builder("r", "x", true).log_path("missing.log").build();
        assert!(FsLogReader::with_root(&dir).read_log(&missing).is_err());

        let no_log = RunRecord::new("r", "x", true);
        assert!(FsLogReader::new().read_log(&no_log).unwrap().is_none());

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_recorded_and_static_source_control() {
        let run = RunRecord::builder("r", "x", true)
            .source_control("abc1234", "feature/x")
            .build();
        assert_eq!(
            RecordedSourceControl.context(&run).unwrap().branch(),
            Some("feature/x")
        );
        assert!(RecordedSourceControl
            .context(&RunRecord::new("r", "x", true))
            .is_none());

        let fixed = StaticSourceControl::new(SourceControl::new(Some("def5678"), Some("main")));
        assert_eq!(fixed.context(&run).unwrap().commit(), Some("def5678"));
    }

    #[test]
    fn test_git_cli_outside_repository() {
        let dir = scratch_dir("not-a-repo");
        // Either git is missing or the directory is not a repository: both degrade.
        let provider = GitCliSourceControl::new(&dir);
        let context = provider.context(&RunRecord::new("r", "x", true));
        if let Some(ctx) = context {
            // temp_dir may itself live inside a checkout on some machines
            assert!(ctx.commit().is_some() || ctx.branch().is_some());
        }
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_metric_baseline_delta() {
        let baseline = vec![
            MetricSample::new("h1", "throughput", 100.0),
            MetricSample::new("h2", "throughput", 100.0),
        ];
        let current = vec![MetricSample::new("c1", "throughput", 110.0)];
        let delta = MetricBaseline::new("throughput", baseline, current)
            .delta_percent()
            .unwrap();
        assert!((delta - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_metric_baseline_errors() {
        let empty = MetricBaseline::new("throughput", vec![], vec![]);
        assert!(matches!(empty.delta_percent(), Err(Error::Baseline(_))));

        let zero = MetricBaseline::new(
            "throughput",
            vec![MetricSample::new("h", "throughput", 0.0)],
            vec![MetricSample::new("c", "throughput", 5.0)],
        );
        assert!(matches!(zero.delta_percent(), Err(Error::Baseline(_))));
    }
}
