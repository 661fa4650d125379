//! Confidence scoring
//!
//! `score = clamp(base * consistency * metadata_factor, 0.05, 0.95)`
//!
//! - `base`: 0.8 for a successful run, 0.2 otherwise
//! - `consistency`: `max(0.1, 1 - 0.1 * error_markers)` from the log text,
//!   0.8 if the log could not be read, 1.0 if there is no log at all
//! - `metadata_factor`: 1.0, times 0.9 without a hypothesis id, 0.95 without
//!   a commit id and 0.95 without a branch name

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::experiment::{RunRecord, SourceControl};

/// Default token counted in execution logs.
pub const DEFAULT_ERROR_MARKER: &str = "ERROR";

const SUCCESS_BASE: f64 = 0.8;
const FAILURE_BASE: f64 = 0.2;
const PENALTY_PER_ERROR: f64 = 0.1;
const MIN_CONSISTENCY: f64 = 0.1;
const UNREADABLE_LOG_CONSISTENCY: f64 = 0.8;
const MISSING_HYPOTHESIS_FACTOR: f64 = 0.9;
const MISSING_COMMIT_FACTOR: f64 = 0.95;
const MISSING_BRANCH_FACTOR: f64 = 0.95;

/// Trust estimate for one run, always within `[0.05, 0.95]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct ConfidenceScore(f64);

impl ConfidenceScore {
    /// Lower bound.
    pub const MIN: f64 = 0.05;
    /// Upper bound.
    pub const MAX: f64 = 0.95;

    /// Clamp `value` into `[MIN, MAX]`. NaN maps to `MIN`.
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(Self::MIN);
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    /// Get the raw value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for ConfidenceScore {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<ConfidenceScore> for f64 {
    fn from(score: ConfidenceScore) -> Self {
        score.0
    }
}

impl fmt::Display for ConfidenceScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

/// What the log reader produced for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvidence {
    /// The run has no log source.
    Absent,
    /// A log source exists but could not be read.
    Unreadable,
    /// Log contents.
    Text(String),
}

/// Intermediate factors of a confidence computation, kept for the audit trail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceBreakdown {
    /// Outcome-driven base.
    pub base: f64,
    /// Log consistency factor.
    pub consistency: f64,
    /// Metadata completeness factor.
    pub metadata_factor: f64,
    /// Final clamped score.
    pub score: ConfidenceScore,
}

impl fmt::Display for ConfidenceBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "confidence {} = base {:.2} x consistency {:.2} x metadata {:.4}",
            self.score, self.base, self.consistency, self.metadata_factor
        )
    }
}

/// Computes the bounded confidence score of a run.
#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    error_marker: String,
}

impl ConfidenceScorer {
    /// Create a scorer counting `error_marker` occurrences in logs.
    #[must_use]
    pub fn new(error_marker: impl Into<String>) -> Self {
        Self {
            error_marker: error_marker.into(),
        }
    }

    /// Get the counted log marker.
    #[must_use]
    pub fn error_marker(&self) -> &str {
        &self.error_marker
    }

    /// Score a run. Pure: same inputs, same score.
    #[must_use]
    pub fn score(
        &self,
        run: &RunRecord,
        log: &LogEvidence,
        source_control: Option<&SourceControl>,
    ) -> ConfidenceScore {
        self.assess(run, log, source_control).score
    }

    /// Score a run and keep the individual factors.
    #[must_use]
    pub fn assess(
        &self,
        run: &RunRecord,
        log: &LogEvidence,
        source_control: Option<&SourceControl>,
    ) -> ConfidenceBreakdown {
        let base = if run.success() { SUCCESS_BASE } else { FAILURE_BASE };
        let consistency = self.consistency(log);
        let metadata_factor = metadata_factor(run, source_control);

        ConfidenceBreakdown {
            base,
            consistency,
            metadata_factor,
            score: ConfidenceScore::new(base * consistency * metadata_factor),
        }
    }

    /// Log consistency factor.
    #[must_use]
    pub fn consistency(&self, log: &LogEvidence) -> f64 {
        match log {
            LogEvidence::Absent => 1.0,
            LogEvidence::Unreadable => UNREADABLE_LOG_CONSISTENCY,
            LogEvidence::Text(text) => {
                #[allow(clippy::cast_precision_loss)]
                let errors = self.count_markers(text) as f64;
                (1.0 - errors * PENALTY_PER_ERROR).max(MIN_CONSISTENCY)
            }
        }
    }

    fn count_markers(&self, text: &str) -> usize {
        if self.error_marker.is_empty() {
            return 0;
        }
        text.matches(self.error_marker.as_str()).count()
    }
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_MARKER)
    }
}

/// Metadata completeness factor.
#[must_use]
pub fn metadata_factor(run: &RunRecord, source_control: Option<&SourceControl>) -> f64 {
    let mut factor = 1.0;
    if run.hypothesis_id().is_none() {
        factor *= MISSING_HYPOTHESIS_FACTOR;
    }
    if source_control.and_then(SourceControl::commit).is_none() {
        factor *= MISSING_COMMIT_FACTOR;
    }
    if source_control.and_then(SourceControl::branch).is_none() {
        factor *= MISSING_BRANCH_FACTOR;
    }
    factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_run(success: bool) -> RunRecord {
        RunRecord::builder("run-1", "cache_warmup", success)
            .hypothesis_id("hyp-1")
            .source_control("abc1234", "feature/x")
            .build()
    }

    #[test]
    fn test_confidence_clamped() {
        assert!((ConfidenceScore::new(2.0).value() - 0.95).abs() < f64::EPSILON);
        assert!((ConfidenceScore::new(-1.0).value() - 0.05).abs() < f64::EPSILON);
        assert!((ConfidenceScore::new(f64::NAN).value() - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn test_complete_success_without_log() {
        let run = complete_run(true);
        let score = ConfidenceScorer::default().score(&run, &LogEvidence::Absent, run.source_control());
        assert!((score.value() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_error_markers_reduce_consistency() {
        let scorer = ConfidenceScorer::default();
        let log = LogEvidence::Text("ERROR a\nok\nERROR b\nERROR c".to_string());
        assert!((scorer.consistency(&log) - 0.7).abs() < 1e-12);

        let flooded = LogEvidence::Text("ERROR ".repeat(50));
        assert!((scorer.consistency(&flooded) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_unreadable_log() {
        let scorer = ConfidenceScorer::default();
        assert!((scorer.consistency(&LogEvidence::Unreadable) - 0.8).abs() < f64::EPSILON);
        let run = complete_run(true);
        let score = scorer.score(&run, &LogEvidence::Unreadable, run.source_control());
        assert!((score.value() - 0.64).abs() < 1e-12);
    }

    #[test]
    fn test_metadata_penalties() {
        let bare = RunRecord::new("run-1", "x", true);
        let expected = 0.9 * 0.95 * 0.95;
        assert!((metadata_factor(&bare, None) - expected).abs() < 1e-12);

        let partial = SourceControl::new(Some("abc1234"), None::<String>);
        assert!((metadata_factor(&bare, Some(&partial)) - 0.9 * 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_failure_floor() {
        let run = RunRecord::new("run-1", "x", false);
        let log = LogEvidence::Text("ERROR ".repeat(20));
        let score = ConfidenceScorer::default().score(&run, &log, None);
        assert!((score.value() - ConfidenceScore::MIN).abs() < f64::EPSILON);
    }

    #[test]
    fn test_custom_marker() {
        let scorer = ConfidenceScorer::new("FATAL");
        let log = LogEvidence::Text("ERROR FATAL".to_string());
        assert!((scorer.consistency(&log) - 0.9).abs() < 1e-12);
        assert_eq!(scorer.error_marker(), "FATAL");

        let empty = ConfidenceScorer::new("");
        assert!((empty.consistency(&log) - 1.0).abs() < f64::EPSILON);
    }
}
