//! Anomaly detection
//!
//! | Rule | Weight | Flag |
//! |------|--------|------|
//! | duration < 2s | +0.3 | `execution_too_fast` |
//! | duration > 15min | +0.4 | `execution_too_slow` |
//! | stress/load/boundary/edge experiment | +0.2 (expected) | `expected_stress_test` |
//! | experimental/prototype/research/spike branch | +0.15 (expected) | `experimental_branch` |
//! | success with confidence < 0.3 | +0.5 | `success_confidence_mismatch` |
//! | failure with confidence > 0.7 | +0.4 | `failure_confidence_mismatch` |

use serde::{Deserialize, Serialize};

use super::signal::{contains_any, AnalysisSignal};
use super::RunEvidence;

const TOO_FAST_SECS: f64 = 2.0;
const TOO_SLOW_SECS: f64 = 15.0 * 60.0;
const STRESS_KEYWORDS: &[&str] = &["stress", "load", "boundary", "edge"];
const EXPERIMENTAL_BRANCH_KEYWORDS: &[&str] = &["experimental", "prototype", "research", "spike"];
const LOW_CONFIDENCE: f64 = 0.3;
const HIGH_CONFIDENCE: f64 = 0.7;

/// What kind of anomaly a rule detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyCategory {
    /// Timing outside the sane window.
    Performance,
    /// Outcome disagrees with confidence.
    Behavioral,
}

/// Anomaly analyzer output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnomalySignal {
    /// Fired rules and unclamped score.
    pub signal: AnalysisSignal<AnomalyCategory>,
    /// True when the experiment's own setup explains the anomaly.
    pub expected: bool,
}

/// Stateless anomaly detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnomalyAnalyzer;

impl AnomalyAnalyzer {
    /// Evaluate every anomaly rule independently.
    #[must_use]
    pub fn analyze(evidence: &RunEvidence<'_>) -> AnomalySignal {
        let mut out = AnomalySignal::default();
        let signal = &mut out.signal;

        if let Some(secs) = evidence.duration_secs() {
            if secs < TOO_FAST_SECS {
                signal.push("execution_too_fast", 0.3, Some(AnomalyCategory::Performance));
            }
            if secs > TOO_SLOW_SECS {
                signal.push("execution_too_slow", 0.4, Some(AnomalyCategory::Performance));
            }
        }

        if contains_any(evidence.name(), STRESS_KEYWORDS) {
            out.expected = true;
            signal.push("expected_stress_test", 0.2, None);
        }

        if evidence
            .branch()
            .is_some_and(|branch| contains_any(branch, EXPERIMENTAL_BRANCH_KEYWORDS))
        {
            out.expected = true;
            signal.push("experimental_branch", 0.15, None);
        }

        let confidence = evidence.confidence().value();
        if evidence.success() && confidence < LOW_CONFIDENCE {
            signal.push("success_confidence_mismatch", 0.5, Some(AnomalyCategory::Behavioral));
        }
        if !evidence.success() && confidence > HIGH_CONFIDENCE {
            signal.push("failure_confidence_mismatch", 0.4, Some(AnomalyCategory::Behavioral));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::ConfidenceScore;
    use crate::experiment::RunRecord;

    fn analyze(run: &RunRecord, confidence: f64) -> AnomalySignal {
        let evidence = RunEvidence::new(run, run.source_control(), ConfidenceScore::new(confidence));
        AnomalyAnalyzer::analyze(&evidence)
    }

    #[test]
    fn test_quiet_run() {
        let run = RunRecord::builder("r", "cache_warmup", true).duration("30s").build();
        let out = analyze(&run, 0.8);
        assert!(out.signal.is_silent());
        assert!(!out.expected);
    }

    #[test]
    fn test_too_fast() {
        let run = RunRecord::builder("r", "cache_warmup", true).duration("1.5").build();
        let out = analyze(&run, 0.8);
        assert!((out.signal.score() - 0.3).abs() < 1e-12);
        assert_eq!(out.signal.dominant_category(), Some(AnomalyCategory::Performance));
        assert!(!out.expected);
    }

    #[test]
    fn test_too_slow_clock_notation() {
        let run = RunRecord::builder("r", "cache_warmup", true).duration("0:15:01").build();
        let out = analyze(&run, 0.8);
        assert_eq!(out.signal.flags().collect::<Vec<_>>(), ["execution_too_slow"]);
    }

    #[test]
    fn test_unparsable_duration_skips_timing_rules() {
        let run = RunRecord::builder("r", "cache_warmup", true).duration("quick").build();
        assert!(analyze(&run, 0.8).signal.is_silent());
    }

    #[test]
    fn test_expected_sources() {
        let run = RunRecord::builder("r", "Edge_Case_Sweep", true)
            .source_control("abc1234", "spike/new-cache")
            .build();
        let out = analyze(&run, 0.8);
        assert!(out.expected);
        assert!((out.signal.score() - 0.35).abs() < 1e-12);
        assert_eq!(out.signal.dominant_category(), None);
    }

    #[test]
    fn test_confidence_mismatch() {
        let ok = RunRecord::new("r", "x", true);
        let out = analyze(&ok, 0.25);
        assert_eq!(out.signal.flags().collect::<Vec<_>>(), ["success_confidence_mismatch"]);

        let failed = RunRecord::new("r", "x", false);
        let out = analyze(&failed, 0.75);
        assert_eq!(out.signal.flags().collect::<Vec<_>>(), ["failure_confidence_mismatch"]);
        assert!(analyze(&failed, 0.2).signal.is_silent());
    }

    #[test]
    fn test_scores_are_not_clamped() {
        let run = RunRecord::builder("r", "stress_load", true)
            .duration("0.5s")
            .source_control("abc1234", "research")
            .build();
        let out = analyze(&run, 0.1);
        // 0.3 + 0.2 + 0.15 + 0.5
        assert!((out.signal.score() - 1.15).abs() < 1e-12);
    }
}
