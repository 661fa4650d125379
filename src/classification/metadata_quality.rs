//! Metadata-quality adjustment
//!
//! Nudges the threshold classification using execution timing, source-control
//! hygiene and the shape of the hypothesis id. Rules run in a fixed order and
//! each sees the result of the previous one.

use super::trace::{AuditTrail, Stage};
use super::RunEvidence;
use crate::claim::BaseClassification;
use crate::experiment::SourceControl;

const SUSPICIOUSLY_FAST_SECS: f64 = 5.0;
const SUSPICIOUSLY_SLOW_SECS: f64 = 30.0 * 60.0;
const HIGH_QUALITY_UPGRADE_CONFIDENCE: f64 = 0.65;
const HYPOTHESIS_UPGRADE_CONFIDENCE: f64 = 0.6;
const MIN_COMMIT_LEN: usize = 7;
const TRUNK_BRANCHES: &[&str] = &["main", "master"];
const HYPOTHESIS_KEYWORD_PAIRS: &[(&str, &str)] = &[
    ("performance", "improvement"),
    ("user_experience", "enhancement"),
    ("efficiency", "optimization"),
];
const HYPOTHESIS_SEPARATORS: &[char] = &['-', '_', '.', ':', '/'];

/// Source-control hygiene of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceControlQuality {
    /// Commit and feature branch present, full-length commit id.
    High,
    /// Commit and feature branch present, but an abbreviated commit id.
    Adequate,
    /// Commit or branch missing, or run straight from a trunk branch.
    Poor,
}

impl SourceControlQuality {
    /// Grade a (possibly missing) source-control context.
    #[must_use]
    pub fn assess(context: Option<&SourceControl>) -> Self {
        let commit = context.and_then(SourceControl::commit);
        let branch = context.and_then(SourceControl::branch);
        let (Some(commit), Some(branch)) = (commit, branch) else {
            return Self::Poor;
        };

        let branch = branch.trim().to_lowercase();
        if TRUNK_BRANCHES.contains(&branch.as_str()) {
            Self::Poor
        } else if commit.trim().len() >= MIN_COMMIT_LEN {
            Self::High
        } else {
            Self::Adequate
        }
    }
}

/// How informative a hypothesis id looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HypothesisQuality {
    /// Descriptive id.
    High,
    /// Nothing notable.
    Medium,
    /// Placeholder-like id.
    Low,
}

impl HypothesisQuality {
    /// Grade a hypothesis id. High-quality patterns are checked first.
    #[must_use]
    pub fn assess(hypothesis_id: &str) -> Self {
        let id = hypothesis_id.trim().to_lowercase();

        let descriptive = HYPOTHESIS_KEYWORD_PAIRS
            .iter()
            .any(|(a, b)| id.contains(a) && id.contains(b));
        if descriptive || (id.chars().count() > 20 && id.contains(HYPOTHESIS_SEPARATORS)) {
            return Self::High;
        }

        if id.chars().count() < 5
            || id == "test"
            || id == "experiment"
            || id.starts_with("tmp")
            || id.starts_with("debug")
        {
            return Self::Low;
        }

        Self::Medium
    }
}

/// Applies the metadata-quality rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataQualityAdjuster;

impl MetadataQualityAdjuster {
    /// Adjust `base`, recording every change in `trail`.
    #[must_use]
    pub fn adjust(
        base: BaseClassification,
        evidence: &RunEvidence<'_>,
        trail: &mut AuditTrail,
    ) -> BaseClassification {
        use BaseClassification::{Hypothesis, Regression, Validated};

        let mut current = base;
        let confidence = evidence.confidence().value();
        let mut change = |to: BaseClassification, why: &str, current: &mut BaseClassification| {
            if *current != to {
                trail.record(Stage::MetadataQuality, format!("{current} -> {to}: {why}"));
            }
            *current = to;
        };

        if evidence.success() {
            if let Some(secs) = evidence.duration_secs() {
                if secs < SUSPICIOUSLY_FAST_SECS && current == Validated {
                    change(Hypothesis, "successful run finished in under 5s", &mut current);
                }
                if secs > SUSPICIOUSLY_SLOW_SECS && current != Regression {
                    change(Hypothesis, "successful run took over 30min", &mut current);
                }
            }
        }

        match SourceControlQuality::assess(evidence.source_control()) {
            SourceControlQuality::High
                if current == Hypothesis && confidence >= HIGH_QUALITY_UPGRADE_CONFIDENCE =>
            {
                change(Validated, "high-quality source-control context", &mut current);
            }
            SourceControlQuality::Poor if current == Validated => {
                change(Hypothesis, "poor source-control context", &mut current);
            }
            _ => {}
        }

        if let Some(id) = evidence.run().hypothesis_id() {
            match HypothesisQuality::assess(id) {
                HypothesisQuality::High
                    if current == Hypothesis && confidence >= HYPOTHESIS_UPGRADE_CONFIDENCE =>
                {
                    change(Validated, "descriptive hypothesis id", &mut current);
                }
                HypothesisQuality::Low if current == Validated => {
                    change(Hypothesis, "placeholder hypothesis id", &mut current);
                }
                _ => {}
            }
        }

        if current == base {
            trail.record(Stage::MetadataQuality, format!("{base} unchanged"));
        }
        current
    }
}
