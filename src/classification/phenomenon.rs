//! New-phenomenon detection

use serde::{Deserialize, Serialize};

use super::signal::{contains_any, AnalysisSignal};
use super::RunEvidence;

const NOVELTY_KEYWORDS: &[&str] = &["novel", "new", "innovative", "breakthrough"];
const EXPLORATORY_BRANCH_KEYWORDS: &[&str] = &["discovery", "exploration", "investigation"];
const EXCEPTIONAL_CONFIDENCE: f64 = 0.9;

/// Kind of phenomenon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhenomenonCategory {
    /// Named as novel work.
    ExperimentalBreakthrough,
    /// Found on an exploratory branch.
    BehavioralDiscovery,
}

/// Stateless novelty detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhenomenonAnalyzer;

impl PhenomenonAnalyzer {
    /// Evaluate the novelty rules.
    #[must_use]
    pub fn analyze(evidence: &RunEvidence<'_>) -> AnalysisSignal<PhenomenonCategory> {
        let mut signal = AnalysisSignal::new();

        if contains_any(evidence.name(), NOVELTY_KEYWORDS) {
            signal.push(
                "novel_experiment_indicator",
                0.6,
                Some(PhenomenonCategory::ExperimentalBreakthrough),
            );
        }
        if evidence.success() && evidence.confidence().value() > EXCEPTIONAL_CONFIDENCE {
            signal.push("exceptionally_high_confidence", 0.3, None);
        }
        if evidence
            .branch()
            .is_some_and(|branch| contains_any(branch, EXPLORATORY_BRANCH_KEYWORDS))
        {
            signal.push(
                "exploratory_branch",
                0.2,
                Some(PhenomenonCategory::BehavioralDiscovery),
            );
        }

        signal
    }
}
