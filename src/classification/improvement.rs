//! Improvement detection

use serde::{Deserialize, Serialize};

use super::signal::{contains_any, AnalysisSignal};
use super::RunEvidence;

const HIGH_CONFIDENCE: f64 = 0.8;
const PERFORMANCE_KEYWORDS: &[&str] = &["optimization", "performance", "efficiency", "speed"];
const EXPERIENCE_KEYWORDS: &[&str] = &["ui", "ux", "usability", "experience"];

/// Kind of improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementCategory {
    /// Faster or leaner.
    Performance,
    /// Nicer to use.
    UserExperience,
}

/// Stateless improvement detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImprovementAnalyzer;

impl ImprovementAnalyzer {
    /// A successful run at confidence >= 0.8 scores its confidence; keyword
    /// matches on the experiment name add 0.1 each.
    #[must_use]
    pub fn analyze(evidence: &RunEvidence<'_>) -> AnalysisSignal<ImprovementCategory> {
        let mut signal = AnalysisSignal::new();
        let confidence = evidence.confidence().value();

        if evidence.success() && confidence >= HIGH_CONFIDENCE {
            signal.push("high_confidence_success", confidence, None);
        }
        if contains_any(evidence.name(), PERFORMANCE_KEYWORDS) {
            signal.push(
                "performance_optimization",
                0.1,
                Some(ImprovementCategory::Performance),
            );
        }
        if contains_any(evidence.name(), EXPERIENCE_KEYWORDS) {
            signal.push(
                "user_experience_enhancement",
                0.1,
                Some(ImprovementCategory::UserExperience),
            );
        }

        signal
    }
}
