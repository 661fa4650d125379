//! Claims - the immutable verdicts produced for each validated run

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classification::{
    AnomalyCategory, ConfidenceScore, Domain, ImprovementCategory, PhenomenonCategory,
    TraceEvent,
};
use crate::experiment::RunRecord;

/// Hypothesis id recorded on claims whose run did not carry one.
pub const UNKNOWN_HYPOTHESIS: &str = "unknown";

/// Final verdict for a run. Exactly one per claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    /// Outcome is trustworthy and confirms the hypothesis.
    Validated,
    /// Outcome is plausible but not yet trustworthy.
    Hypothesis,
    /// Outcome indicates a regression.
    Regression,
    /// Run behaved unlike what was expected.
    Anomaly,
    /// Run shows a clear improvement.
    Improvement,
    /// Run points at something not seen before.
    NewPhenomenon,
}

impl ClaimType {
    /// Every claim type, in promotion-store order.
    pub const ALL: [Self; 6] = [
        Self::Validated,
        Self::Hypothesis,
        Self::Regression,
        Self::Anomaly,
        Self::Improvement,
        Self::NewPhenomenon,
    ];

    /// Stable `snake_case` label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validated => "validated",
            Self::Hypothesis => "hypothesis",
            Self::Regression => "regression",
            Self::Anomaly => "anomaly",
            Self::Improvement => "improvement",
            Self::NewPhenomenon => "new_phenomenon",
        }
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold-derived classification before any signal is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseClassification {
    /// Confidence >= 0.75
    Validated,
    /// 0.5 <= confidence < 0.75
    Hypothesis,
    /// Confidence < 0.5
    Regression,
}

impl BaseClassification {
    /// Classify purely from the confidence thresholds.
    #[must_use]
    pub fn from_confidence(confidence: ConfidenceScore) -> Self {
        let value = confidence.value();
        if value >= 0.75 {
            Self::Validated
        } else if value >= 0.5 {
            Self::Hypothesis
        } else {
            Self::Regression
        }
    }
}

impl From<BaseClassification> for ClaimType {
    fn from(base: BaseClassification) -> Self {
        match base {
            BaseClassification::Validated => Self::Validated,
            BaseClassification::Hypothesis => Self::Hypothesis,
            BaseClassification::Regression => Self::Regression,
        }
    }
}

impl fmt::Display for BaseClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ClaimType::from(*self).fmt(f)
    }
}

/// Refinement of the final claim type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryType {
    /// Anomaly explained by the experiment's own setup (stress test, experimental branch).
    Expected,
    /// Anomaly with no known explanation.
    Unexpected,
    /// Performance-flavoured improvement.
    Performance,
    /// User-experience improvement.
    UserExperience,
    /// Novel experiment produced a new phenomenon.
    ExperimentalBreakthrough,
    /// Exploratory work surfaced a new behaviour.
    BehavioralDiscovery,
}

impl From<ImprovementCategory> for SecondaryType {
    fn from(category: ImprovementCategory) -> Self {
        match category {
            ImprovementCategory::Performance => Self::Performance,
            ImprovementCategory::UserExperience => Self::UserExperience,
        }
    }
}

impl From<PhenomenonCategory> for SecondaryType {
    fn from(category: PhenomenonCategory) -> Self {
        match category {
            PhenomenonCategory::ExperimentalBreakthrough => Self::ExperimentalBreakthrough,
            PhenomenonCategory::BehavioralDiscovery => Self::BehavioralDiscovery,
        }
    }
}

/// How the batch compared against historical metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineStatus {
    /// No comparator was configured (or the claim was classified standalone).
    NotCompared,
    /// A comparator was configured but failed.
    Unavailable,
    /// Current metrics are above the baseline.
    AboveBaseline,
    /// Current metrics are below the baseline.
    BelowBaseline,
    /// Current metrics match the baseline.
    AtBaseline,
}

impl BaselineStatus {
    /// Status for a successfully computed delta percentage.
    #[must_use]
    pub fn from_delta(delta_pct: f64) -> Self {
        if delta_pct > 0.0 {
            Self::AboveBaseline
        } else if delta_pct < 0.0 {
            Self::BelowBaseline
        } else {
            Self::AtBaseline
        }
    }
}

/// Which kind of deviation the anomaly signal points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineDeviation {
    /// No categorised anomaly rule fired.
    WithinRange,
    /// Timing outside the expected window.
    PerformanceDeviation,
    /// Outcome disagrees with confidence.
    BehavioralDeviation,
}

impl From<Option<AnomalyCategory>> for BaselineDeviation {
    fn from(category: Option<AnomalyCategory>) -> Self {
        match category {
            None => Self::WithinRange,
            Some(AnomalyCategory::Performance) => Self::PerformanceDeviation,
            Some(AnomalyCategory::Behavioral) => Self::BehavioralDeviation,
        }
    }
}

/// Everything the synthesizer knows about why a verdict was reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetadata {
    /// Final claim type.
    pub primary_type: ClaimType,
    /// Refinement taken from the signal that decided the verdict.
    pub secondary_type: Option<SecondaryType>,
    /// Anomaly score, clamped to `[0, 1]`.
    pub anomaly_score: f64,
    /// Confidence tier, outcome, then the flags of the deciding branch.
    pub flags: Vec<String>,
    /// Human-readable explanation.
    pub reason: String,
    /// Improvement signal strength, clamped to `[0, 1]`.
    pub trend_significance: f64,
    /// Kind of deviation reported by the anomaly signal.
    pub baseline_deviation: BaselineDeviation,
    /// Whether the anomaly was explained by the experiment's setup.
    pub expected_anomaly: bool,
    /// Phenomenon category, if any phenomenon rule carried one.
    pub phenomenon_subtype: Option<PhenomenonCategory>,
    /// Domain inferred from the experiment name.
    pub domain: Domain,
    /// Threshold-only classification.
    pub base_classification: BaseClassification,
    /// Classification after metadata-quality and domain adjustments.
    pub adjusted_classification: BaseClassification,
    /// Ordered audit trail of every stage.
    pub trail: Vec<TraceEvent>,
}

/// Output of the classification pipeline for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// Final claim type.
    pub claim_type: ClaimType,
    /// Supporting metadata.
    pub metadata: ClassificationMetadata,
}

/// An immutable, auditable verdict about one experiment run.
///
/// Claims are never edited. Re-validating a run produces a new claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    run_id: String,
    experiment_name: String,
    hypothesis_id: String,
    confidence: ConfidenceScore,
    claim_type: ClaimType,
    validated_at: DateTime<Utc>,
    success: bool,
    baseline_status: BaselineStatus,
    metadata: ClassificationMetadata,
}

impl Claim {
    /// Assemble a claim from a run and its verdict.
    #[must_use]
    pub fn new(
        run: &RunRecord,
        confidence: ConfidenceScore,
        verdict: Verdict,
        validated_at: DateTime<Utc>,
        baseline_status: BaselineStatus,
    ) -> Self {
        Self {
            run_id: run.run_id().to_string(),
            experiment_name: run.experiment_name().to_string(),
            hypothesis_id: run.hypothesis_id().unwrap_or(UNKNOWN_HYPOTHESIS).to_string(),
            confidence,
            claim_type: verdict.claim_type,
            validated_at,
            success: run.success(),
            baseline_status,
            metadata: verdict.metadata,
        }
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

    /// Get the hypothesis ID (`"unknown"` when the run had none).
    #[must_use]
    pub fn hypothesis_id(&self) -> &str {
        &self.hypothesis_id
    }

    /// Get the confidence score.
    #[must_use]
    pub const fn confidence(&self) -> ConfidenceScore {
        self.confidence
    }

    /// Get the claim type.
    #[must_use]
    pub const fn claim_type(&self) -> ClaimType {
        self.claim_type
    }

    /// Get the validation timestamp.
    #[must_use]
    pub const fn validated_at(&self) -> DateTime<Utc> {
        self.validated_at
    }

    /// Whether the underlying run succeeded.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.success
    }

    /// Get the baseline comparison status.
    #[must_use]
    pub const fn baseline_status(&self) -> BaselineStatus {
        self.baseline_status
    }

    /// Get the classification metadata.
    #[must_use]
    pub const fn metadata(&self) -> &ClassificationMetadata {
        &self.metadata
    }
}
