//! Claim classification engine
//!
//! Turns one run (plus its confidence score) into one [`Verdict`]:
//!
//! ```text
//! ConfidenceScore ─► BaseClassification ─► MetadataQualityAdjuster ─► DomainClassifier ─┐
//!        │                                                                              ▼
//!        ├─► AnomalyAnalyzer ─────┐                                  ClassificationSynthesizer ─► Verdict
//!        ├─► ImprovementAnalyzer ─┼─────────────────────────────────────────────┘
//!        └─► PhenomenonAnalyzer ──┘
//! ```
//!
//! Every stage is a pure function of the run's [`RunEvidence`]. Nothing is
//! shared between runs, so batches can be classified in any order or in
//! parallel.
//!
//! ## Example
//!
//! ```rust
//! use claimcheck::claim::ClaimType;
//! use claimcheck::classification::{ClassificationPipeline, ConfidenceScore, RunEvidence};
//! use claimcheck::experiment::RunRecord;
//!
//! let run = RunRecord::new("run-7", "novel_breakthrough_test", true);
//! let evidence = RunEvidence::new(&run, None, ConfidenceScore::new(0.4));
//! let verdict = ClassificationPipeline::evaluate(&evidence);
//! assert_eq!(verdict.claim_type, ClaimType::NewPhenomenon);
//! ```

mod anomaly;
mod confidence;
mod domain;
mod improvement;
mod metadata_quality;
mod phenomenon;
mod signal;
mod synthesis;
mod trace;

pub use anomaly::{AnomalyAnalyzer, AnomalyCategory, AnomalySignal};
pub use confidence::{
    metadata_factor, ConfidenceBreakdown, ConfidenceScore, ConfidenceScorer, LogEvidence,
    DEFAULT_ERROR_MARKER,
};
pub use domain::{Domain, DomainClassifier};
pub use improvement::{ImprovementAnalyzer, ImprovementCategory};
pub use metadata_quality::{HypothesisQuality, MetadataQualityAdjuster, SourceControlQuality};
pub use phenomenon::{PhenomenonAnalyzer, PhenomenonCategory};
pub use signal::{AnalysisSignal, RuleHit};
pub use synthesis::{
    confidence_tier, Adjustments, ClassificationSynthesizer, Signals, ANOMALY_THRESHOLD,
    IMPROVEMENT_THRESHOLD, PHENOMENON_THRESHOLD,
};
pub use trace::{AuditTrail, Stage, TraceEvent};

use crate::claim::{BaseClassification, Verdict};
use crate::experiment::{RunRecord, SourceControl};

/// Everything the classification stages may look at for one run.
///
/// Keyword rules match case-insensitively, so the experiment and branch
/// names are lowered once here.
#[derive(Debug, Clone)]
pub struct RunEvidence<'a> {
    run: &'a RunRecord,
    source_control: Option<&'a SourceControl>,
    confidence: ConfidenceScore,
    name: String,
    branch: Option<String>,
    duration_secs: Option<f64>,
}

impl<'a> RunEvidence<'a> {
    /// Bundle a run with its resolved source-control context and confidence.
    #[must_use]
    pub fn new(
        run: &'a RunRecord,
        source_control: Option<&'a SourceControl>,
        confidence: ConfidenceScore,
    ) -> Self {
        Self {
            run,
            source_control,
            confidence,
            name: run.experiment_name().to_lowercase(),
            branch: source_control
                .and_then(SourceControl::branch)
                .map(str::to_lowercase),
            duration_secs: run.duration_secs(),
        }
    }

    /// The run being classified.
    #[must_use]
    pub const fn run(&self) -> &'a RunRecord {
        self.run
    }

    /// Resolved source-control context.
    #[must_use]
    pub const fn source_control(&self) -> Option<&'a SourceControl> {
        self.source_control
    }

    /// Confidence score of the run.
    #[must_use]
    pub const fn confidence(&self) -> ConfidenceScore {
        self.confidence
    }

    /// Whether the run succeeded.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.run.success()
    }

    /// Lower-cased experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower-cased branch name.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// Parsed duration in seconds.
    #[must_use]
    pub const fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }
}

/// Runs every classification stage in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassificationPipeline;

impl ClassificationPipeline {
    /// Classify with a fresh audit trail.
    #[must_use]
    pub fn evaluate(evidence: &RunEvidence<'_>) -> Verdict {
        let mut trail = AuditTrail::new();
        trail.record(Stage::Confidence, format!("confidence {}", evidence.confidence()));
        Self::evaluate_with_trail(evidence, trail)
    }

    /// Classify, appending to an existing audit trail.
    #[must_use]
    pub fn evaluate_with_trail(evidence: &RunEvidence<'_>, mut trail: AuditTrail) -> Verdict {
        let base = BaseClassification::from_confidence(evidence.confidence());
        trail.record(Stage::Confidence, format!("base classification {base}"));

        let signals = Self::collect_signals(evidence, &mut trail);

        let quality_adjusted = MetadataQualityAdjuster::adjust(base, evidence, &mut trail);
        let domain = Domain::infer(evidence.name());
        let adjusted = DomainClassifier::apply(domain, quality_adjusted, evidence, &mut trail);

        let adjustments = Adjustments {
            domain,
            base,
            adjusted,
        };
        ClassificationSynthesizer::synthesize(&signals, adjustments, evidence, trail)
    }

    /// Run the three independent analyzers.
    #[must_use]
    pub fn collect_signals(evidence: &RunEvidence<'_>, trail: &mut AuditTrail) -> Signals {
        let signals = Signals {
            anomaly: AnomalyAnalyzer::analyze(evidence),
            improvement: ImprovementAnalyzer::analyze(evidence),
            phenomenon: PhenomenonAnalyzer::analyze(evidence),
        };

        let expected = if signals.anomaly.expected { ", expected" } else { "" };
        trail.record(
            Stage::Anomaly,
            format!("{}{expected}", signals.anomaly.signal.describe()),
        );
        trail.record(Stage::Improvement, signals.improvement.describe());
        trail.record(Stage::Phenomenon, signals.phenomenon.describe());
        signals
    }
}
