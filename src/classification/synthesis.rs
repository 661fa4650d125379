//! Final verdict synthesis
//!
//! Priority order, first match wins:
//!
//! 1. phenomenon score >= 0.5 → `new_phenomenon`
//! 2. improvement score >= 0.8 → `improvement`
//! 3. clamped anomaly score >= 0.3 → `anomaly`
//! 4. otherwise → the domain-adjusted classification
//!
//! The analyzer signals are read raw; only the anomaly score is clamped, and
//! only here.

use super::anomaly::AnomalySignal;
use super::domain::Domain;
use super::improvement::ImprovementCategory;
use super::phenomenon::PhenomenonCategory;
use super::signal::AnalysisSignal;
use super::trace::{AuditTrail, Stage};
use super::RunEvidence;
use crate::claim::{
    BaseClassification, BaselineDeviation, ClaimType, ClassificationMetadata, SecondaryType,
    Verdict,
};

/// Phenomenon score needed to claim a new phenomenon.
pub const PHENOMENON_THRESHOLD: f64 = 0.5;
/// Improvement score needed to claim an improvement.
pub const IMPROVEMENT_THRESHOLD: f64 = 0.8;
/// Clamped anomaly score needed to claim an anomaly.
pub const ANOMALY_THRESHOLD: f64 = 0.3;

/// The three analyzer outputs for one run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signals {
    /// Anomaly analyzer output.
    pub anomaly: AnomalySignal,
    /// Improvement analyzer output.
    pub improvement: AnalysisSignal<ImprovementCategory>,
    /// Phenomenon analyzer output.
    pub phenomenon: AnalysisSignal<PhenomenonCategory>,
}

/// Classification stages that precede synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjustments {
    /// Inferred domain.
    pub domain: Domain,
    /// Threshold-only classification.
    pub base: BaseClassification,
    /// Classification after metadata-quality and domain rules.
    pub adjusted: BaseClassification,
}

/// Confidence tier flag. Exactly one per claim.
#[must_use]
pub fn confidence_tier(confidence: f64) -> &'static str {
    if confidence >= 0.9 {
        "very_high_confidence"
    } else if confidence >= 0.75 {
        "high_confidence"
    } else if confidence >= 0.5 {
        "moderate_confidence"
    } else {
        "low_confidence"
    }
}

/// Merges the signals into one verdict.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassificationSynthesizer;

impl ClassificationSynthesizer {
    /// Pick the final claim type and build its metadata.
    #[must_use]
    pub fn synthesize(
        signals: &Signals,
        adjustments: Adjustments,
        evidence: &RunEvidence<'_>,
        mut trail: AuditTrail,
    ) -> Verdict {
        let confidence = evidence.confidence().value();
        let phenomenon_score = signals.phenomenon.score();
        let improvement_score = signals.improvement.score();
        let anomaly_score = signals.anomaly.signal.score().clamp(0.0, 1.0);

        let mut flags = vec![
            confidence_tier(confidence).to_string(),
            if evidence.success() {
                "successful_execution"
            } else {
                "failed_execution"
            }
            .to_string(),
        ];

        let (claim_type, secondary_type, reason) = if phenomenon_score >= PHENOMENON_THRESHOLD {
            flags.extend(signals.phenomenon.flags().map(str::to_string));
            (
                ClaimType::NewPhenomenon,
                signals.phenomenon.dominant_category().map(SecondaryType::from),
                format!(
                    "phenomenon score {phenomenon_score:.2} >= {PHENOMENON_THRESHOLD:.2} threshold"
                ),
            )
        } else if improvement_score >= IMPROVEMENT_THRESHOLD {
            flags.extend(signals.improvement.flags().map(str::to_string));
            (
                ClaimType::Improvement,
                signals.improvement.dominant_category().map(SecondaryType::from),
                format!(
                    "improvement score {improvement_score:.2} >= {IMPROVEMENT_THRESHOLD:.2} threshold"
                ),
            )
        } else if anomaly_score >= ANOMALY_THRESHOLD {
            flags.extend(signals.anomaly.signal.flags().map(str::to_string));
            let secondary = if signals.anomaly.expected {
                SecondaryType::Expected
            } else {
                SecondaryType::Unexpected
            };
            (
                ClaimType::Anomaly,
                Some(secondary),
                format!(
                    "anomaly score {anomaly_score:.2} >= {ANOMALY_THRESHOLD:.2} threshold ({})",
                    if signals.anomaly.expected { "expected" } else { "unexpected" }
                ),
            )
        } else {
            (
                ClaimType::from(adjustments.adjusted),
                None,
                format!(
                    "no signal over threshold; {} domain classification at confidence {confidence:.2}",
                    adjustments.domain
                ),
            )
        };

        note_category_overlap(&signals.improvement, Stage::Improvement, &mut trail);
        note_category_overlap(&signals.phenomenon, Stage::Phenomenon, &mut trail);
        trail.record(Stage::Synthesis, format!("{claim_type}: {reason}"));

        Verdict {
            claim_type,
            metadata: ClassificationMetadata {
                primary_type: claim_type,
                secondary_type,
                anomaly_score,
                flags,
                reason,
                trend_significance: improvement_score.clamp(0.0, 1.0),
                baseline_deviation: BaselineDeviation::from(
                    signals.anomaly.signal.dominant_category(),
                ),
                expected_anomaly: signals.anomaly.expected,
                phenomenon_subtype: signals.phenomenon.dominant_category(),
                domain: adjustments.domain,
                base_classification: adjustments.base,
                adjusted_classification: adjustments.adjusted,
                trail: trail.into_events(),
            },
        }
    }
}

/// Record when the reported category differs from the last keyword matched.
fn note_category_overlap<C>(signal: &AnalysisSignal<C>, stage: Stage, trail: &mut AuditTrail)
where
    C: Copy + PartialEq + std::fmt::Debug,
{
    let (dominant, last) = (signal.dominant_category(), signal.last_category());
    if dominant != last {
        trail.record(
            stage,
            format!("overlapping categories: reporting {dominant:?}, last matched {last:?}"),
        );
    }
}
