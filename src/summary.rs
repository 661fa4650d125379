//! Batch-level validation statistics

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::claim::ClaimType;
use crate::store::ClaimRef;

/// Outcome of validating one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Runs that were classified.
    pub runs_validated: usize,
    /// Claims written to a store.
    pub claims_promoted: usize,
    /// Claims a store refused.
    pub claims_failed: usize,
    /// Mean confidence, 0.0 for an empty batch.
    pub average_confidence: f64,
    /// Percentage change versus the historical baseline, 0.0 when unavailable.
    pub baseline_delta_pct: f64,
    /// Confidence of every classified run.
    pub confidence_scores: Vec<f64>,
    /// Classified runs per claim type.
    pub claims_by_type: FxHashMap<ClaimType, usize>,
}

impl ValidationSummary {
    /// Classified runs of one type.
    #[must_use]
    pub fn count_of(&self, claim_type: ClaimType) -> usize {
        self.claims_by_type.get(&claim_type).copied().unwrap_or(0)
    }
}

/// Summary plus references to every promoted claim, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Batch statistics.
    pub summary: ValidationSummary,
    /// Where each promoted claim landed.
    pub promoted: Vec<ClaimRef>,
    /// True if the batch was cancelled before every run was processed.
    pub cancelled: bool,
}

#[derive(Debug, Default)]
struct Tallies {
    confidence_scores: Vec<f64>,
    claims_by_type: FxHashMap<ClaimType, usize>,
    promoted: Vec<ClaimRef>,
}

/// Accumulates batch statistics; safe to share across worker threads.
///
/// Counters are atomics; the score list, type tally and claim references sit
/// behind one mutex.
#[derive(Debug, Default)]
pub struct SummaryAggregator {
    runs_validated: AtomicUsize,
    claims_promoted: AtomicUsize,
    claims_failed: AtomicUsize,
    tallies: Mutex<Tallies>,
}

impl SummaryAggregator {
    /// Create an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a classified run.
    pub fn record_classified(&self, claim_type: ClaimType, confidence: f64) {
        self.runs_validated.fetch_add(1, Ordering::Relaxed);
        let mut tallies = self.tallies.lock().unwrap_or_else(PoisonError::into_inner);
        tallies.confidence_scores.push(confidence);
        *tallies.claims_by_type.entry(claim_type).or_insert(0) += 1;
    }

    /// Record a successful promotion.
    pub fn record_promoted(&self, reference: ClaimRef) {
        self.claims_promoted.fetch_add(1, Ordering::Relaxed);
        self.tallies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .promoted
            .push(reference);
    }

    /// Record a refused promotion.
    pub fn record_failed(&self) {
        self.claims_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Produce the final report.
    #[must_use]
    pub fn finish(self, baseline_delta_pct: f64, cancelled: bool) -> BatchReport {
        let tallies = self
            .tallies
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        let average_confidence = if tallies.confidence_scores.is_empty() {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let n = tallies.confidence_scores.len() as f64;
            tallies.confidence_scores.iter().sum::<f64>() / n
        };

        BatchReport {
            summary: ValidationSummary {
                runs_validated: self.runs_validated.into_inner(),
                claims_promoted: self.claims_promoted.into_inner(),
                claims_failed: self.claims_failed.into_inner(),
                average_confidence,
                baseline_delta_pct,
                confidence_scores: tallies.confidence_scores,
                claims_by_type: tallies.claims_by_type,
            },
            promoted: tallies.promoted,
            cancelled,
        }
    }
}
