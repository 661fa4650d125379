//! Analyzer signals
//!
//! Each analyzer rule that fires contributes a [`RuleHit`]: a flag, a score
//! weight and optionally a category. The signal score is the plain sum of the
//! weights. Nothing is clamped here; the synthesizer clamps the anomaly score
//! once, at the end.

use std::fmt::Write as _;

/// One fired analyzer rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleHit<C> {
    /// Flag copied into the claim when this signal decides the verdict.
    pub flag: &'static str,
    /// Contribution to the signal score.
    pub weight: f64,
    /// Category this rule argues for, if any.
    pub category: Option<C>,
}

/// Scored output of one analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSignal<C> {
    score: f64,
    hits: Vec<RuleHit<C>>,
}

impl<C: Copy> AnalysisSignal<C> {
    /// Create a silent signal (score 0, no hits).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0.0,
            hits: Vec::new(),
        }
    }

    /// Record a fired rule.
    pub fn push(&mut self, flag: &'static str, weight: f64, category: Option<C>) {
        self.score += weight;
        self.hits.push(RuleHit {
            flag,
            weight,
            category,
        });
    }

    /// Accumulated, unclamped score.
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }

    /// Fired rules in evaluation order.
    #[must_use]
    pub fn hits(&self) -> &[RuleHit<C>] {
        &self.hits
    }

    /// Flags of the fired rules in evaluation order.
    pub fn flags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.hits.iter().map(|hit| hit.flag)
    }

    /// True when no rule fired.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.hits.is_empty()
    }

    /// Category of the categorised rule with the largest weight.
    ///
    /// Ties go to the rule evaluated first. This is the category reported
    /// on the claim.
    #[must_use]
    pub fn dominant_category(&self) -> Option<C> {
        let mut best: Option<&RuleHit<C>> = None;
        for hit in self.hits.iter().filter(|h| h.category.is_some()) {
            if best.map_or(true, |b| hit.weight > b.weight) {
                best = Some(hit);
            }
        }
        best.and_then(|hit| hit.category)
    }

    /// Category of the last categorised rule (overwrite-in-order semantics).
    #[must_use]
    pub fn last_category(&self) -> Option<C> {
        self.hits.iter().rev().find_map(|hit| hit.category)
    }

    /// One-line summary for the audit trail.
    #[must_use]
    pub fn describe(&self) -> String {
        if self.hits.is_empty() {
            return "score 0.00, no rule fired".to_string();
        }
        let mut out = format!("score {:.2} from", self.score);
        for hit in &self.hits {
            let _ = write!(out, " {}(+{:.2})", hit.flag, hit.weight);
        }
        out
    }
}

impl<C: Copy> Default for AnalysisSignal<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// True if `haystack` contains any of `needles`.
#[must_use]
pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
