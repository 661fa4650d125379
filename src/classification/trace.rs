//! Audit trail of a classification
//!
//! Every stage of the pipeline appends what it saw and what it changed.
//! The trail travels with the claim, so "why was this an anomaly?" is
//! answered by the claim itself rather than by scraping logs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pipeline stage that emitted an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Confidence scoring and base classification.
    Confidence,
    /// Anomaly analyzer.
    Anomaly,
    /// Improvement analyzer.
    Improvement,
    /// Phenomenon analyzer.
    Phenomenon,
    /// Metadata-quality adjustment.
    MetadataQuality,
    /// Domain thresholds.
    Domain,
    /// Final priority synthesis.
    Synthesis,
}

/// One audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Emitting stage.
    pub stage: Stage,
    /// What happened.
    pub detail: String,
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.stage, self.detail)
    }
}

/// Ordered collection of [`TraceEvent`]s, passed by `&mut` through the stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditTrail {
    events: Vec<TraceEvent>,
}

impl AuditTrail {
    /// Create an empty trail.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn record(&mut self, stage: Stage, detail: impl Into<String>) {
        self.events.push(TraceEvent {
            stage,
            detail: detail.into(),
        });
    }

    /// Events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Events emitted by one stage.
    pub fn for_stage(&self, stage: Stage) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter().filter(move |e| e.stage == stage)
    }

    /// Consume the trail.
    #[must_use]
    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_preserves_order() {
        let mut trail = AuditTrail::new();
        trail.record(Stage::Confidence, "first");
        trail.record(Stage::Domain, "second");
        trail.record(Stage::Confidence, "third");

        let details: Vec<&str> = trail.events().iter().map(|e| e.detail.as_str()).collect();
        assert_eq!(details, ["first", "second", "third"]);
        assert_eq!(trail.for_stage(Stage::Confidence).count(), 2);
        assert_eq!(trail.into_events().len(), 3);
    }

    #[test]
    fn test_event_display() {
        let event = TraceEvent {
            stage: Stage::Synthesis,
            detail: "anomaly".to_string(),
        };
        assert_eq!(event.to_string(), "[Synthesis] anomaly");
    }
}
