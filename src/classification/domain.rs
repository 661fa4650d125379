//! Domain inference and domain-specific thresholds

use std::fmt;

use serde::{Deserialize, Serialize};

use super::signal::contains_any;
use super::trace::{AuditTrail, Stage};
use super::RunEvidence;
use crate::claim::BaseClassification;

/// Coarse area an experiment belongs to, inferred from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// performance / benchmark / speed
    Performance,
    /// ui / interface / ux / frontend
    UserInterface,
    /// integration / api / service
    Integration,
    /// security / auth / permission
    Security,
    /// data / processing / analytics
    DataProcessing,
    /// Anything else.
    General,
}

/// Keyword table, checked top to bottom. First match wins.
const DOMAIN_KEYWORDS: &[(Domain, &[&str])] = &[
    (Domain::Performance, &["performance", "benchmark", "speed"]),
    (Domain::UserInterface, &["ui", "interface", "ux", "frontend"]),
    (Domain::Integration, &["integration", "api", "service"]),
    (Domain::Security, &["security", "auth", "permission"]),
    (Domain::DataProcessing, &["data", "processing", "analytics"]),
];

impl Domain {
    /// Infer the domain from an experiment name (case-insensitive).
    #[must_use]
    pub fn infer(experiment_name: &str) -> Self {
        let name = experiment_name.to_lowercase();
        DOMAIN_KEYWORDS
            .iter()
            .find(|(_, keywords)| contains_any(&name, keywords))
            .map_or(Self::General, |(domain, _)| *domain)
    }

    /// Stable `snake_case` label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::UserInterface => "user_interface",
            Self::Integration => "integration",
            Self::Security => "security",
            Self::DataProcessing => "data_processing",
            Self::General => "general",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Applies the per-domain confidence thresholds.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainClassifier;

impl DomainClassifier {
    /// Re-classify `current` under the thresholds of `domain`.
    #[must_use]
    pub fn apply(
        domain: Domain,
        current: BaseClassification,
        evidence: &RunEvidence<'_>,
        trail: &mut AuditTrail,
    ) -> BaseClassification {
        use BaseClassification::{Hypothesis, Regression, Validated};

        let confidence = evidence.confidence().value();
        let (next, why) = match domain {
            Domain::Performance if current == Validated && confidence < 0.8 => {
                (Hypothesis, "performance claims need confidence >= 0.80")
            }
            Domain::UserInterface if current == Hypothesis && confidence >= 0.7 => {
                (Validated, "user-interface claims validate at confidence >= 0.70")
            }
            Domain::Integration if evidence.success() && confidence >= 0.6 => {
                (Validated, "successful integration at confidence >= 0.60")
            }
            Domain::Integration if !evidence.success() => {
                (Regression, "failed integration run")
            }
            Domain::Security if current == Validated && confidence < 0.85 => {
                (Hypothesis, "security claims need confidence >= 0.85")
            }
            Domain::DataProcessing if current == Validated && confidence < 0.75 => {
                (Hypothesis, "data-processing claims need confidence >= 0.75")
            }
            _ => (current, "no domain threshold applies"),
        };

        if next == current {
            trail.record(Stage::Domain, format!("{domain}: {current} kept ({why})"));
        } else {
            trail.record(Stage::Domain, format!("{domain}: {current} -> {next} ({why})"));
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::ConfidenceScore;
    use crate::experiment::RunRecord;

    fn apply(name: &str, success: bool, current: BaseClassification, confidence: f64) -> BaseClassification {
        let run = RunRecord::new("r", name, success);
        let evidence = RunEvidence::new(&run, None, ConfidenceScore::new(confidence));
        let mut trail = AuditTrail::new();
        DomainClassifier::apply(Domain::infer(name), current, &evidence, &mut trail)
    }

    #[test]
    fn test_infer() {
        assert_eq!(Domain::infer("performance_benchmark_v2"), Domain::Performance);
        assert_eq!(Domain::infer("Frontend_Redesign"), Domain::UserInterface);
        assert_eq!(Domain::infer("payments_api_contract"), Domain::Integration);
        assert_eq!(Domain::infer("oauth_rotation"), Domain::Security);
        assert_eq!(Domain::infer("nightly_analytics"), Domain::DataProcessing);
        assert_eq!(Domain::infer("cache_warmup"), Domain::General);
    }

    #[test]
    fn test_first_matching_domain_wins() {
        assert_eq!(Domain::infer("api_speed"), Domain::Performance);
    }

    #[test]
    fn test_performance_threshold() {
        use BaseClassification::*;
        assert_eq!(apply("speed_run", true, Validated, 0.79), Hypothesis);
        assert_eq!(apply("speed_run", true, Validated, 0.8), Validated);
        assert_eq!(apply("speed_run", true, Hypothesis, 0.7), Hypothesis);
    }

    #[test]
    fn test_user_interface_upgrade() {
        use BaseClassification::*;
        assert_eq!(apply("ux_polish", true, Hypothesis, 0.7), Validated);
        assert_eq!(apply("ux_polish", true, Hypothesis, 0.69), Hypothesis);
    }

    #[test]
    fn test_integration_overrides() {
        use BaseClassification::*;
        assert_eq!(apply("api_contract", true, Regression, 0.6), Validated);
        assert_eq!(apply("api_contract", false, Validated, 0.9), Regression);
        assert_eq!(apply("api_contract", true, Regression, 0.55), Regression);
    }

    #[test]
    fn test_security_and_data_thresholds() {
        use BaseClassification::*;
        assert_eq!(apply("auth_hardening", true, Validated, 0.84), Hypothesis);
        assert_eq!(apply("auth_hardening", true, Validated, 0.85), Validated);
        assert_eq!(apply("data_pipeline", true, Validated, 0.74), Hypothesis);
        assert_eq!(apply("data_pipeline", true, Validated, 0.75), Validated);
    }

    #[test]
    fn test_general_unchanged() {
        use BaseClassification::*;
        assert_eq!(apply("cache_warmup", false, Regression, 0.2), Regression);
        assert_eq!(apply("cache_warmup", true, Validated, 0.6), Validated);
    }
}
