//! Metric Sample - a single metric observation used for baseline comparison

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metric Sample represents one observed value of a named metric.
///
/// Samples are grouped by `key` when comparing the current batch against
/// historical runs; `run_id` only ties a sample back to its origin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricSample {
    run_id: String,
    key: String,
    value: f64,
    recorded_at: DateTime<Utc>,
}

impl MetricSample {
    /// Create a new metric sample stamped with the current time.
    ///
    /// # Arguments
    ///
    /// * `run_id` - ID of the run that produced the value
    /// * `key` - Metric name (e.g., "latency_ms", "throughput")
    /// * `value` - Observed value
    #[must_use]
    pub fn new(run_id: impl Into<String>, key: impl Into<String>, value: f64) -> Self {
        Self {
            run_id: run_id.into(),
            key: key.into(),
            value,
            recorded_at: Utc::now(),
        }
    }

    /// Create a sample with an explicit timestamp (useful for replayed history).
    #[must_use]
    pub fn recorded(
        run_id: impl Into<String>,
        key: impl Into<String>,
        value: f64,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            key: key.into(),
            value,
            recorded_at,
        }
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the metric key/name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the metric value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Get the timestamp when the value was recorded.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Arithmetic mean of all finite samples for `key`, `None` if there are none.
#[must_use]
pub fn mean_for_key(samples: &[MetricSample], key: &str) -> Option<f64> {
    let values: Vec<f64> = samples
        .iter()
        .filter(|s| s.key() == key && s.value().is_finite())
        .map(MetricSample::value)
        .collect();

    if values.is_empty() {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
