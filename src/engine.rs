//! Validation engine: classify runs, promote claims, summarise the batch.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::claim::{BaselineStatus, Claim};
use crate::classification::{
    AuditTrail, ClassificationPipeline, ConfidenceScorer, LogEvidence, RunEvidence, Stage,
};
use crate::config::ValidatorConfig;
use crate::experiment::RunRecord;
use crate::providers::{
    BaselineComparator, LogReader, NoLogReader, RecordedSourceControl, SourceControlProvider,
};
use crate::store::{ClaimPromoter, ClaimStore, JsonlClaimStore, MemoryClaimStore};
use crate::summary::{BatchReport, SummaryAggregator, ValidationSummary};
use crate::Result;

/// Cooperative stop signal for a running batch.
///
/// Checked before each run; runs already promoted stay promoted.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Turns run records into promoted claims.
///
/// # Example
///
/// ```rust
/// use claimcheck::claim::ClaimType;
/// use claimcheck::experiment::RunRecord;
/// use claimcheck::ValidationEngine;
///
/// let engine = ValidationEngine::builder().build();
/// let runs = vec![
///     RunRecord::builder("run-1", "cache_warmup", true)
///         .hypothesis_id("hyp-cache-eviction")
///         .source_control("3f2a9c1", "feature/cache")
///         .build(),
///     RunRecord::new("run-2", "cache_warmup", false),
/// ];
///
/// let summary = engine.validate_batch(&runs);
/// assert_eq!(summary.runs_validated, 2);
/// assert_eq!(summary.claims_promoted, 2);
/// assert_eq!(summary.count_of(ClaimType::Regression), 1);
/// ```
pub struct ValidationEngine {
    config: ValidatorConfig,
    scorer: ConfidenceScorer,
    log_reader: Arc<dyn LogReader>,
    source_control: Arc<dyn SourceControlProvider>,
    baseline: Option<Arc<dyn BaselineComparator>>,
    promoter: ClaimPromoter,
}

impl ValidationEngine {
    /// Create a new engine builder.
    #[must_use]
    pub fn builder() -> ValidationEngineBuilder {
        ValidationEngineBuilder::default()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Claim store the engine promotes into.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ClaimStore> {
        self.promoter.store()
    }

    /// Classify one run, stamped with the current time.
    ///
    /// Does not promote. The claim carries [`BaselineStatus::NotCompared`].
    #[must_use]
    pub fn classify(&self, run: &RunRecord) -> Claim {
        self.classify_at(run, Utc::now())
    }

    /// Classify one run with an explicit validation timestamp.
    ///
    /// Identical run, identical collaborator answers and identical timestamp
    /// give an identical claim.
    #[must_use]
    pub fn classify_at(&self, run: &RunRecord, validated_at: DateTime<Utc>) -> Claim {
        self.classify_with(run, validated_at, BaselineStatus::NotCompared)
    }

    /// Classify and promote a batch, returning its summary.
    ///
    /// Never fails: collaborator and store errors are logged and reflected in
    /// the counts.
    #[must_use]
    pub fn validate_batch(&self, runs: &[RunRecord]) -> ValidationSummary {
        self.validate_batch_report(runs, &CancellationToken::new())
            .summary
    }

    /// Classify and promote a batch, returning the summary plus claim references.
    ///
    /// Stops early once `cancel` is triggered.
    #[must_use]
    pub fn validate_batch_report(
        &self,
        runs: &[RunRecord],
        cancel: &CancellationToken,
    ) -> BatchReport {
        let (baseline_delta_pct, baseline_status) = self.compare_baseline();
        let aggregator = SummaryAggregator::new();
        let validated_at = Utc::now();

        let process = |run: &RunRecord| {
            if cancel.is_cancelled() {
                return;
            }
            let claim = self.classify_with(run, validated_at, baseline_status);
            aggregator.record_classified(claim.claim_type(), claim.confidence().value());
            match self.promoter.promote(&claim) {
                Ok(reference) => aggregator.record_promoted(reference),
                Err(_) => aggregator.record_failed(),
            }
        };

        self.for_each_run(runs, process);

        let cancelled = cancel.is_cancelled();
        let report = aggregator.finish(baseline_delta_pct, cancelled);
        tracing::info!(
            runs = runs.len(),
            validated = report.summary.runs_validated,
            promoted = report.summary.claims_promoted,
            failed = report.summary.claims_failed,
            average_confidence = report.summary.average_confidence,
            delta_pct = baseline_delta_pct,
            cancelled,
            "batch validated"
        );
        report
    }

    #[cfg(feature = "parallel")]
    fn for_each_run<F>(&self, runs: &[RunRecord], process: F)
    where
        F: Fn(&RunRecord) + Sync + Send,
    {
        use rayon::prelude::*;

        if self.config.parallel {
            runs.par_iter().for_each(process);
        } else {
            runs.iter().for_each(process);
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn for_each_run<F>(&self, runs: &[RunRecord], process: F)
    where
        F: Fn(&RunRecord),
    {
        if self.config.parallel {
            tracing::warn!("parallel validation requested but the `parallel` feature is disabled");
        }
        runs.iter().for_each(process);
    }

    fn classify_with(
        &self,
        run: &RunRecord,
        validated_at: DateTime<Utc>,
        baseline_status: BaselineStatus,
    ) -> Claim {
        let source_control = match run.source_control() {
            Some(recorded) if recorded.is_complete() => Some(recorded.clone()),
            Some(recorded) => Some(match self.source_control.context(run) {
                Some(fallback) => recorded.clone().fill_from(fallback),
                None => recorded.clone(),
            }),
            None => self.source_control.context(run),
        };
        let log = self.read_log(run);

        let breakdown = self.scorer.assess(run, &log, source_control.as_ref());
        let mut trail = AuditTrail::new();
        trail.record(Stage::Confidence, breakdown.to_string());

        let evidence = RunEvidence::new(run, source_control.as_ref(), breakdown.score);
        let verdict = ClassificationPipeline::evaluate_with_trail(&evidence, trail);

        tracing::debug!(
            run_id = run.run_id(),
            claim_type = %verdict.claim_type,
            confidence = %breakdown.score,
            reason = %verdict.metadata.reason,
            "run classified"
        );
        Claim::new(run, breakdown.score, verdict, validated_at, baseline_status)
    }

    fn read_log(&self, run: &RunRecord) -> LogEvidence {
        match self.log_reader.read_log(run) {
            Ok(Some(text)) => LogEvidence::Text(text),
            Ok(None) => LogEvidence::Absent,
            Err(err) => {
                tracing::warn!(run_id = run.run_id(), error = %err, "execution log unreadable");
                LogEvidence::Unreadable
            }
        }
    }

    fn compare_baseline(&self) -> (f64, BaselineStatus) {
        let Some(comparator) = &self.baseline else {
            return (0.0, BaselineStatus::NotCompared);
        };
        match comparator.delta_percent() {
            Ok(delta) if delta.is_finite() => (delta, BaselineStatus::from_delta(delta)),
            Ok(delta) => {
                tracing::info!(delta_pct = delta, "baseline delta not finite, using 0.0");
                (0.0, BaselineStatus::Unavailable)
            }
            Err(err) => {
                tracing::info!(error = %err, "baseline comparison unavailable, using 0.0");
                (0.0, BaselineStatus::Unavailable)
            }
        }
    }
}

impl fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("config", &self.config)
            .field("scorer", &self.scorer)
            .field("baseline", &self.baseline.is_some())
            .field("promoter", &self.promoter)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ValidationEngine`].
///
/// Unset collaborators default to "absent": no logs, run-recorded source
/// control only, no baseline, and an in-memory claim store (or a JSON Lines
/// store when the config names a `store_dir`).
#[derive(Default)]
pub struct ValidationEngineBuilder {
    config: ValidatorConfig,
    log_reader: Option<Arc<dyn LogReader>>,
    source_control: Option<Arc<dyn SourceControlProvider>>,
    baseline: Option<Arc<dyn BaselineComparator>>,
    store: Option<Arc<dyn ClaimStore>>,
}

impl ValidationEngineBuilder {
    /// Use `config`.
    #[must_use]
    pub fn config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Read execution logs with `reader`.
    #[must_use]
    pub fn log_reader(mut self, reader: impl LogReader + 'static) -> Self {
        self.log_reader = Some(Arc::new(reader));
        self
    }

    /// Ask `provider` for source control when a run did not record it.
    #[must_use]
    pub fn source_control(mut self, provider: impl SourceControlProvider + 'static) -> Self {
        self.source_control = Some(Arc::new(provider));
        self
    }

    /// Compare batches against `comparator`.
    #[must_use]
    pub fn baseline(mut self, comparator: impl BaselineComparator + 'static) -> Self {
        self.baseline = Some(Arc::new(comparator));
        self
    }

    /// Promote into `store`.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn ClaimStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the engine with an in-memory store unless one was given.
    ///
    /// Ignores `config.store_dir`; use [`Self::try_build`] to honour it.
    #[must_use]
    pub fn build(self) -> ValidationEngine {
        let store = self
            .store
            .clone()
            .unwrap_or_else(|| Arc::new(MemoryClaimStore::new()));
        self.assemble(store)
    }

    /// Build the engine, opening a JSON Lines store at `config.store_dir`
    /// when no store was given explicitly.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the store directory
    /// cannot be created.
    pub fn try_build(self) -> Result<ValidationEngine> {
        self.config.validate()?;
        let store: Arc<dyn ClaimStore> = match (&self.store, &self.config.store_dir) {
            (Some(store), _) => Arc::clone(store),
            (None, Some(dir)) => Arc::new(JsonlClaimStore::open(dir)?),
            (None, None) => Arc::new(MemoryClaimStore::new()),
        };
        Ok(self.assemble(store))
    }

    fn assemble(self, store: Arc<dyn ClaimStore>) -> ValidationEngine {
        ValidationEngine {
            scorer: ConfidenceScorer::new(self.config.error_marker.clone()),
            config: self.config,
            log_reader: self.log_reader.unwrap_or_else(|| Arc::new(NoLogReader)),
            source_control: self
                .source_control
                .unwrap_or_else(|| Arc::new(RecordedSourceControl)),
            baseline: self.baseline,
            promoter: ClaimPromoter::new(store),
        }
    }
}
