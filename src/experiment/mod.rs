//! Run inputs for claim validation
//!
//! The execution provider hands the engine a batch of [`RunRecord`]s. Each
//! record carries the outcome of one experiment run plus whatever metadata
//! the runner managed to collect.
//!
//! ## Schema Overview
//!
//! ```text
//! RunRecord ──┬── SourceControl (optional: commit, branch)
//!             ├── duration      (optional, free-form text)
//!             └── log_path      (optional, read by a LogReader)
//!
//! MetricSample (N) ── historical + current values for baseline comparison
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use claimcheck::experiment::RunRecord;
//!
//! let run = RunRecord::builder("run-001", "cache_warmup", true)
//!     .hypothesis_id("hyp-cache-eviction")
//!     .duration("0:01:30")
//!     .source_control("3f2a9c1", "feature/cache")
//!     .build();
//!
//! assert_eq!(run.duration_secs(), Some(90.0));
//! ```

mod batch;
mod duration;
mod metric_sample;
mod run_record;

pub use batch::{load_run_batch, parse_run_batch};
pub use duration::parse_duration_secs;
pub use metric_sample::{mean_for_key, MetricSample};
pub use run_record::{RunRecord, RunRecordBuilder, SourceControl};
