//! Claim stores
//!
//! Six append-only category stores, one per [`ClaimType`]. A store accepts
//! each claim exactly once under a unique key and never edits or deletes it.
//!
//! - In-memory backend ([`MemoryClaimStore`], `DashMap`)
//! - File backend ([`JsonlClaimStore`], one JSON line per claim)
//! - [`ClaimPromoter`] routes claims to their category under fresh keys
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use claimcheck::store::{ClaimCategory, ClaimPromoter, ClaimStore, MemoryClaimStore};
//!
//! let store = Arc::new(MemoryClaimStore::new());
//! let promoter = ClaimPromoter::new(store.clone());
//! assert_eq!(store.count(ClaimCategory::Validated).unwrap(), 0);
//! # let _ = promoter;
//! ```

mod jsonl;
mod memory;
mod promoter;

pub use jsonl::JsonlClaimStore;
pub use memory::MemoryClaimStore;
pub use promoter::ClaimPromoter;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::claim::{Claim, ClaimType};
use crate::Result;

/// Category store a claim is promoted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimCategory {
    /// `validated` store
    Validated,
    /// `hypothesis` store (also the fallback for unknown labels)
    Hypothesis,
    /// `regression` store
    Regression,
    /// `anomaly` store
    Anomaly,
    /// `improvement` store
    Improvement,
    /// `new_phenomenon` store
    NewPhenomenon,
}

impl ClaimCategory {
    /// All six stores.
    pub const ALL: [Self; 6] = [
        Self::Validated,
        Self::Hypothesis,
        Self::Regression,
        Self::Anomaly,
        Self::Improvement,
        Self::NewPhenomenon,
    ];

    /// Stable `snake_case` label, also used for file names.
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

impl From<ClaimType> for ClaimCategory {
    fn from(claim_type: ClaimType) -> Self {
        match claim_type {
            ClaimType::Validated => Self::Validated,
            ClaimType::Hypothesis => Self::Hypothesis,
            ClaimType::Regression => Self::Regression,
            ClaimType::Anomaly => Self::Anomaly,
            ClaimType::Improvement => Self::Improvement,
            ClaimType::NewPhenomenon => Self::NewPhenomenon,
        }
    }
}

impl FromStr for ClaimCategory {
    type Err = std::convert::Infallible;

    /// Lenient parse: unknown labels route to the hypothesis store.
    fn from_str(label: &str) -> std::result::Result<Self, Self::Err> {
        let label = label.trim().to_ascii_lowercase();
        Ok(Self::ALL
            .into_iter()
            .find(|c| c.as_str() == label)
            .unwrap_or(Self::Hypothesis))
    }
}

impl fmt::Display for ClaimCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a promoted claim landed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimRef {
    /// Category store.
    pub category: ClaimCategory,
    /// Unique key inside the store.
    pub key: String,
    /// Run the claim is about.
    pub run_id: String,
}

/// Append-only claim storage.
///
/// Implementations must reject a second `append` under an existing key
/// rather than overwrite it.
pub trait ClaimStore: Send + Sync {
    /// Store `claim` under `key` in `category`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::DuplicateClaim`] if `key` is taken, or a
    /// backend error if the write fails.
    fn append(&self, category: ClaimCategory, key: &str, claim: &Claim) -> Result<()>;

    /// Fetch a claim by key.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the read fails.
    fn get(&self, category: ClaimCategory, key: &str) -> Result<Option<Claim>>;

    /// Number of claims in `category`.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the read fails.
    fn count(&self, category: ClaimCategory) -> Result<usize>;

    /// Number of claims across all categories.
    ///
    /// # Errors
    ///
    /// Returns a backend error if any category cannot be read.
    fn total(&self) -> Result<usize> {
        let mut total = 0;
        for category in ClaimCategory::ALL {
            total += self.count(category)?;
        }
        Ok(total)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Utc};

    use crate::claim::{BaselineStatus, Claim};
    use crate::classification::{ClassificationPipeline, ConfidenceScore, RunEvidence};
    use crate::experiment::RunRecord;

    /// A fully classified claim for store tests.
    pub fn sample_claim(run_id: &str, at: DateTime<Utc>) -> Claim {
        let run = RunRecord::builder(run_id, "cache_warmup", true)
            .hypothesis_id("hyp-cache")
            .source_control("abc1234", "feature/x")
            .build();
        let confidence = ConfidenceScore::new(0.8);
        let evidence = RunEvidence::new(&run, run.source_control(), confidence);
        let verdict = ClassificationPipeline::evaluate(&evidence);
        Claim::new(&run, confidence, verdict, at, BaselineStatus::NotCompared)
    }
}
