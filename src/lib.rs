//! # claimcheck: Experiment Run Validation Engine
//!
//! **Version**: 0.1.0
//!
//! claimcheck turns completed experiment runs into classified, auditable
//! claims. Each run is scored for confidence, checked for anomalies,
//! improvements and new phenomena, adjusted for metadata quality and domain,
//! and promoted into an append-only store partitioned by claim type.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Jidoka**: A run never silently disappears; store failures are counted
//! - **Poka-Yoke safety**: Closed enums for claim types, domains and categories
//! - **Genchi Genbutsu**: Every verdict carries the audit trail that produced it
//! - **Muda elimination**: Classification is pure and parallelises per run
//!
//! ## Example Usage
//!
//! ```rust
//! use claimcheck::experiment::RunRecord;
//! use claimcheck::{ClaimType, ValidationEngine};
//!
//! let engine = ValidationEngine::builder().build();
//! let run = RunRecord::builder("run-42", "checkout_flow", true)
//!     .hypothesis_id("hyp-checkout-latency")
//!     .source_control("9b1e0d2", "feature/checkout")
//!     .build();
//!
//! let claim = engine.classify(&run);
//! assert_eq!(claim.claim_type(), ClaimType::Improvement);
//!
//! let summary = engine.validate_batch(&[run]);
//! assert_eq!(summary.claims_promoted, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod claim;
pub mod classification;
pub mod config;
pub mod engine;
pub mod error;
pub mod experiment;
pub mod logging;
pub mod providers;
pub mod store;
pub mod summary;

pub use claim::{Claim, ClaimType};
pub use config::ValidatorConfig;
pub use engine::{CancellationToken, ValidationEngine, ValidationEngineBuilder};
pub use error::{Error, Result};
pub use summary::{BatchReport, ValidationSummary};
