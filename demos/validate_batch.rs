//! Batch Validation: run records in, classified claims out
//!
//! Loads a JSON array of run records, validates it into a JSON Lines claim
//! store and prints the batch summary.
//!
//! Toyota Way: Genchi Genbutsu - every claim carries the trail that produced it
//!
//! Run with: cargo run --example validate_batch -- [runs.json] [config.json]
//!
//! Without arguments the bundled `demos/runs.json` is used and claims are
//! written under the system temp directory.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use claimcheck::claim::ClaimType;
use claimcheck::experiment::load_run_batch;
use claimcheck::logging::init_logging;
use claimcheck::providers::FsLogReader;
use claimcheck::store::{ClaimStore, JsonlClaimStore};
use claimcheck::{CancellationToken, ValidationEngine, ValidatorConfig};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let runs_path = args.next().map_or_else(
        || PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/runs.json"),
        PathBuf::from,
    );
    let config = match args.next() {
        Some(path) => ValidatorConfig::from_file(&path)
            .with_context(|| format!("loading config {path}"))?,
        None => ValidatorConfig::default(),
    };

    init_logging(&config.log_filter);

    let runs = load_run_batch(&runs_path)
        .with_context(|| format!("loading runs from {}", runs_path.display()))?;

    let store_dir = config
        .store_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("claimcheck-demo"));
    let store = Arc::new(
        JsonlClaimStore::open(&store_dir)
            .with_context(|| format!("opening claim store {}", store_dir.display()))?,
    );
    let log_root = runs_path.parent().map(PathBuf::from).unwrap_or_default();

    let engine = ValidationEngine::builder()
        .config(config)
        .log_reader(FsLogReader::with_root(log_root))
        .store(store.clone())
        .build();

    println!("=== claimcheck: validating {} runs ===\n", runs.len());
    for run in &runs {
        let claim = engine.classify(run);
        println!(
            "  {:<12} {:<28} {:<15} confidence {}  ({})",
            claim.run_id(),
            claim.experiment_name(),
            claim.claim_type().as_str(),
            claim.confidence(),
            claim.metadata().reason
        );
    }

    let report = engine.validate_batch_report(&runs, &CancellationToken::new());
    let summary = &report.summary;

    println!("\n=== Summary ===");
    println!("  Runs validated:     {}", summary.runs_validated);
    println!("  Claims promoted:    {}", summary.claims_promoted);
    println!("  Claims failed:      {}", summary.claims_failed);
    println!("  Average confidence: {:.3}", summary.average_confidence);
    println!("  Baseline delta:     {:.1}%", summary.baseline_delta_pct);
    for claim_type in ClaimType::ALL {
        println!("  {:<18}  {}", claim_type.as_str(), summary.count_of(claim_type));
    }

    println!("\n=== Store ({}) ===", store.root().display());
    println!("  Total claims on disk: {}", store.total()?);
    for reference in report.promoted.iter().take(3) {
        println!("  {}/{}", reference.category, reference.key);
    }

    Ok(())
}
