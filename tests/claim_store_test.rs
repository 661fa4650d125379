//! Claim store contract tests, run against both backends

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use claimcheck::claim::Claim;
use claimcheck::experiment::RunRecord;
use claimcheck::store::{
    ClaimCategory, ClaimPromoter, ClaimStore, JsonlClaimStore, MemoryClaimStore,
};
use claimcheck::{Error, ValidationEngine};

fn claim(run_id: &str, success: bool, minutes: i64) -> Claim {
    let at = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap() + Duration::minutes(minutes);
    let run = RunRecord::builder(run_id, "cache_warmup", success)
        .hypothesis_id("hyp-cache-eviction")
        .source_control("3f2a9c1", "feature/cache")
        .build();
    ValidationEngine::builder().build().classify_at(&run, at)
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("claimcheck-store-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn check_append_only(store: &dyn ClaimStore) {
    let first = claim("run-1", true, 0);
    let other = claim("run-2", true, 1);

    store.append(ClaimCategory::Improvement, "k1", &first).unwrap();
    let err = store
        .append(ClaimCategory::Improvement, "k1", &other)
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateClaim(_)));

    // the original survives
    assert_eq!(
        store.get(ClaimCategory::Improvement, "k1").unwrap(),
        Some(first.clone())
    );
    // same key in another category is a different slot
    store.append(ClaimCategory::Anomaly, "k1", &other).unwrap();

    assert_eq!(store.count(ClaimCategory::Improvement).unwrap(), 1);
    assert_eq!(store.count(ClaimCategory::Anomaly).unwrap(), 1);
    assert_eq!(store.total().unwrap(), 2);
    assert_eq!(store.get(ClaimCategory::Validated, "k1").unwrap(), None);
}

#[test]
fn test_memory_store_is_append_only() {
    check_append_only(&MemoryClaimStore::new());
}

#[test]
fn test_jsonl_store_is_append_only() {
    let dir = scratch_dir("append-only");
    check_append_only(&JsonlClaimStore::open(&dir).unwrap());
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_jsonl_claims_survive_reopen() {
    let dir = scratch_dir("reopen");
    let written = claim("run-1", false, 0);
    {
        let store = JsonlClaimStore::open(&dir).unwrap();
        store
            .append(ClaimCategory::Regression, "run-1_a", &written)
            .unwrap();
    }

    let store = JsonlClaimStore::open(&dir).unwrap();
    assert_eq!(
        store.get(ClaimCategory::Regression, "run-1_a").unwrap(),
        Some(written)
    );
    assert!(store.path_for(ClaimCategory::Regression).ends_with("regression.jsonl"));
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_jsonl_malformed_line_is_store_error() {
    let dir = scratch_dir("malformed");
    let store = JsonlClaimStore::open(&dir).unwrap();
    std::fs::write(store.path_for(ClaimCategory::Anomaly), "{not json}\n").unwrap();

    let err = store.count(ClaimCategory::Anomaly).unwrap_err();
    assert!(matches!(err, Error::Store { .. }));
    assert!(err.to_string().contains("anomaly"));
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_memory_claims_in_orders_by_time() {
    let store = MemoryClaimStore::new();
    store
        .append(ClaimCategory::Improvement, "late", &claim("run-2", true, 30))
        .unwrap();
    store
        .append(ClaimCategory::Improvement, "early", &claim("run-1", true, 5))
        .unwrap();

    let ids: Vec<_> = store
        .claims_in(ClaimCategory::Improvement)
        .iter()
        .map(|c| c.run_id().to_string())
        .collect();
    assert_eq!(ids, vec!["run-1", "run-2"]);
}

#[test]
fn test_promoter_keys_are_unique_across_threads() {
    let store = Arc::new(MemoryClaimStore::new());
    let promoter = Arc::new(ClaimPromoter::new(store.clone()));
    let shared = claim("run-hot", true, 0);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let promoter = Arc::clone(&promoter);
            let shared = shared.clone();
            scope.spawn(move || {
                for _ in 0..25 {
                    promoter.promote(&shared).unwrap();
                }
            });
        }
    });

    assert_eq!(store.count(ClaimCategory::Improvement).unwrap(), 200);
}

#[test]
fn test_category_labels_parse_leniently() {
    for category in ClaimCategory::ALL {
        assert_eq!(category.as_str().parse::<ClaimCategory>(), Ok(category));
    }
    assert_eq!("NEW_PHENOMENON".parse::<ClaimCategory>(), Ok(ClaimCategory::NewPhenomenon));
    assert_eq!("mystery".parse::<ClaimCategory>(), Ok(ClaimCategory::Hypothesis));
}
