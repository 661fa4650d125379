//! In-memory claim store using `DashMap`.
//!
//! This is the default backend - claims are lost on process restart.
//! For persistence, use [`super::JsonlClaimStore`].

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{ClaimCategory, ClaimStore};
use crate::claim::Claim;
use crate::{Error, Result};

/// In-memory append-only claim store on a lock-free concurrent hashmap.
///
/// Thread-safe; concurrent promoters writing distinct keys never block each
/// other on the same shard for long.
///
/// # Example
///
/// ```rust
/// use claimcheck::store::{ClaimCategory, ClaimStore, MemoryClaimStore};
///
/// let store = MemoryClaimStore::new();
/// assert!(store.is_empty());
/// assert_eq!(store.count(ClaimCategory::Anomaly).unwrap(), 0);
/// ```
#[derive(Debug)]
pub struct MemoryClaimStore {
    claims: DashMap<(ClaimCategory, String), Claim>,
}

impl MemoryClaimStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            claims: DashMap::new(),
        }
    }

    /// Create with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            claims: DashMap::with_capacity(capacity),
        }
    }

    /// Number of claims across all categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// All claims in `category`, oldest first.
    #[must_use]
    pub fn claims_in(&self, category: ClaimCategory) -> Vec<Claim> {
        let mut claims: Vec<Claim> = self
            .claims
            .iter()
            .filter(|entry| entry.key().0 == category)
            .map(|entry| entry.value().clone())
            .collect();
        claims.sort_by_key(Claim::validated_at);
        claims
    }
}

impl Default for MemoryClaimStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimStore for MemoryClaimStore {
    fn append(&self, category: ClaimCategory, key: &str, claim: &Claim) -> Result<()> {
        match self.claims.entry((category, key.to_string())) {
            Entry::Occupied(_) => Err(Error::DuplicateClaim(format!("{category}/{key}"))),
            Entry::Vacant(slot) => {
                slot.insert(claim.clone());
                Ok(())
            }
        }
    }

    fn get(&self, category: ClaimCategory, key: &str) -> Result<Option<Claim>> {
        Ok(self
            .claims
            .get(&(category, key.to_string()))
            .map(|entry| entry.value().clone()))
    }

    fn count(&self, category: ClaimCategory) -> Result<usize> {
        Ok(self
            .claims
            .iter()
            .filter(|entry| entry.key().0 == category)
            .count())
    }

    fn total(&self) -> Result<usize> {
        Ok(self.claims.len())
    }
}
