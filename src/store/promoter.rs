//! Claim promotion: route each claim to its category store under a fresh key.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{ClaimCategory, ClaimRef, ClaimStore};
use crate::claim::Claim;
use crate::Result;

/// Writes claims into the append-only category stores.
///
/// Keys are `<run_id>_<timestamp>_<sequence>`. The sequence is owned by the
/// promoter and strictly increasing, so promoting the same claim twice (even
/// with an identical timestamp) yields two entries.
pub struct ClaimPromoter {
    store: Arc<dyn ClaimStore>,
    sequence: AtomicU64,
}

impl ClaimPromoter {
    /// Promote into `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ClaimStore>) -> Self {
        Self {
            store,
            sequence: AtomicU64::new(0),
        }
    }

    /// Backing store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ClaimStore> {
        &self.store
    }

    /// Promote one claim.
    ///
    /// # Errors
    ///
    /// Returns the store error. The failure is also logged here, so callers
    /// processing a batch may simply count it and move on.
    pub fn promote(&self, claim: &Claim) -> Result<ClaimRef> {
        let category = ClaimCategory::from(claim.claim_type());
        let key = self.next_key(claim);

        match self.store.append(category, &key, claim) {
            Ok(()) => {
                tracing::debug!(run_id = claim.run_id(), %category, %key, "claim promoted");
                Ok(ClaimRef {
                    category,
                    key,
                    run_id: claim.run_id().to_string(),
                })
            }
            Err(err) => {
                tracing::error!(
                    run_id = claim.run_id(),
                    %category,
                    %key,
                    error = %err,
                    "claim promotion failed"
                );
                Err(err)
            }
        }
    }

    fn next_key(&self, claim: &Claim) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!(
            "{}_{}_{sequence:06}",
            claim.run_id(),
            claim.validated_at().format("%Y%m%dT%H%M%S%.6fZ")
        )
    }
}

impl fmt::Debug for ClaimPromoter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimPromoter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
