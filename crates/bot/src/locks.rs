//! Per-owner async locks.
//!
//! Serializes read-modify-write ledger cycles for one owner inside this
//! process. Messages from different owners proceed concurrently. The guarded
//! storage writes remain the cross-process safety net.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tavern_core::types::DiscordId;
use tokio::sync::OwnedMutexGuard;

/// Map size above which idle entries are pruned on the next acquire.
const PRUNE_THRESHOLD: usize = 1024;

/// Keyed set of async mutexes, one per owner.
#[derive(Default)]
pub struct OwnerLocks {
    locks: Mutex<HashMap<DiscordId, Arc<tokio::sync::Mutex<()>>>>,
}

impl OwnerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `owner_id`'s ledger.
    pub async fn lock(&self, owner_id: DiscordId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            if locks.len() > PRUNE_THRESHOLD {
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            Arc::clone(locks.entry(owner_id).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of owners currently tracked.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
