// ── Snapshot cache ──
//
// Single owner of the current hub snapshot. Every mutation is a whole-value
// replace or a copy-on-patch performed inside the watch channel's lock, so
// readers never see a half-applied update.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::patch::Patch;
use crate::model::Snapshot;

/// What subscribers observe on every change.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    /// Last validated snapshot, with in-flight optimistic patches applied.
    pub snapshot: Option<Arc<Snapshot>>,
    /// Bumped on every publish (poll result or optimistic patch).
    pub version: u64,
    /// Outcome of the most recent poll cycle.
    pub last_update_success: bool,
    /// When the last successful poll landed.
    pub last_refresh: Option<DateTime<Utc>>,
}

impl StoreState {
    /// Consumers treat an entity as unavailable only when the last poll
    /// failed and there is nothing cached to fall back on.
    pub fn is_available(&self) -> bool {
        self.last_update_success || self.snapshot.is_some()
    }
}

/// Cheaply cloneable handle to the shared snapshot cache.
#[derive(Clone)]
pub struct SnapshotStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: watch::Sender<StoreState>,
    /// Optimistic patches whose control operation has not yet reached its
    /// reconciling poll. Lock order: `pending` before the watch channel.
    pending: Mutex<Vec<(u64, Patch)>>,
    next_pending_id: AtomicU64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            inner: Arc::new(StoreInner {
                state,
                pending: Mutex::new(Vec::new()),
                next_pending_id: AtomicU64::new(1),
            }),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.state.borrow().snapshot.clone()
    }

    pub fn state(&self) -> StoreState {
        self.inner.state.borrow().clone()
    }

    pub fn version(&self) -> u64 {
        self.inner.state.borrow().version
    }

    pub fn last_update_succeeded(&self) -> bool {
        self.inner.state.borrow().last_update_success
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.inner.state.borrow().last_refresh
    }

    pub fn pending_count(&self) -> usize {
        self.pending().len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.inner.state.subscribe()
    }

    // ── Internals shared with refresh.rs / patch.rs ─────────────────

    pub(super) fn sender(&self) -> &watch::Sender<StoreState> {
        &self.inner.state
    }

    pub(super) fn pending(&self) -> MutexGuard<'_, Vec<(u64, Patch)>> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn next_pending_id(&self) -> u64 {
        self.inner.next_pending_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("SnapshotStore")
            .field("version", &state.version)
            .field("has_snapshot", &state.snapshot.is_some())
            .field("last_update_success", &state.last_update_success)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_empty_and_unavailable() {
        let store = SnapshotStore::new();
        assert!(store.snapshot().is_none());
        assert_eq!(store.version(), 0);
        assert!(!store.last_update_succeeded());
        assert!(!store.state().is_available());
        assert_eq!(store.pending_count(), 0);
    }

    #[test]
    fn pending_ids_are_unique() {
        let store = SnapshotStore::new();
        let a = store.next_pending_id();
        let b = store.next_pending_id();
        assert_ne!(a, b);
    }
}
