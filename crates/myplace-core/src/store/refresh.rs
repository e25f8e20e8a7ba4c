// ── Poll result application ──
//
// Applies the outcome of a poll cycle to the SnapshotStore. A fresh
// snapshot replaces the cached one wholesale, with any in-flight
// optimistic patches re-applied on top so a poll racing a control
// operation cannot roll the consumer-visible state back.

use std::sync::Arc;

use chrono::Utc;

use super::SnapshotStore;
use crate::model::Snapshot;

impl SnapshotStore {
    /// Replace the cached snapshot with a validated poll result.
    ///
    /// Returns the snapshot as published, i.e. with pending patches applied.
    pub(crate) fn apply_poll(&self, mut snapshot: Snapshot) -> Arc<Snapshot> {
        let pending = self.pending();
        for (_, patch) in pending.iter() {
            patch.apply(&mut snapshot);
        }
        let snapshot = Arc::new(snapshot);

        self.sender().send_modify(|state| {
            state.snapshot = Some(Arc::clone(&snapshot));
            state.version += 1;
            state.last_update_success = true;
            state.last_refresh = Some(Utc::now());
        });
        drop(pending);

        snapshot
    }

    /// Record a poll cycle that produced nothing usable and had no cache to
    /// fall back on.
    pub(crate) fn mark_failed(&self) {
        self.sender().send_if_modified(|state| {
            let changed = state.last_update_success;
            state.last_update_success = false;
            changed
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{AirconId, ZoneId};
    use crate::store::Patch;
    use serde_json::json;

    fn snapshot(zone_on: bool) -> Snapshot {
        serde_json::from_value(json!({
            "aircons": { "ac1": { "isOn": true, "mode": "heat", "zoneOrder": ["z01"] } },
            "zones": { "z01": { "isOn": zone_on, "isVisible": true } }
        }))
        .unwrap()
    }

    #[test]
    fn apply_poll_publishes_and_bumps_version() {
        let store = SnapshotStore::new();
        let rx = store.subscribe();

        store.apply_poll(snapshot(true));

        assert_eq!(store.version(), 1);
        assert!(store.last_update_succeeded());
        assert!(store.last_refresh().is_some());
        assert!(rx.has_changed().unwrap());
        assert_eq!(
            store.snapshot().unwrap().zone(&ZoneId::from("z01")).unwrap().is_on,
            Some(true)
        );
    }

    #[test]
    fn mark_failed_keeps_cached_snapshot() {
        let store = SnapshotStore::new();
        store.apply_poll(snapshot(true));
        store.mark_failed();

        assert!(!store.last_update_succeeded());
        assert!(store.snapshot().is_some());
        assert!(store.state().is_available());
    }

    #[test]
    fn pending_patch_survives_a_racing_poll() {
        let store = SnapshotStore::new();
        store.apply_poll(snapshot(true));

        let (_, guard) = store
            .apply_optimistic(Patch::ZoneOpen {
                zone: ZoneId::from("z01"),
                open: false,
            })
            .unwrap();

        // Poll lands before the hub has processed the command.
        let published = store.apply_poll(snapshot(true));
        assert_eq!(published.zone(&ZoneId::from("z01")).unwrap().is_on, Some(false));

        // After retirement the hub's word is final.
        drop(guard);
        let published = store.apply_poll(snapshot(true));
        assert_eq!(published.zone(&ZoneId::from("z01")).unwrap().is_on, Some(true));
        assert!(published.aircon(&AirconId::from("ac1")).is_some());
    }
}
