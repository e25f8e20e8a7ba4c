// ── Per-entity sticky on/off records ──
//
// The derivation layer is pure; this table is where the controller keeps
// each entity's `LastKnownOn` between calls.

use std::sync::Arc;

use dashmap::DashMap;

use crate::derive::LastKnownOn;
use crate::model::EntityRef;

/// Shared map of entity -> last explicit `isOn`. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct LastKnownTable {
    inner: Arc<DashMap<EntityRef, LastKnownOn>>,
}

impl LastKnownTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity: &EntityRef) -> LastKnownOn {
        self.inner
            .get(entity)
            .map(|memo| *memo)
            .unwrap_or_default()
    }

    pub fn set(&self, entity: &EntityRef, memo: LastKnownOn) {
        self.inner.insert(entity.clone(), memo);
    }

    /// Record an explicit on/off value, e.g. the one an intent just patched in.
    pub fn record(&self, entity: &EntityRef, on: bool) {
        self.set(entity, LastKnownOn::new(Some(on)));
    }
}
