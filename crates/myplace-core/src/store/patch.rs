// ── Optimistic patches ──
//
// A patch is the local effect of a control command. It is applied to a
// copy of the cached snapshot and published immediately, then kept as
// "pending" so that polls landing before the hub catches up get it
// re-applied. Dropping the `PendingGuard` retires it.

use std::sync::Arc;

use super::SnapshotStore;
use crate::model::{AirconId, AirconMode, EntityRef, Snapshot, ZoneId};

/// Which of the two setpoint fields a temperature change writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetpointKind {
    Heat,
    Cool,
}

/// Local effect of one control operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    /// Write `targetTemperatureHeat` or `targetTemperatureCool`.
    Setpoint {
        entity: EntityRef,
        kind: SetpointKind,
        value: f64,
    },
    /// Zone opened (`isOn = true`) or closed.
    ZoneOpen { zone: ZoneId, open: bool },
    /// Aircon power, plus the mode it was switched to when turned on.
    AirconPower {
        aircon: AirconId,
        on: bool,
        mode: Option<AirconMode>,
    },
}

impl Patch {
    /// Apply in place. Returns `false` if the target is not in `snapshot`.
    pub fn apply(&self, snapshot: &mut Snapshot) -> bool {
        match self {
            Self::Setpoint {
                entity,
                kind,
                value,
            } => {
                let fields = match entity {
                    EntityRef::Aircon(id) => snapshot.aircons.get_mut(id).map(|a| {
                        (&mut a.target_temperature_heat, &mut a.target_temperature_cool)
                    }),
                    EntityRef::Zone(id) => snapshot.zones.get_mut(id).map(|z| {
                        (&mut z.target_temperature_heat, &mut z.target_temperature_cool)
                    }),
                };
                let Some((heat, cool)) = fields else {
                    return false;
                };
                match kind {
                    SetpointKind::Heat => *heat = Some(*value),
                    SetpointKind::Cool => *cool = Some(*value),
                }
                true
            }
            Self::ZoneOpen { zone, open } => match snapshot.zones.get_mut(zone) {
                Some(z) => {
                    z.is_on = Some(*open);
                    true
                }
                None => false,
            },
            Self::AirconPower { aircon, on, mode } => match snapshot.aircons.get_mut(aircon) {
                Some(a) => {
                    a.is_on = Some(*on);
                    if let Some(mode) = mode {
                        a.mode = Some(mode.clone());
                    }
                    true
                }
                None => false,
            },
        }
    }
}

/// Keeps a patch pending until dropped.
///
/// The mutator drops it right before requesting the reconciling poll; an
/// error or cancellation drops it early through unwinding of the owning
/// future.
#[must_use = "dropping the guard retires the patch immediately"]
pub struct PendingGuard {
    store: SnapshotStore,
    id: u64,
}

impl PendingGuard {
    /// Retire the patch now.
    pub fn retire(self) {
        drop(self);
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.store.pending().retain(|(id, _)| *id != self.id);
    }
}

impl std::fmt::Debug for PendingGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingGuard").field("id", &self.id).finish()
    }
}

impl SnapshotStore {
    /// Patch a copy of the cached snapshot, publish it, and register the
    /// patch as pending, all under the pending lock.
    ///
    /// Returns `None` when there is no cached snapshot or the target is
    /// missing from it; nothing is published in that case.
    pub fn apply_optimistic(&self, patch: Patch) -> Option<(Arc<Snapshot>, PendingGuard)> {
        let mut pending = self.pending();

        let mut published = None;
        self.sender().send_if_modified(|state| {
            let Some(current) = state.snapshot.as_ref() else {
                return false;
            };
            let mut next = Snapshot::clone(current);
            if !patch.apply(&mut next) {
                return false;
            }
            let next = Arc::new(next);
            state.snapshot = Some(Arc::clone(&next));
            state.version += 1;
            published = Some(next);
            true
        });

        let snapshot = published?;
        let id = self.next_pending_id();
        pending.push((id, patch));
        drop(pending);

        Some((
            snapshot,
            PendingGuard {
                store: self.clone(),
                id,
            },
        ))
    }
}
