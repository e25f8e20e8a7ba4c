// ── Snapshot cache ──
//
// Versioned, copy-on-patch storage for the hub snapshot with push-based
// change notification, plus the per-entity sticky on/off records.

mod last_known;
mod patch;
mod refresh;
mod snapshot_store;

pub use last_known::LastKnownTable;
pub use patch::{Patch, PendingGuard, SetpointKind};
pub use snapshot_store::{SnapshotStore, StoreState};
