// ── Hub domain model ──
//
// Typed view of the hub's full-data reply. Consumers (CLI, controller)
// depend on these types rather than on raw JSON.

pub mod aircon;
pub mod entity_id;
pub mod mode;
pub mod snapshot;

// ── Re-exports ──────────────────────────────────────────────────────

pub use aircon::{Aircon, Zone};
pub use entity_id::{AirconId, EntityRef, ZoneId};
pub use mode::{AirconMode, HvacMode};
pub use snapshot::Snapshot;
