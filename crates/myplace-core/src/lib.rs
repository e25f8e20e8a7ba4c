// myplace-core: Synchronization engine between a MyPlace hub and its consumers.

pub mod config;
pub mod controller;
pub mod derive;
pub mod error;
pub mod model;
pub mod mutator;
pub mod poller;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::HubConfig;
pub use controller::Controller;
pub use derive::{EntityState, LastKnownOn};
pub use error::CoreError;
pub use mutator::{ApplyOutcome, Intent, RejectReason};
pub use poller::Poller;
pub use store::{SnapshotStore, StoreState};

// Re-export model types at the crate root for ergonomics.
pub use model::{Aircon, AirconId, AirconMode, EntityRef, HvacMode, Snapshot, Zone, ZoneId};
