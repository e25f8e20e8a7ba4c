// ── Poller ──
//
// One poll cycle: ask the hub for its full state, validate the reply,
// publish it. Any failure falls back to the cached snapshot when there is
// one; cadence is owned by the controller's background task.

use std::sync::Arc;

use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use myplace_api::{CommandBatch, CommandTransport};

use crate::error::CoreError;
use crate::model::Snapshot;
use crate::store::SnapshotStore;

/// Runs poll cycles against a transport, writing into a store.
#[derive(Clone)]
pub struct Poller {
    transport: Arc<dyn CommandTransport>,
    store: SnapshotStore,
}

impl Poller {
    pub fn new(transport: Arc<dyn CommandTransport>, store: SnapshotStore) -> Self {
        Self { transport, store }
    }

    /// Run a single poll cycle.
    ///
    /// Returns the freshly published snapshot, or the cached one if the
    /// cycle failed. Fails with [`CoreError::UpdateFailed`] only when the
    /// cycle failed and nothing is cached.
    pub async fn fetch_once(&self) -> Result<Arc<Snapshot>, CoreError> {
        let started = Instant::now();

        match self.fetch_validated().await {
            Ok(snapshot) => {
                let aircons = snapshot.aircons.len();
                let zones = snapshot.zones.len();
                let published = self.store.apply_poll(snapshot);
                debug!(
                    elapsed_ms = elapsed_ms(started),
                    aircons,
                    zones,
                    version = self.store.version(),
                    "poll complete"
                );
                Ok(published)
            }
            Err(e) => {
                if let Some(cached) = self.store.snapshot() {
                    warn!(
                        error = %e,
                        elapsed_ms = elapsed_ms(started),
                        "poll failed, keeping cached snapshot"
                    );
                    return Ok(cached);
                }
                error!(
                    error = %e,
                    elapsed_ms = elapsed_ms(started),
                    "poll failed with no cached snapshot"
                );
                self.store.mark_failed();
                Err(CoreError::UpdateFailed {
                    message: e.to_string(),
                })
            }
        }
    }

    async fn fetch_validated(&self) -> Result<Snapshot, CoreError> {
        let reply = self
            .transport
            .send(&CommandBatch::full_data(), true)
            .await?;
        let message = reply.into_message().ok_or_else(|| CoreError::InvalidSnapshot {
            message: "transport returned no reply".into(),
        })?;
        parse_snapshot(message)
    }
}

/// Validate a full-data reply and decode its `body`.
///
/// The body may arrive as a JSON string (what the hub sends) or as an
/// already-decoded object. Both `aircons` and `zones` must be present and
/// non-empty.
pub fn parse_snapshot(reply: Value) -> Result<Snapshot, CoreError> {
    let Value::Object(mut envelope) = reply else {
        return Err(invalid("reply is not a JSON object"));
    };
    let body = envelope
        .remove("body")
        .ok_or_else(|| invalid("reply has no `body` field"))?;

    let decoded = match body {
        Value::String(text) => serde_json::from_str::<Snapshot>(&text),
        object @ Value::Object(_) => serde_json::from_value::<Snapshot>(object),
        _ => return Err(invalid("`body` is neither a string nor an object")),
    };
    let snapshot = decoded.map_err(|e| CoreError::InvalidSnapshot {
        message: format!("`body` does not decode: {e}"),
    })?;

    if !snapshot.is_complete() {
        return Err(invalid("`aircons` or `zones` missing or empty"));
    }
    Ok(snapshot)
}

fn invalid(message: &str) -> CoreError {
    CoreError::InvalidSnapshot {
        message: message.to_owned(),
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
