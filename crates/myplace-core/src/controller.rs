// ── Controller abstraction ──
//
// Lifecycle management for one MyPlace hub: initial fetch, background
// polling, out-of-band refresh, optimistic control and derived state for
// consumers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use myplace_api::{CommandTransport, HubClient};

use crate::config::HubConfig;
use crate::derive::{self, EntityState};
use crate::error::CoreError;
use crate::model::{EntityRef, Snapshot};
use crate::mutator::{ApplyOutcome, Intent, Mutator};
use crate::poller::Poller;
use crate::store::{LastKnownTable, SnapshotStore, StoreState};

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: HubConfig,
    store: SnapshotStore,
    last_known: LastKnownTable,
    poller: Poller,
    mutator: Mutator,
    refresh: Arc<Notify>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a controller talking to the hub described by `config`.
    /// Does NOT contact the hub; call [`start()`](Self::start).
    pub fn new(config: HubConfig) -> Result<Self, CoreError> {
        let client = HubClient::new(
            &config.host,
            config.port,
            config.client_id.clone(),
            config.client_secret.clone(),
            config.transport.clone(),
        )?;
        Ok(Self::with_transport(config, Arc::new(client)))
    }

    /// Create a controller over an arbitrary transport.
    pub fn with_transport(config: HubConfig, transport: Arc<dyn CommandTransport>) -> Self {
        let store = SnapshotStore::new();
        let last_known = LastKnownTable::new();
        let refresh = Arc::new(Notify::new());

        let poller = Poller::new(Arc::clone(&transport), store.clone());
        let mutator = Mutator::new(
            transport,
            store.clone(),
            last_known.clone(),
            Arc::clone(&refresh),
            config.settle_delay,
        );

        Self {
            inner: Arc::new(ControllerInner {
                config,
                store,
                last_known,
                poller,
                mutator,
                refresh,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.inner.store
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Fetch the initial snapshot and spawn the poll task.
    ///
    /// Fails if the first fetch fails; no background task is started then.
    pub async fn start(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ControllerStopped);
        }

        self.fetch_once().await?;

        let interval = self.inner.config.poll_interval;
        if !interval.is_zero() {
            let handle = tokio::spawn(poll_task(
                self.inner.poller.clone(),
                interval,
                Arc::clone(&self.inner.refresh),
                self.inner.cancel.clone(),
            ));
            self.inner.task_handles.lock().await.push(handle);
        }

        info!(
            host = %self.inner.config.host,
            poll_interval_secs = interval.as_secs(),
            "hub controller started"
        );
        Ok(())
    }

    /// Cancel background work and wait for it to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("hub controller stopped");
    }

    /// One-shot: start without background polling, run `f`, shut down.
    pub async fn oneshot<F, Fut, T>(config: HubConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let cfg = config.with_poll_interval(Duration::ZERO);
        let controller = Controller::new(cfg)?;
        controller.start().await?;
        let result = f(controller.clone()).await;
        controller.shutdown().await;
        result
    }

    // ── Polling ──────────────────────────────────────────────────

    /// Run one poll cycle now, in the caller's task.
    pub async fn fetch_once(&self) -> Result<Arc<Snapshot>, CoreError> {
        self.inner.poller.fetch_once().await
    }

    /// Ask the poll task for an out-of-band cycle.
    pub fn request_refresh(&self) {
        self.inner.refresh.notify_one();
    }

    // ── Control ──────────────────────────────────────────────────

    /// Apply a control intent optimistically.
    ///
    /// Shutting the controller down cancels an in-flight intent; its
    /// pending patch is retired and its connection released.
    pub async fn apply_intent(&self, intent: Intent) -> Result<ApplyOutcome, CoreError> {
        tokio::select! {
            biased;
            () = self.inner.cancel.cancelled() => Err(CoreError::ControllerStopped),
            outcome = self.inner.mutator.apply(intent) => outcome,
        }
    }

    // ── State observation ────────────────────────────────────────

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.store.snapshot()
    }

    pub fn last_update_succeeded(&self) -> bool {
        self.inner.store.last_update_succeeded()
    }

    /// Subscribe to every publish of the snapshot cache.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.inner.store.subscribe()
    }

    /// Look up an exposed entity by id or name.
    pub fn resolve_target(&self, query: &str) -> Option<EntityRef> {
        self.snapshot()?.resolve_target(query)
    }

    /// Derived state of one exposed entity, or `None` if the cache has no
    /// such entity or it is hidden.
    pub fn entity_state(&self, entity: &EntityRef) -> Option<EntityState> {
        let snapshot = self.snapshot()?;
        if !snapshot.is_exposed(entity) {
            return None;
        }
        Some(self.derive_state(&snapshot, entity))
    }

    /// Derived state of every exposed entity, aircons first.
    pub fn entity_states(&self) -> Vec<EntityState> {
        let Some(snapshot) = self.snapshot() else {
            return Vec::new();
        };
        snapshot
            .exposed_entities()
            .iter()
            .map(|entity| self.derive_state(&snapshot, entity))
            .collect()
    }

    fn derive_state(&self, snapshot: &Snapshot, entity: &EntityRef) -> EntityState {
        let memo = self.inner.last_known.get(entity);
        let (state, memo) = derive::entity_state(snapshot, entity, memo);
        self.inner.last_known.set(entity, memo);
        state
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Poll on a fixed cadence, or sooner when a refresh is requested.
async fn poll_task(
    poller: Poller,
    period: Duration,
    refresh: Arc<Notify>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = refresh.notified() => {
                debug!("out-of-band refresh requested");
                interval.reset();
            }
            _ = interval.tick() => {}
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = poller.fetch_once() => {
                if let Err(e) = result {
                    warn!(error = %e, "periodic poll failed");
                }
            }
        }
    }
}
