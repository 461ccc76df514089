//! Monitor worker management. One long-lived task per watched entity, keyed
//! by entity id, created lazily the first time the scheduler sees the entity.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Entity;
use crate::probe::{ProbeKind, Prober};

use super::{Alert, EntityMonitor};

/// Owns the monitor workers. Workers live for the rest of the process; there
/// is no eviction and no config reload.
pub struct Registry {
    prober: Arc<dyn Prober>,
    alert_tx: mpsc::Sender<Alert>,
    default_timeout: Duration,
    monitors: HashMap<i32, MonitorHandle>,
}

struct MonitorHandle {
    trigger: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl Registry {
    pub fn new(
        prober: Arc<dyn Prober>,
        alert_tx: mpsc::Sender<Alert>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            prober,
            alert_tx,
            default_timeout,
            monitors: HashMap::new(),
        }
    }

    /// Number of live monitor workers.
    pub fn monitor_count(&self) -> usize {
        self.monitors.len()
    }

    /// Runs one evaluation cycle over the watch list.
    ///
    /// Each entity is triggered at most once. The trigger channel holds a
    /// single pending tick; when an evaluation is slow enough that a tick is
    /// already waiting, further ticks are dropped for that entity alone and
    /// the rest of the watch list is unaffected.
    pub fn check(&mut self, entities: &[Entity]) {
        for entity in entities {
            let handle = match self.monitors.entry(entity.id) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let Some(kind) = entity.probe_kind() else {
                        // Warned at startup; stays silent from here on.
                        continue;
                    };
                    info!(
                        entity_id = entity.id,
                        name = %entity.name,
                        kind = kind.label(),
                        "Creating monitor worker."
                    );
                    entry.insert(spawn_monitor(
                        entity,
                        kind,
                        Arc::clone(&self.prober),
                        self.alert_tx.clone(),
                        self.default_timeout,
                    ))
                }
            };

            match handle.trigger.try_send(()) {
                Ok(()) => {}
                Err(TrySendError::Full(())) => {
                    debug!(
                        entity_id = entity.id,
                        "Previous evaluation still in flight; tick skipped."
                    );
                }
                Err(TrySendError::Closed(())) => {
                    warn!(
                        entity_id = entity.id,
                        "Monitor worker is gone; entity is no longer evaluated."
                    );
                }
            }
        }
    }

    /// Stops every monitor worker. Pending evaluations are abandoned.
    pub fn shutdown(self) {
        for (entity_id, handle) in self.monitors {
            handle.task.abort();
            debug!(entity_id, "Monitor worker stopped.");
        }
    }
}

fn spawn_monitor(
    entity: &Entity,
    kind: ProbeKind,
    prober: Arc<dyn Prober>,
    alert_tx: mpsc::Sender<Alert>,
    default_timeout: Duration,
) -> MonitorHandle {
    // Capacity 1: at most one tick waits behind a running evaluation, so two
    // evaluations of the same entity can never overlap.
    let (trigger_tx, mut trigger_rx) = mpsc::channel(1);

    let timeout = entity
        .timeout
        .map(|secs| Duration::from_secs(secs.max(1)))
        .unwrap_or(default_timeout);
    let entity_id = entity.id;
    let entity_name = entity.name.clone();

    let task = tokio::spawn(async move {
        let mut monitor = EntityMonitor::new(entity_id, entity_name, Instant::now());
        while trigger_rx.recv().await.is_some() {
            let outcome = prober.probe(&kind, timeout).await;
            if let Some(alert) = monitor.observe(outcome, Instant::now()) {
                if monitor.is_up() {
                    info!(entity_id, "Entity recovered.");
                } else {
                    warn!(
                        entity_id,
                        fail_count = monitor.fail_count(),
                        "Entity went down."
                    );
                }
                if alert_tx.send(alert).await.is_err() {
                    warn!(entity_id, "Alert channel closed; stopping monitor worker.");
                    return;
                }
            }
        }
        debug!(entity_id, "Monitor worker finished.");
    });

    MonitorHandle {
        trigger: trigger_tx,
        task,
    }
}
