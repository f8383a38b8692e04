//! Switch monitor — the tick loop that drives every trigger.
//!
//! The `SwitchMonitor` owns nothing but handles: the shared registry and
//! the notifier. Each tick performs one locked scan of the registry, then
//! spawns the deliveries that came due. Deliveries run concurrently and
//! are never awaited by the loop.

use std::sync::Arc;
use std::time::Duration;

use deadswitch_notify::Notifier;
use deadswitch_state::{epoch_millis, EpochMillis, TriggerRegistry};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::scheduler::{next_notification, Notification};
use crate::watcher::{observe, Transition};

/// Outcome of a single tick, mostly useful for tests and logging.
#[derive(Debug, Default)]
pub struct TickReport {
    pub transitions: Vec<(String, Transition)>,
    pub dispatched: Vec<Notification>,
    /// In-flight deliveries started by this tick.
    pub deliveries: Vec<JoinHandle<()>>,
}

/// Runs the down watcher and the notification scheduler over a registry.
#[derive(Clone)]
pub struct SwitchMonitor {
    registry: TriggerRegistry,
    notifier: Arc<dyn Notifier>,
    tick_interval: Duration,
}

impl SwitchMonitor {
    /// Create a monitor over `registry`, delivering through `notifier`.
    pub fn new(
        registry: TriggerRegistry,
        notifier: Arc<dyn Notifier>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            registry,
            notifier,
            tick_interval,
        }
    }

    pub fn registry(&self) -> &TriggerRegistry {
        &self.registry
    }

    /// Run one tick at wall-clock time `now`.
    ///
    /// Both scans see every trigger inside the same critical section, so
    /// a DOWN transition is visible to the scheduler on the same tick.
    pub async fn tick(&self, now: EpochMillis) -> TickReport {
        let mut report = TickReport::default();

        self.registry
            .for_each(|trigger| {
                if let Some(transition) = observe(trigger, now) {
                    report
                        .transitions
                        .push((trigger.name().to_string(), transition));
                }
                if let Some(notification) = next_notification(trigger, now) {
                    report.dispatched.push(notification);
                }
            })
            .await;

        for notification in &report.dispatched {
            report.deliveries.push(self.dispatch(notification.clone()));
        }

        report
    }

    /// Send one notification in the background and record its outcome.
    fn dispatch(&self, notification: Notification) -> JoinHandle<()> {
        info!(
            trigger = %notification.trigger,
            index = notification.index,
            description = %notification.description,
            "notification dispatched"
        );

        let delivery = self.notifier.notify(notification.payload());
        let registry = self.registry.clone();

        tokio::spawn(async move {
            let name = notification.trigger;
            let status = match delivery.await {
                Ok(()) => {
                    info!(trigger = %name, at = epoch_millis(), "webhook notified");
                    "OK".to_string()
                }
                Err(e) => {
                    warn!(trigger = %name, at = epoch_millis(), error = %e, "webhook delivery failed");
                    e.to_string()
                }
            };

            if let Err(e) = registry.record_status(&name, status).await {
                error!(trigger = %name, error = %e, "failed to record delivery status");
            }
        })
    }

    /// Tick until `shutdown` flips, using the wall clock.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            tick_ms = self.tick_interval.as_millis() as u64,
            "switch monitor started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.tick(epoch_millis()).await;
                    if !report.transitions.is_empty() {
                        debug!(transitions = report.transitions.len(), "tick changed trigger state");
                    }
                }
                _ = shutdown.changed() => {
                    info!("switch monitor shutting down");
                    break;
                }
            }
        }
    }

    /// Spawn [`run`](Self::run) on the current runtime.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(shutdown).await })
    }
}
