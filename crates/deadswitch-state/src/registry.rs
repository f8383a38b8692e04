//! In-memory registry of all configured triggers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::types::{EpochMillis, Trigger, TriggerSnapshot, TriggerSpec};

/// Shared handle to every trigger known to the process.
///
/// Triggers are created once in [`TriggerRegistry::new`] and never
/// removed. Cloning the handle is cheap; all clones see the same state.
#[derive(Clone, Debug)]
pub struct TriggerRegistry {
    triggers: Arc<RwLock<HashMap<String, Trigger>>>,
}

impl TriggerRegistry {
    /// Build a registry from trigger specs, all considered reset at `now`.
    pub fn new(specs: Vec<TriggerSpec>, now: EpochMillis) -> StateResult<Self> {
        let mut triggers = HashMap::with_capacity(specs.len());
        for spec in specs {
            let name = spec.name.clone();
            if triggers.insert(name.clone(), Trigger::new(spec, now)).is_some() {
                return Err(StateError::DuplicateTrigger(name));
            }
        }

        Ok(Self {
            triggers: Arc::new(RwLock::new(triggers)),
        })
    }

    /// Record a heartbeat for `name` at `now`.
    ///
    /// Only the last-seen timestamp changes; the monitor picks the
    /// recovery up on its next tick.
    pub async fn reset(&self, name: &str, now: EpochMillis) -> StateResult<()> {
        let mut triggers = self.triggers.write().await;
        let trigger = triggers
            .get_mut(name)
            .ok_or_else(|| StateError::NotFound(name.to_string()))?;
        trigger.touch(now);
        debug!(trigger = %name, at = now, "last trigger epoch updated");
        Ok(())
    }

    /// Run `f` over every trigger while holding the write lock.
    ///
    /// No reset or delivery completion can interleave with the scan.
    /// Iteration order is unspecified.
    pub async fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&mut Trigger),
    {
        let mut triggers = self.triggers.write().await;
        for trigger in triggers.values_mut() {
            f(trigger);
        }
    }

    /// Store the outcome of a finished delivery for `name`.
    ///
    /// Completions are applied in arrival order, so the latest one wins.
    pub async fn record_status(&self, name: &str, status: impl Into<String>) -> StateResult<()> {
        let mut triggers = self.triggers.write().await;
        let trigger = triggers
            .get_mut(name)
            .ok_or_else(|| StateError::NotFound(name.to_string()))?;
        trigger.last_notification_status = Some(status.into());
        Ok(())
    }

    /// Read-only copy of every trigger, keyed and ordered by name.
    pub async fn snapshot(&self) -> BTreeMap<String, TriggerSnapshot> {
        let triggers = self.triggers.read().await;
        triggers
            .iter()
            .map(|(name, trigger)| (name.clone(), trigger.snapshot()))
            .collect()
    }

    /// Read-only copy of a single trigger.
    pub async fn get(&self, name: &str) -> Option<TriggerSnapshot> {
        let triggers = self.triggers.read().await;
        triggers.get(name).map(Trigger::snapshot)
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.triggers.read().await.contains_key(name)
    }

    pub async fn len(&self) -> usize {
        self.triggers.read().await.len()
    }
}
