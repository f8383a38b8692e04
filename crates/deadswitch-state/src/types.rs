//! Domain types for the trigger registry.
//!
//! All timestamps are Unix epoch milliseconds. Durations are stored as
//! plain millisecond counts so that the state machine can be driven with
//! explicit clock values.

use serde::{Deserialize, Serialize};

/// Unique identifier for a trigger.
pub type TriggerName = String;

/// Unix timestamp in milliseconds.
pub type EpochMillis = u64;

// ── Configuration ──────────────────────────────────────────────────

/// Static configuration of a single trigger, fixed at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TriggerSpec {
    pub name: TriggerName,
    /// Time without a reset before the trigger is considered down.
    pub delay_ms: u64,
    /// Total notifications sent per down cycle. Always at least 1.
    pub max_attempts: u32,
    /// Minimum gap between consecutive notifications of one cycle.
    pub notification_interval_ms: u64,
}

impl TriggerSpec {
    /// A spec with the short-form defaults: one attempt, no interval.
    pub fn new(name: impl Into<String>, delay_ms: u64) -> Self {
        Self {
            name: name.into(),
            delay_ms,
            max_attempts: 1,
            notification_interval_ms: 0,
        }
    }

    pub fn with_attempts(mut self, max_attempts: u32, notification_interval_ms: u64) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.notification_interval_ms = notification_interval_ms;
        self
    }
}

// ── Live state ─────────────────────────────────────────────────────

/// A configured trigger together with its mutable cycle state.
///
/// `attempts_remaining` is `None` exactly while the trigger is UP. While
/// `Some`, it only ever decreases. `last_trigger_epoch` can only be
/// changed through [`TriggerRegistry::reset`](crate::TriggerRegistry::reset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    spec: TriggerSpec,
    last_trigger_epoch: EpochMillis,
    /// Notifications left in the current down cycle.
    pub attempts_remaining: Option<u32>,
    /// When the most recent notification of the current cycle was sent.
    pub last_notification_epoch: Option<EpochMillis>,
    /// "OK" or the error text of the last completed delivery.
    pub last_notification_status: Option<String>,
}

impl Trigger {
    /// Create a trigger that counts as freshly reset at `now`.
    pub fn new(spec: TriggerSpec, now: EpochMillis) -> Self {
        Self {
            spec,
            last_trigger_epoch: now,
            attempts_remaining: None,
            last_notification_epoch: None,
            last_notification_status: None,
        }
    }

    pub fn spec(&self) -> &TriggerSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn last_trigger_epoch(&self) -> EpochMillis {
        self.last_trigger_epoch
    }

    /// Whether a down cycle is open (possibly already exhausted).
    pub fn is_down(&self) -> bool {
        self.attempts_remaining.is_some()
    }

    pub(crate) fn touch(&mut self, now: EpochMillis) {
        self.last_trigger_epoch = now;
    }

    /// Read-only copy for the inspection endpoint.
    pub fn snapshot(&self) -> TriggerSnapshot {
        TriggerSnapshot {
            name: self.spec.name.clone(),
            delay_ms: self.spec.delay_ms,
            max_attempts: self.spec.max_attempts,
            notification_interval_ms: self.spec.notification_interval_ms,
            last_trigger_epoch: self.last_trigger_epoch,
            attempts_remaining: self.attempts_remaining,
            last_notification_epoch: self.last_notification_epoch,
            last_notification_status: self.last_notification_status.clone(),
        }
    }
}

/// Point-in-time view of a trigger, as exposed by the inspection endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TriggerSnapshot {
    pub name: TriggerName,
    pub delay_ms: u64,
    pub max_attempts: u32,
    pub notification_interval_ms: u64,
    pub last_trigger_epoch: EpochMillis,
    pub attempts_remaining: Option<u32>,
    pub last_notification_epoch: Option<EpochMillis>,
    pub last_notification_status: Option<String>,
}

// ── Clock ──────────────────────────────────────────────────────────

/// Current wall-clock time in Unix epoch milliseconds.
pub fn epoch_millis() -> EpochMillis {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
