//! Down/up detection for a single trigger.

use deadswitch_state::{EpochMillis, Trigger};
use tracing::{info, warn};

/// A state change produced by [`observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No reset for longer than the delay; a new cycle was opened.
    Down { down_for_ms: u64 },
    /// Reset seen again; the cycle (if any) was cancelled.
    Up,
}

/// Flip `trigger` between UP and DOWN based on the time since its last
/// reset. Returns the transition, or `None` if the state is unchanged.
///
/// Opening a cycle arms `max_attempts` notifications. Recovery clears
/// the cycle regardless of how many attempts remain.
pub fn observe(trigger: &mut Trigger, now: EpochMillis) -> Option<Transition> {
    // A reset stamped after `now` was captured counts as zero downtime.
    let down_for_ms = now.saturating_sub(trigger.last_trigger_epoch());

    if down_for_ms > trigger.spec().delay_ms {
        if trigger.attempts_remaining.is_some() {
            return None;
        }
        trigger.attempts_remaining = Some(trigger.spec().max_attempts);
        warn!(trigger = %trigger.name(), at = now, down_for_ms, "DOWN");
        Some(Transition::Down { down_for_ms })
    } else {
        trigger.attempts_remaining.take()?;
        trigger.last_notification_epoch = None;
        info!(trigger = %trigger.name(), at = now, "UP");
        Some(Transition::Up)
    }
}
