//! Rate-limited notification bursts within an open cycle.

use deadswitch_notify::WebhookPayload;
use deadswitch_state::{EpochMillis, Trigger};

/// A notification that is due and has already been booked against the
/// trigger's cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub trigger: String,
    /// 1-based position within the cycle.
    pub index: u32,
    /// Whether this is the last attempt of the cycle.
    pub is_final: bool,
    pub description: String,
    pub dispatched_at: EpochMillis,
}

impl Notification {
    pub fn payload(&self) -> WebhookPayload {
        WebhookPayload {
            value1: self.trigger.clone(),
            value2: self.description.clone(),
        }
    }
}

/// Book the next notification for `trigger` if one is due at `now`.
///
/// A notification is due when the trigger is DOWN with attempts left and
/// either none has been sent yet in this cycle or more than the
/// notification interval has passed since the last one. The attempt is
/// consumed here, before anything is sent, so a hung delivery can never
/// cause a duplicate on the next tick.
pub fn next_notification(trigger: &mut Trigger, now: EpochMillis) -> Option<Notification> {
    let remaining = trigger.attempts_remaining.filter(|&n| n > 0)?;

    let due = match trigger.last_notification_epoch {
        None => true,
        Some(last) => now.saturating_sub(last) > trigger.spec().notification_interval_ms,
    };
    if !due {
        return None;
    }

    let remaining = remaining - 1;
    trigger.attempts_remaining = Some(remaining);
    trigger.last_notification_epoch = Some(now);

    let index = trigger.spec().max_attempts.saturating_sub(remaining);
    let is_final = remaining == 0;

    Some(Notification {
        trigger: trigger.name().to_string(),
        index,
        is_final,
        description: describe(index, is_final),
        dispatched_at: now,
    })
}

/// "1st notification", "2nd notification", ..., "5th and final notification".
pub fn describe(index: u32, is_final: bool) -> String {
    let ordinal = match index {
        1 => "1st".to_string(),
        2 => "2nd".to_string(),
        3 => "3rd".to_string(),
        n => format!("{n}th"),
    };

    if is_final {
        format!("{ordinal} and final notification")
    } else {
        format!("{ordinal} notification")
    }
}
