//! deadswitch-monitor — the dead man's switch state machine.
//!
//! A single loop ticks at a fixed cadence (10ms by default). On every
//! tick each trigger goes through two steps inside one registry scan:
//!
//! ```text
//! SwitchMonitor::tick(now)
//!   └── TriggerRegistry::for_each (write lock held)
//!       ├── watcher::observe()        UP ⇄ DOWN transitions
//!       └── scheduler::next_notification()
//!           └── attempts_remaining -= 1, last_notification_epoch = now
//!   └── spawn Notifier::notify() per due notification (lock released)
//!       └── TriggerRegistry::record_status("OK" | error)
//! ```
//!
//! # Cycles
//!
//! A trigger that has not been reset for longer than its delay opens a
//! cycle of `max_attempts` notifications. The first fires on the same
//! tick; each following one waits for more than the notification
//! interval. Failed deliveries count like successful ones. A reset
//! closes the cycle on the next tick, exhausted or not.

pub mod monitor;
pub mod scheduler;
pub mod watcher;

pub use monitor::{SwitchMonitor, TickReport};
pub use scheduler::{describe, next_notification, Notification};
pub use watcher::{observe, Transition};
