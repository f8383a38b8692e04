//! deadswitch-state — the trigger registry for deadswitch.
//!
//! Holds one [`Trigger`] per configured name: its immutable
//! [`TriggerSpec`] plus the mutable cycle bookkeeping driven by the
//! monitor. State is memory-resident only and resets on startup.
//!
//! # Architecture
//!
//! The [`TriggerRegistry`] is `Clone` + `Send` + `Sync` (backed by
//! `Arc<RwLock<..>>`) and is handed explicitly to the API handlers and
//! to the monitor loop. Writers:
//!
//! - `reset()` — the only writer of `last_trigger_epoch`.
//! - `for_each()` — full scan used by the monitor for down/up transitions
//!   and notification bookkeeping.
//! - `record_status()` — delivery completions.

pub mod error;
pub mod registry;
pub mod types;

pub use error::{StateError, StateResult};
pub use registry::TriggerRegistry;
pub use types::*;
