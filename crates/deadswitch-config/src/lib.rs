//! deadswitch-config — startup configuration for deadswitch.
//!
//! Turns the raw `SECRET`, `WEBHOOK_URL` and `TRIGGERS` values into a
//! validated [`Settings`]. Any error here is fatal: the daemon refuses
//! to start rather than serve with a partial configuration.
//!
//! # TRIGGERS format
//!
//! ```text
//! backup:86400000,heartbeat:60000:5:300000
//! ^name  ^delay   ^name     ^delay ^attempts ^interval
//! ```
//!
//! Entries without attempts/interval default to one attempt and no
//! interval. All problems found in the string are reported together.

pub mod error;
pub mod settings;
pub mod triggers;

pub use error::{ConfigError, ConfigResult, TriggerSpecError, TriggerSpecErrors};
pub use settings::{Settings, DEFAULT_TICK_INTERVAL, DEFAULT_WEBHOOK_TIMEOUT};
pub use triggers::{is_valid_trigger_name, parse_triggers};
