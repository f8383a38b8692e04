//! Configuration error types.

use std::fmt;

use thiserror::Error;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fatal startup configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SECRET must not be empty")]
    EmptySecret,

    #[error("invalid WEBHOOK_URL {url:?}: {reason}")]
    InvalidWebhookUrl { url: String, reason: String },

    #[error("invalid TRIGGERS, expected \"foo:1000,bar:5000:6:10000,[...]\": {0}")]
    InvalidTriggers(TriggerSpecErrors),

    #[error("{field} must be at least 1ms, got {value:?}")]
    InvalidDuration {
        field: &'static str,
        value: std::time::Duration,
    },
}

/// A single field-level problem in the TRIGGERS value.
///
/// `entry` is the 1-based position of the offending entry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TriggerSpecError {
    #[error("entry {entry}: expected 2 or 4 ':'-separated fields, got {fields}")]
    FieldCount { entry: usize, fields: usize },

    #[error("entry {entry}: name {name:?} must be non-empty and use only letters, digits or '_'")]
    InvalidName { entry: usize, name: String },

    #[error("entry {entry}: {field} {value:?} is not a plain decimal number")]
    NotANumber {
        entry: usize,
        field: &'static str,
        value: String,
    },

    #[error("entry {entry}: {field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        entry: usize,
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("entry {entry}: duplicate trigger {name:?}")]
    Duplicate { entry: usize, name: String },
}

/// Every problem found while parsing TRIGGERS, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerSpecErrors(pub Vec<TriggerSpecError>);

impl fmt::Display for TriggerSpecErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}
