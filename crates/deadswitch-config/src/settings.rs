//! Validated startup settings.

use std::time::Duration;

use deadswitch_state::TriggerSpec;
use http::Uri;

use crate::error::{ConfigError, ConfigResult};
use crate::triggers::parse_triggers;

/// How often the monitor scans the registry.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Hard limit for a single webhook delivery.
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_millis(5000);

/// Everything the daemon needs besides its listen address.
#[derive(Debug, Clone)]
pub struct Settings {
    pub secret: String,
    pub webhook_url: Uri,
    pub triggers: Vec<TriggerSpec>,
    pub tick_interval: Duration,
    pub webhook_timeout: Duration,
}

impl Settings {
    /// Validate raw configuration values.
    pub fn new(secret: &str, webhook_url: &str, triggers: &str) -> ConfigResult<Self> {
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        let webhook_url = parse_webhook_url(webhook_url)?;
        let triggers = parse_triggers(triggers).map_err(ConfigError::InvalidTriggers)?;

        Ok(Self {
            secret: secret.to_string(),
            webhook_url,
            triggers,
            tick_interval: DEFAULT_TICK_INTERVAL,
            webhook_timeout: DEFAULT_WEBHOOK_TIMEOUT,
        })
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> ConfigResult<Self> {
        self.tick_interval = require_positive("tick interval", interval)?;
        Ok(self)
    }

    pub fn with_webhook_timeout(mut self, timeout: Duration) -> ConfigResult<Self> {
        self.webhook_timeout = require_positive("webhook timeout", timeout)?;
        Ok(self)
    }
}

fn require_positive(field: &'static str, value: Duration) -> ConfigResult<Duration> {
    if value < Duration::from_millis(1) {
        return Err(ConfigError::InvalidDuration { field, value });
    }
    Ok(value)
}

fn parse_webhook_url(raw: &str) -> ConfigResult<Uri> {
    let invalid = |reason: &str| ConfigError::InvalidWebhookUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let uri = raw.parse::<Uri>().map_err(|e| invalid(&e.to_string()))?;

    match uri.scheme_str() {
        Some("http") | Some("https") => {}
        Some(_) => return Err(invalid("scheme must be http or https")),
        None => return Err(invalid("missing scheme")),
    }

    if uri.host().is_none_or(str::is_empty) {
        return Err(invalid("missing host"));
    }

    Ok(uri)
}
