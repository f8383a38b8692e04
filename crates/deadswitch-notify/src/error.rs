//! Delivery error types.

use std::time::Duration;

use http::StatusCode;
use thiserror::Error;

/// Result of a single webhook delivery.
pub type DeliveryResult = Result<(), DeliveryError>;

/// Why a webhook delivery failed. The `Display` text is what ends up in
/// a trigger's `last_notification_status`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Non-2XX Status Code: {0}")]
    Status(StatusCode),

    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to encode payload: {0}")]
    Encode(String),

    #[error("failed to build request: {0}")]
    Request(String),

    #[error("tls setup failed: {0}")]
    Tls(String),
}
