//! deadswitch-notify — outbound webhook delivery.
//!
//! One call to [`WebhookClient::post`] issues exactly one HTTP(S) POST
//! and resolves to exactly one outcome: `Ok(())` for a 2xx response
//! (body drained and discarded) or a [`DeliveryError`] for a non-2xx
//! status, a transport failure or the timeout. Nothing is retried here.
//!
//! The monitor talks to delivery through the [`Notifier`] trait so that
//! tests can substitute a recording implementation.

pub mod client;
pub mod error;

pub use client::{BoxFuture, Notifier, WebhookClient, WebhookNotifier, WebhookPayload};
pub use error::{DeliveryError, DeliveryResult};
