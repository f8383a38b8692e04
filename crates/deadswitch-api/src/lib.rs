//! deadswitch-api — HTTP surface for deadswitch.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/trigger/{name}/with/key/{secret}` | Reset a trigger |
//! | GET | `/` | Health string |
//! | GET | `/?key={secret}` | JSON dump of every trigger |
//!
//! Any other GET path is answered like `GET /`. Unmatched POSTs and
//! other methods get a 400.

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use deadswitch_state::TriggerRegistry;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub registry: TriggerRegistry,
    pub secret: Arc<str>,
}

impl ApiState {
    pub fn new(registry: TriggerRegistry, secret: impl Into<Arc<str>>) -> Self {
        Self {
            registry,
            secret: secret.into(),
        }
    }

    /// Opaque comparison against the configured secret.
    pub fn authorized(&self, candidate: &str) -> bool {
        *self.secret == *candidate
    }
}

/// Build the complete router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(handlers::status).fallback(handlers::fallback))
        .route(
            "/trigger/{name}/with/key/{*secret}",
            post(handlers::reset_trigger).fallback(handlers::fallback),
        )
        .fallback(handlers::fallback)
        .with_state(state)
}
