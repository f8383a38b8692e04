//! HTTP handlers.
//!
//! Responses are plain text except for the state dump, which is JSON.
//! A rejected request never touches the registry.

use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use deadswitch_config::is_valid_trigger_name;
use deadswitch_state::epoch_millis;
use tracing::{debug, error, info};

use crate::ApiState;

const HEALTH_TEXT: &str = "Your Dead Person's Switch is working";

/// Query string accepted by the inspection endpoint, as raw pairs.
///
/// Pairs are kept in order so a repeated `key` can be told apart from a
/// single one.
pub type StatusQuery = Vec<(String, String)>;

/// Outcome of reading `key` from a [`StatusQuery`].
#[derive(Debug, PartialEq, Eq)]
enum KeyParam<'a> {
    Absent,
    One(&'a str),
    Repeated,
}

fn key_param(query: &StatusQuery) -> KeyParam<'_> {
    let mut keys = query.iter().filter(|(k, _)| k == "key").map(|(_, v)| v.as_str());
    match (keys.next(), keys.next()) {
        (None, _) => KeyParam::Absent,
        (Some(key), None) => KeyParam::One(key),
        (Some(_), Some(_)) => KeyParam::Repeated,
    }
}

/// Split `/trigger/{name}/with/key/{secret}` without percent-decoding.
fn reset_params(path: &str) -> Option<(&str, &str)> {
    path.strip_prefix("/trigger/")?.split_once("/with/key/")
}

fn text(status: StatusCode, body: impl Into<String>) -> Response {
    (status, body.into()).into_response()
}

fn cannot_post(uri: &Uri) -> Response {
    let path = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());
    text(StatusCode::BAD_REQUEST, format!("Cannot POST {path}"))
}

// ── Reset ──────────────────────────────────────────────────────

/// POST /trigger/{name}/with/key/{secret}
///
/// Name and secret are read from the raw request path, so the secret is
/// compared exactly as the caller sent it.
pub async fn reset_trigger(State(state): State<ApiState>, uri: Uri) -> Response {
    let Some((name, secret)) = reset_params(uri.path()) else {
        return cannot_post(&uri);
    };
    if !is_valid_trigger_name(name) || secret.is_empty() {
        return cannot_post(&uri);
    }

    if !state.authorized(secret) {
        debug!(trigger = %name, "reset rejected: bad key");
        return text(StatusCode::FORBIDDEN, "Forbidden");
    }

    let now = epoch_millis();
    match state.registry.reset(name, now).await {
        Ok(()) => {
            info!(trigger = %name, at = now, "trigger reset");
            text(
                StatusCode::OK,
                format!("Congratulations! You've fired the {name} event"),
            )
        }
        // Lookup is the only way a reset can fail.
        Err(e) => {
            debug!(trigger = %name, error = %e, "reset rejected");
            text(StatusCode::NOT_FOUND, "There is no such trigger")
        }
    }
}

// ── Inspection ─────────────────────────────────────────────────

/// GET /?key={secret}
pub async fn status(State(state): State<ApiState>, Query(query): Query<StatusQuery>) -> Response {
    match key_param(&query) {
        KeyParam::Absent => return text(StatusCode::OK, HEALTH_TEXT),
        KeyParam::One(key) if state.authorized(key) => {}
        // A repeated key never matches, whatever its values.
        KeyParam::One(_) | KeyParam::Repeated => return text(StatusCode::FORBIDDEN, "Forbidden"),
    }

    let snapshot = state.registry.snapshot().await;
    match serde_json::to_string_pretty(&snapshot) {
        Ok(body) => (StatusCode::OK, [(CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode trigger state");
            text(StatusCode::INTERNAL_SERVER_ERROR, "failed to encode trigger state")
        }
    }
}

// ── Everything else ────────────────────────────────────────────

/// GET on any path behaves like `GET /`; anything else is a bad request.
pub async fn fallback(State(state): State<ApiState>, method: Method, uri: Uri) -> Response {
    match method {
        Method::GET => match Query::<StatusQuery>::try_from_uri(&uri) {
            Ok(query) => status(State(state), query).await,
            Err(e) => text(StatusCode::BAD_REQUEST, e.body_text()),
        },
        Method::POST => cannot_post(&uri),
        _ => text(StatusCode::BAD_REQUEST, "Unknown request"),
    }
}
