//! Standalone regression tests.
//!
//! Validates the HTTP surface against a live registry and runs one full
//! down/notify/recover cycle against a real local webhook receiver.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use tokio::sync::{mpsc, watch};
use tower::ServiceExt;

use deadswitch_api::{build_router, ApiState};
use deadswitch_monitor::SwitchMonitor;
use deadswitch_notify::{WebhookClient, WebhookNotifier, WebhookPayload};
use deadswitch_state::*;

const SECRET: &str = "s3cret";

fn test_registry() -> TriggerRegistry {
    TriggerRegistry::new(
        vec![
            TriggerSpec::new("backup", 60_000),
            TriggerSpec::new("cron", 1_000).with_attempts(3, 500),
        ],
        1_000,
    )
    .unwrap()
}

fn test_router(registry: TriggerRegistry) -> Router {
    build_router(ApiState::new(registry, SECRET))
}

async fn send(router: Router, method: &str, uri: &str) -> Response {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    router.oneshot(req).await.unwrap()
}

async fn body_text(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ── Reset endpoint ─────────────────────────────────────────────

#[tokio::test]
async fn standalone_reset_known_trigger() {
    let registry = test_registry();
    let router = test_router(registry.clone());

    let resp = send(router, "POST", "/trigger/backup/with/key/s3cret").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_text(resp).await,
        "Congratulations! You've fired the backup event"
    );

    let snap = registry.get("backup").await.unwrap();
    assert!(snap.last_trigger_epoch > 1_000);
}

#[tokio::test]
async fn standalone_reset_wrong_key() {
    let registry = test_registry();
    let router = test_router(registry.clone());

    let resp = send(router, "POST", "/trigger/backup/with/key/guess").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_text(resp).await, "Forbidden");

    assert_eq!(registry.get("backup").await.unwrap().last_trigger_epoch, 1_000);
}

#[tokio::test]
async fn standalone_reset_unknown_trigger() {
    let router = test_router(test_registry());

    let resp = send(router, "POST", "/trigger/nope/with/key/s3cret").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(resp).await, "There is no such trigger");
}

#[tokio::test]
async fn standalone_reset_secret_may_contain_slashes() {
    let registry = TriggerRegistry::new(vec![TriggerSpec::new("backup", 60_000)], 1_000).unwrap();
    let router = build_router(ApiState::new(registry.clone(), "a/b/c"));

    let resp = send(router, "POST", "/trigger/backup/with/key/a/b/c").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(registry.get("backup").await.unwrap().last_trigger_epoch > 1_000);
}

#[tokio::test]
async fn standalone_reset_secret_is_not_percent_decoded() {
    let registry = TriggerRegistry::new(vec![TriggerSpec::new("backup", 60_000)], 1_000).unwrap();
    let router = build_router(ApiState::new(registry.clone(), "ab%41"));

    let resp = send(router.clone(), "POST", "/trigger/backup/with/key/abA").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(registry.get("backup").await.unwrap().last_trigger_epoch, 1_000);

    let resp = send(router, "POST", "/trigger/backup/with/key/ab%41").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(registry.get("backup").await.unwrap().last_trigger_epoch > 1_000);
}

#[tokio::test]
async fn standalone_malformed_posts_are_bad_requests() {
    let router = test_router(test_registry());

    for uri in [
        "/trigger/backup",
        "/trigger/backup/with/key",
        "/trigger/bad-name/with/key/s3cret",
        "/somewhere/else",
    ] {
        let resp = send(router.clone(), "POST", uri).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_text(resp).await, format!("Cannot POST {uri}"));
    }
}

#[tokio::test]
async fn standalone_other_methods_are_bad_requests() {
    let router = test_router(test_registry());

    let resp = send(router, "DELETE", "/").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "Unknown request");
}

// ── Inspection endpoint ────────────────────────────────────────

#[tokio::test]
async fn standalone_health_without_key() {
    let router = test_router(test_registry());

    let resp = send(router, "GET", "/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Your Dead Person's Switch is working");
}

#[tokio::test]
async fn standalone_state_dump_requires_key() {
    let router = test_router(test_registry());

    let resp = send(router.clone(), "GET", "/?key=guess").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body = body_text(resp).await;
    assert!(!body.contains("backup"));

    let resp = send(router.clone(), "GET", "/?key=").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send(router, "GET", "/?key=guess&key=s3cret").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_text(resp).await, "Forbidden");
}

#[tokio::test]
async fn standalone_state_dump_with_key() {
    let router = test_router(test_registry());

    let resp = send(router, "GET", "/?key=s3cret").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "application/json");

    let json: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(json["backup"]["delayMs"], 60_000);
    assert_eq!(json["cron"]["maxAttempts"], 3);
    assert_eq!(json["cron"]["notificationIntervalMs"], 500);
    assert_eq!(json["cron"]["lastTriggerEpoch"], 1_000);
    assert!(json["cron"]["attemptsRemaining"].is_null());
    assert!(json["cron"]["lastNotificationStatus"].is_null());
}

#[tokio::test]
async fn standalone_get_on_any_path_is_inspection() {
    let router = test_router(test_registry());

    let resp = send(router.clone(), "GET", "/status").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Your Dead Person's Switch is working");

    let resp = send(router, "GET", "/trigger/backup/with/key/s3cret").await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// ── Full cycle ─────────────────────────────────────────────────

async fn spawn_webhook_receiver() -> (SocketAddr, mpsc::UnboundedReceiver<WebhookPayload>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let router = Router::new()
        .route(
            "/hook",
            post(
                |State(tx): State<mpsc::UnboundedSender<WebhookPayload>>,
                 Json(body): Json<WebhookPayload>| async move {
                    let _ = tx.send(body);
                },
            ),
        )
        .with_state(tx);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, rx)
}

#[tokio::test]
async fn standalone_down_notify_and_recover() {
    let (addr, mut hooks) = spawn_webhook_receiver().await;

    let registry = TriggerRegistry::new(
        vec![TriggerSpec::new("job", 50).with_attempts(2, 100)],
        epoch_millis(),
    )
    .unwrap();
    let notifier = WebhookNotifier::new(
        WebhookClient::new().unwrap(),
        format!("http://{addr}/hook").parse().unwrap(),
        Duration::from_secs(2),
    );
    let monitor = SwitchMonitor::new(registry.clone(), Arc::new(notifier), Duration::from_millis(10));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = monitor.spawn(shutdown_rx);
    let router = test_router(registry.clone());

    let first = tokio::time::timeout(Duration::from_secs(2), hooks.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.value1, "job");
    assert_eq!(first.value2, "1st notification");

    let second = tokio::time::timeout(Duration::from_secs(2), hooks.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.value2, "2nd and final notification");

    // Let the completion land, then check the dump.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let resp = send(router.clone(), "GET", "/?key=s3cret").await;
    let json: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(json["job"]["attemptsRemaining"], 0);
    assert_eq!(json["job"]["lastNotificationStatus"], "OK");

    // Recover.
    let resp = send(router.clone(), "POST", "/trigger/job/with/key/s3cret").await;
    assert_eq!(resp.status(), StatusCode::OK);
    tokio::time::sleep(Duration::from_millis(30)).await;

    let snap = registry.get("job").await.unwrap();
    assert_eq!(snap.attempts_remaining, None);
    assert_eq!(snap.last_notification_epoch, None);
    assert!(hooks.try_recv().is_err());

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
}
