//! deadswitchd — the deadswitch daemon.
//!
//! Single binary that assembles all deadswitch subsystems:
//! - Trigger registry (memory only, reset on every start)
//! - Switch monitor (down watcher + notification scheduler)
//! - Webhook client
//! - HTTP API
//!
//! # Usage
//!
//! ```text
//! SECRET=hunter2 PORT=8080 \
//! TRIGGERS=backup:86400000,heartbeat:60000:5:300000 \
//! WEBHOOK_URL=https://maker.ifttt.com/trigger/dead/with/key/abc \
//! deadswitchd
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use deadswitch_api::{build_router, ApiState};
use deadswitch_config::Settings;
use deadswitch_monitor::SwitchMonitor;
use deadswitch_notify::{WebhookClient, WebhookNotifier};
use deadswitch_state::{epoch_millis, TriggerRegistry};

const DEFAULT_LOG_FILTER: &str = "info,deadswitchd=debug,deadswitch_monitor=debug";

#[derive(Parser)]
#[command(name = "deadswitchd", version, about = "Dead man's switch daemon")]
struct Cli {
    /// Shared secret expected in reset paths and inspection queries.
    #[arg(long, env = "SECRET", hide_env_values = true)]
    secret: String,

    /// Port to listen on.
    #[arg(long, env = "PORT")]
    port: u16,

    /// Address to bind.
    #[arg(long = "host", env = "HOSTNAME", default_value = "0.0.0.0")]
    host: String,

    /// Trigger list: `name:delayMs[:attempts:intervalMs],...`.
    #[arg(long, env = "TRIGGERS")]
    triggers: String,

    /// Webhook notified when a trigger goes down.
    #[arg(long, env = "WEBHOOK_URL")]
    webhook_url: String,

    /// Monitor tick interval in milliseconds.
    #[arg(long, env = "TICK_INTERVAL_MS", default_value = "10")]
    tick_interval_ms: u64,

    /// Per-delivery webhook timeout in milliseconds.
    #[arg(long, env = "WEBHOOK_TIMEOUT_MS", default_value = "5000")]
    webhook_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::new(&cli.secret, &cli.webhook_url, &cli.triggers)
        .and_then(|s| s.with_tick_interval(Duration::from_millis(cli.tick_interval_ms)))
        .and_then(|s| s.with_webhook_timeout(Duration::from_millis(cli.webhook_timeout_ms)))
        .context("invalid configuration")?;

    info!(
        "config:\n{}",
        serde_json::to_string_pretty(&settings.triggers)?
    );

    // ── Initialize subsystems ──────────────────────────────────

    let registry = TriggerRegistry::new(settings.triggers.clone(), epoch_millis())?;
    info!(triggers = registry.len().await, "trigger registry initialized");

    let client = WebhookClient::new().context("failed to build webhook client")?;
    let notifier = Arc::new(WebhookNotifier::new(
        client,
        settings.webhook_url.clone(),
        settings.webhook_timeout,
    ));
    info!(
        host = settings.webhook_url.host().unwrap_or_default(),
        timeout_ms = settings.webhook_timeout.as_millis() as u64,
        "webhook client initialized"
    );

    let monitor = SwitchMonitor::new(registry.clone(), notifier, settings.tick_interval);

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown = shutdown_signal()?;

    // ── Start background tasks ─────────────────────────────────

    let monitor_handle = monitor.spawn(shutdown_rx);

    // ── Start API server ───────────────────────────────────────

    let router = build_router(ApiState::new(registry, settings.secret.as_str()));
    let listener = tokio::net::TcpListener::bind((cli.host.as_str(), cli.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", cli.host, cli.port))?;

    info!(addr = %listener.local_addr()?, "API server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let signal = shutdown.await;
            info!(%signal, "shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    let _ = monitor_handle.await;

    info!("deadswitchd stopped");
    Ok(())
}

/// Resolve with the name of the first SIGINT, SIGTERM or SIGHUP.
///
/// Handlers are installed eagerly so that failures surface at startup.
#[cfg(unix)]
fn shutdown_signal() -> anyhow::Result<impl std::future::Future<Output = &'static str>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt()).context("failed to install SIGINT handler")?;
    let mut terminate = signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
    let mut hangup = signal(SignalKind::hangup()).context("failed to install SIGHUP handler")?;

    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
            _ = hangup.recv() => "SIGHUP",
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> anyhow::Result<impl std::future::Future<Output = &'static str>> {
    Ok(async {
        let _ = tokio::signal::ctrl_c().await;
        "ctrl-c"
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_accepts_flags() {
        let cli = Cli::try_parse_from([
            "deadswitchd",
            "--secret",
            "s3cret",
            "--port",
            "8080",
            "--host",
            "127.0.0.1",
            "--triggers",
            "backup:1000",
            "--webhook-url",
            "http://127.0.0.1:9/hook",
            "--tick-interval-ms",
            "20",
        ])
        .unwrap();

        assert_eq!(cli.port, 8080);
        assert_eq!(cli.host, "127.0.0.1");
        assert_eq!(cli.tick_interval_ms, 20);
        assert_eq!(cli.webhook_timeout_ms, 5000);
    }
}
