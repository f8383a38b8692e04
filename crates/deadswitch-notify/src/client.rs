//! Webhook client and the `Notifier` seam used by the monitor.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use http::{Method, Request, Uri};
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DeliveryError, DeliveryResult};

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

const USER_AGENT_VALUE: &str = concat!("deadswitch/", env!("CARGO_PKG_VERSION"));

/// JSON body sent for every notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookPayload {
    /// Trigger name.
    pub value1: String,
    /// Human-readable description, e.g. "2nd notification".
    pub value2: String,
}

/// Delivers one notification and reports its single outcome.
///
/// The returned future owns everything it needs, so callers can spawn
/// it and forget about the notifier.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, payload: WebhookPayload) -> BoxFuture<DeliveryResult>;
}

/// HTTP(S) client for webhook POSTs. Cheap to clone.
#[derive(Clone)]
pub struct WebhookClient {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl WebhookClient {
    /// Build a client that speaks plain HTTP or HTTPS depending on the
    /// URL scheme, verifying TLS peers against the webpki roots.
    pub fn new() -> Result<Self, DeliveryError> {
        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())
            .map_err(|e| DeliveryError::Tls(e.to_string()))?
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(TokioExecutor::new()).build(connector);
        Ok(Self { client })
    }

    /// POST `body` as JSON to `url`, giving up after `timeout`.
    ///
    /// The timeout covers connecting, sending and draining the response.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        url: &Uri,
        body: &T,
        timeout: Duration,
    ) -> DeliveryResult {
        let body = serde_json::to_vec(body).map_err(|e| DeliveryError::Encode(e.to_string()))?;

        let req = Request::builder()
            .method(Method::POST)
            .uri(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, body.len())
            .header(USER_AGENT, USER_AGENT_VALUE)
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| DeliveryError::Request(e.to_string()))?;

        let exchange = async {
            let resp = self
                .client
                .request(req)
                .await
                .map_err(|e| DeliveryError::Transport(error_chain(&e)))?;

            let status = resp.status();
            if !status.is_success() {
                debug!(%status, %url, "webhook returned non-2xx");
                return Err(DeliveryError::Status(status));
            }

            resp.into_body()
                .collect()
                .await
                .map_err(|e| DeliveryError::Transport(error_chain(&e)))?;
            Ok(())
        };

        match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result,
            Err(_) => {
                debug!(%url, "webhook timed out");
                Err(DeliveryError::Timeout(timeout))
            }
        }
    }
}

/// A [`Notifier`] that posts every payload to one fixed webhook URL.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: WebhookClient,
    url: Uri,
    timeout: Duration,
}

impl WebhookNotifier {
    pub fn new(client: WebhookClient, url: Uri, timeout: Duration) -> Self {
        Self {
            client,
            url,
            timeout,
        }
    }

    pub fn url(&self) -> &Uri {
        &self.url
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, payload: WebhookPayload) -> BoxFuture<DeliveryResult> {
        let this = self.clone();
        Box::pin(async move { this.client.post(&this.url, &payload, this.timeout).await })
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
