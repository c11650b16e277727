use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Client, ClientBuilder};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[cfg(test)]
use mockall::automock;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Request timeout: {0}")]
    RequestTimeout(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Decides whether a raw I/O error is worth one immediate re-send before the
/// failure is surfaced to the delivery controller's backoff loop.
pub type TransientClassifier = Arc<dyn Fn(&reqwest::Error) -> bool + Send + Sync>;

/// Default classifier: connection-level failures a fresh socket can fix.
/// Timeouts are excluded; sustained slowness belongs to the controller's
/// backoff, not an immediate re-send.
pub fn default_transient_classifier(error: &reqwest::Error) -> bool {
    !error.is_timeout() && (error.is_connect() || error.is_request())
}

#[derive(Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub connection_timeout: Duration,
    pub max_connections: usize,
    pub keep_alive_timeout: Duration,
    pub user_agent: String,
    pub retry_transient_once: bool,
    pub transient_classifier: TransientClassifier,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            max_connections: 20,
            keep_alive_timeout: Duration::from_secs(60),
            user_agent: format!("telemetry-sender/{}", env!("CARGO_PKG_VERSION")),
            retry_transient_once: true,
            transient_classifier: Arc::new(default_transient_classifier),
        }
    }
}

impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("timeout", &self.timeout)
            .field("connection_timeout", &self.connection_timeout)
            .field("max_connections", &self.max_connections)
            .field("keep_alive_timeout", &self.keep_alive_timeout)
            .field("user_agent", &self.user_agent)
            .field("retry_transient_once", &self.retry_transient_once)
            .finish_non_exhaustive()
    }
}

/// One wire request handed to an [`HttpPoster`]. Everything is owned so
/// the same request can be rebuilt cheaply for retries.
#[derive(Debug, Clone)]
pub struct PostRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub media_type: String,
}

/// Status, body and headers of a completed request. Carried through to the
/// caller on success and on permanent failure for diagnostics.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
    pub headers: HeaderMap,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Pluggable network client. No status interpretation happens here; the
/// transport only performs the request and the one-shot transient retry.
#[cfg_attr(test, automock)]
pub trait HttpPoster: Send + Sync {
    fn post(
        &self,
        request: PostRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

#[derive(Debug, Clone)]
pub struct ConnectionStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub transient_retries: u64,
}

#[derive(Debug, Default)]
struct PosterStats {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    transient_retries: AtomicU64,
}

/// Production transport over a pooled reqwest client. The client is
/// internally synchronized, so one poster can serve concurrent sends.
#[derive(Clone)]
pub struct ReqwestPoster {
    client: Client,
    config: TransportConfig,
    stats: Arc<PosterStats>,
}

impl ReqwestPoster {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connection_timeout)
            .pool_max_idle_per_host(config.max_connections)
            .pool_idle_timeout(config.keep_alive_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                TransportError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            config,
            stats: Arc::new(PosterStats::default()),
        })
    }

    pub fn connection_stats(&self) -> ConnectionStats {
        ConnectionStats {
            total_requests: self.stats.total_requests.load(Ordering::Relaxed),
            successful_requests: self.stats.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.stats.failed_requests.load(Ordering::Relaxed),
            transient_retries: self.stats.transient_retries.load(Ordering::Relaxed),
        }
    }

    async fn execute(&self, request: &PostRequest) -> Result<HttpResponse, reqwest::Error> {
        let response = self
            .client
            .post(request.url.clone())
            .headers(request.headers.clone())
            .header(CONTENT_TYPE, request.media_type.as_str())
            .body(request.body.clone())
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
            headers,
        })
    }
}

impl HttpPoster for ReqwestPoster {
    async fn post(&self, request: PostRequest) -> Result<HttpResponse, TransportError> {
        self.stats.total_requests.fetch_add(1, Ordering::Relaxed);

        let mut retried = false;
        loop {
            match self.execute(&request).await {
                Ok(response) => {
                    if response.is_success() {
                        self.stats.successful_requests.fetch_add(1, Ordering::Relaxed);
                    } else {
                        self.stats.failed_requests.fetch_add(1, Ordering::Relaxed);
                    }
                    return Ok(response);
                }
                Err(error) => {
                    // One immediate re-send on a transient socket failure; a
                    // second failure goes upstairs to the backoff loop.
                    if !retried
                        && self.config.retry_transient_once
                        && (self.config.transient_classifier)(&error)
                    {
                        debug!(%error, "transient I/O error, re-sending once");
                        self.stats.transient_retries.fetch_add(1, Ordering::Relaxed);
                        retried = true;
                        continue;
                    }
                    self.stats.failed_requests.fetch_add(1, Ordering::Relaxed);
                    return Err(into_transport_error(error));
                }
            }
        }
    }
}

impl fmt::Debug for ReqwestPoster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestPoster")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

fn into_transport_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::RequestTimeout(error.to_string())
    } else if error.is_connect() {
        TransportError::ConnectionFailed(error.to_string())
    } else {
        TransportError::Network(error)
    }
}
