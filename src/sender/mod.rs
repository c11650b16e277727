pub mod client;
pub mod delivery;
pub mod response;

pub use client::{
    ConnectionStats, HttpPoster, HttpResponse, PostRequest, ReqwestPoster, TransientClassifier,
    TransportConfig, TransportError, default_transient_classifier,
};
pub use delivery::{
    BatchResult, DeliveryConfig, DeliveryController, DeliveryError, DeliveryReport, JSON_MEDIA_TYPE,
    RetryCause,
};
pub use response::{Disposition, classify};

use crate::domain::{EventBatch, MetricBatch, SpanBatch};
use crate::reliability::{Clock, RetryConfig, TokioClock};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Supplies authentication headers for every request. Implementations may
/// rotate credentials between calls; the controller asks again on each
/// attempt.
pub trait CredentialProvider: Send + Sync {
    fn auth_headers(&self) -> HeaderMap;
}

/// `Api-Key` header credentials, the default scheme.
pub struct ApiKeyCredentials {
    api_key: HeaderValue,
}

impl ApiKeyCredentials {
    pub fn new(api_key: &str) -> Result<Self, TransportError> {
        let mut value = HeaderValue::from_str(api_key)
            .map_err(|e| TransportError::InvalidConfiguration(format!("Invalid API key: {e}")))?;
        value.set_sensitive(true);
        Ok(Self { api_key: value })
    }
}

impl CredentialProvider for ApiKeyCredentials {
    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("api-key"), self.api_key.clone());
        headers
    }
}

#[derive(Debug, Clone)]
pub struct SenderConfig {
    pub metric_endpoint: String,
    pub span_endpoint: String,
    pub event_endpoint: String,
    pub api_key: String,
    pub compress_payload: bool,
    pub retry: RetryConfig,
    pub transport: TransportConfig,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            metric_endpoint: "http://localhost:9610/metric/v1".to_string(),
            span_endpoint: "http://localhost:9610/trace/v1".to_string(),
            event_endpoint: "http://localhost:9610/event/v1".to_string(),
            api_key: String::new(),
            compress_payload: false,
            retry: RetryConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

/// Public entry point: one delivery pipeline per telemetry kind over a
/// shared transport. Cheap to clone and safe to use from concurrent tasks.
#[derive(Clone)]
pub struct TelemetrySender<P = ReqwestPoster, C = TokioClock> {
    metrics: Arc<DeliveryController<P, C>>,
    spans: Arc<DeliveryController<P, C>>,
    events: Arc<DeliveryController<P, C>>,
}

impl TelemetrySender {
    pub fn new(config: SenderConfig) -> Result<Self, TransportError> {
        let poster = Arc::new(ReqwestPoster::new(config.transport.clone())?);
        let credentials: Arc<dyn CredentialProvider> =
            Arc::new(ApiKeyCredentials::new(&config.api_key)?);
        Self::with_parts(poster, TokioClock, credentials, &config)
    }
}

impl<P: HttpPoster, C: Clock + Clone> TelemetrySender<P, C> {
    /// Assembles a sender from explicit parts; the seam tests use to plug in
    /// scripted transports and manual clocks.
    pub fn with_parts(
        poster: Arc<P>,
        clock: C,
        credentials: Arc<dyn CredentialProvider>,
        config: &SenderConfig,
    ) -> Result<Self, TransportError> {
        let metrics = build_controller(&poster, &clock, &credentials, config, &config.metric_endpoint)?;
        let spans = build_controller(&poster, &clock, &credentials, config, &config.span_endpoint)?;
        let events = build_controller(&poster, &clock, &credentials, config, &config.event_endpoint)?;

        Ok(Self {
            metrics: Arc::new(metrics),
            spans: Arc::new(spans),
            events: Arc::new(events),
        })
    }

    pub async fn send_metric_batch(&self, batch: &MetricBatch) -> DeliveryReport {
        self.metrics.deliver(batch, &CancellationToken::new()).await
    }

    pub async fn send_metric_batch_with_cancel(
        &self,
        batch: &MetricBatch,
        cancel: &CancellationToken,
    ) -> DeliveryReport {
        self.metrics.deliver(batch, cancel).await
    }

    pub async fn send_span_batch(&self, batch: &SpanBatch) -> DeliveryReport {
        self.spans.deliver(batch, &CancellationToken::new()).await
    }

    pub async fn send_span_batch_with_cancel(
        &self,
        batch: &SpanBatch,
        cancel: &CancellationToken,
    ) -> DeliveryReport {
        self.spans.deliver(batch, cancel).await
    }

    pub async fn send_event_batch(&self, batch: &EventBatch) -> DeliveryReport {
        self.events.deliver(batch, &CancellationToken::new()).await
    }

    pub async fn send_event_batch_with_cancel(
        &self,
        batch: &EventBatch,
        cancel: &CancellationToken,
    ) -> DeliveryReport {
        self.events.deliver(batch, cancel).await
    }
}

fn build_controller<P: HttpPoster, C: Clock>(
    poster: &Arc<P>,
    clock: &C,
    credentials: &Arc<dyn CredentialProvider>,
    config: &SenderConfig,
    endpoint: &str,
) -> Result<DeliveryController<P, C>, TransportError>
where
    C: Clone,
{
    let url = endpoint.parse::<Url>().map_err(|e| {
        TransportError::InvalidConfiguration(format!("Invalid endpoint URL '{endpoint}': {e}"))
    })?;

    DeliveryController::new(
        Arc::clone(poster),
        clock.clone(),
        Arc::clone(credentials),
        DeliveryConfig {
            endpoint: url,
            user_agent: config.transport.user_agent.clone(),
            compress_payload: config.compress_payload,
            retry: config.retry.clone(),
        },
    )
}
