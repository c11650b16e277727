#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use reqwest::header::HeaderMap;
use telemetry_sender::domain::{Attributes, Metric, MetricBatch, Span, SpanBatch};
use telemetry_sender::reliability::{Clock, RetryConfig, RetryStrategy};
use telemetry_sender::sender::{
    ApiKeyCredentials, DeliveryConfig, DeliveryController, HttpPoster, HttpResponse, PostRequest,
    TransportError,
};

pub const TEST_API_KEY: &str = "test-key";

/// Transport fake that replays a script of responses and records every
/// request it receives.
#[derive(Clone)]
pub struct ScriptedPoster {
    inner: Arc<ScriptedInner>,
}

struct ScriptedInner {
    replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    fallback_status: Option<u16>,
    requests: Mutex<Vec<PostRequest>>,
}

impl ScriptedPoster {
    pub fn new(replies: Vec<Result<HttpResponse, TransportError>>) -> Self {
        Self {
            inner: Arc::new(ScriptedInner {
                replies: Mutex::new(replies.into()),
                fallback_status: None,
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Replays the script, then keeps answering with `status` forever.
    pub fn with_fallback(replies: Vec<Result<HttpResponse, TransportError>>, status: u16) -> Self {
        Self {
            inner: Arc::new(ScriptedInner {
                replies: Mutex::new(replies.into()),
                fallback_status: Some(status),
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn requests(&self) -> Vec<PostRequest> {
        self.inner.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.inner.requests.lock().unwrap().len()
    }
}

impl HttpPoster for ScriptedPoster {
    async fn post(&self, request: PostRequest) -> Result<HttpResponse, TransportError> {
        self.inner.requests.lock().unwrap().push(request);
        let next = self.inner.replies.lock().unwrap().pop_front();
        match next {
            Some(reply) => reply,
            None => match self.inner.fallback_status {
                Some(status) => Ok(response(status)),
                None => panic!("scripted poster ran out of replies"),
            },
        }
    }
}

/// Clock whose sleeps return immediately while advancing virtual time, so
/// backoff-heavy scenarios run instantly and elapsed-time budgets are
/// observable.
#[derive(Clone)]
pub struct ManualClock {
    inner: Arc<ManualClockInner>,
}

struct ManualClockInner {
    now: Mutex<Instant>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ManualClockInner {
                now: Mutex::new(Instant::now()),
                sleeps: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.inner.sleeps.lock().unwrap().clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.inner.now.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        *self.inner.now.lock().unwrap() += duration;
        self.inner.sleeps.lock().unwrap().push(duration);
        std::future::ready(())
    }
}

/// Clock whose sleeps never complete; for exercising cancellation during a
/// backoff wait.
#[derive(Clone)]
pub struct PendingClock;

impl Clock for PendingClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, _duration: Duration) -> impl Future<Output = ()> + Send {
        std::future::pending()
    }
}

pub fn response(status: u16) -> HttpResponse {
    HttpResponse {
        status,
        status_text: String::new(),
        body: String::new(),
        headers: HeaderMap::new(),
    }
}

pub fn ok(status: u16) -> Result<HttpResponse, TransportError> {
    Ok(response(status))
}

pub fn connection_reset() -> Result<HttpResponse, TransportError> {
    Err(TransportError::ConnectionFailed(
        "connection reset by peer".to_string(),
    ))
}

/// Retry config with predictable delays: no jitter, generous budgets.
pub fn no_jitter_retry(base_ms: u64, max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        base_delay: Duration::from_millis(base_ms),
        max_delay: Duration::from_secs(60),
        max_elapsed: Duration::from_secs(3600),
        strategy: RetryStrategy::ExponentialBackoff,
        jitter: false,
    }
}

pub fn make_controller<C: Clock>(
    poster: &ScriptedPoster,
    clock: C,
    retry: RetryConfig,
) -> DeliveryController<ScriptedPoster, C> {
    make_controller_with(poster, clock, retry, false)
}

pub fn make_controller_with<C: Clock>(
    poster: &ScriptedPoster,
    clock: C,
    retry: RetryConfig,
    compress_payload: bool,
) -> DeliveryController<ScriptedPoster, C> {
    DeliveryController::new(
        Arc::new(poster.clone()),
        clock,
        Arc::new(ApiKeyCredentials::new(TEST_API_KEY).unwrap()),
        DeliveryConfig {
            endpoint: "http://localhost:9610/metric/v1".parse().unwrap(),
            user_agent: "telemetry-sender-tests/1.0".to_string(),
            compress_payload,
            retry,
        },
    )
    .unwrap()
}

pub fn gauge(name: &str, value: f64, timestamp: u64) -> Metric {
    Metric::gauge(name, value, timestamp, Attributes::new())
}

/// Batch of `count` gauges named `m0..m{count-1}`.
pub fn metric_batch_of(count: usize) -> MetricBatch {
    let metrics = (0..count)
        .map(|i| gauge(&format!("m{i}"), i as f64, 1000 + i as u64))
        .collect();
    MetricBatch::new(metrics, Attributes::new())
}

pub fn span_batch_of(count: usize) -> SpanBatch {
    let spans = (0..count)
        .map(|i| Span::new(format!("span-{i}"), "op", 1000 + i as u64, 5.0).with_trace_id("trace-1"))
        .collect();
    SpanBatch::new(spans, Attributes::new())
}

/// Names of the metrics inside an encoded request body, for split-identity
/// assertions.
pub fn metric_names(request: &PostRequest) -> Vec<String> {
    let value: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    value["metrics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["name"].as_str().unwrap().to_string())
        .collect()
}
