use super::CredentialProvider;
use super::client::{HttpPoster, HttpResponse, PostRequest, TransportError};
use super::response::{Disposition, classify};
use crate::domain::TelemetryBatch;
use crate::encoder::EncodingError;
use crate::reliability::{Clock, RetryConfig, RetryPolicy};
use bytes::Bytes;
use flate2::{Compression, write::GzEncoder};
use reqwest::header::{CONTENT_ENCODING, HeaderMap, HeaderValue, USER_AGENT};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Transient cause retained when the retry budget runs out.
#[derive(Error, Debug)]
pub enum RetryCause {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("rate limited: HTTP 429")]
    RateLimited { response: HttpResponse },
    #[error("server error: HTTP {}", .response.status)]
    ServerError { response: HttpResponse },
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The batch violates a wire-format invariant. Never retried.
    #[error("bad payload: {0}")]
    Encoding(#[from] EncodingError),
    /// Malformed or unauthorized request (400/401/403/404/405).
    #[error("request rejected: HTTP {}", .response.status)]
    Rejected { response: HttpResponse },
    /// 413 on a single-entity batch, which cannot be split further.
    #[error("payload too large and the batch cannot be split further")]
    Oversized { response: HttpResponse },
    /// A status outside the protocol's tables.
    #[error("unexpected response: HTTP {}", .response.status)]
    UnexpectedResponse { response: HttpResponse },
    /// Attempt or elapsed-time budget exhausted; wraps the last cause.
    #[error("retries exhausted after {attempts} attempts")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        cause: RetryCause,
    },
    /// The caller canceled the send.
    #[error("send canceled")]
    Canceled,
}

/// Terminal outcome for one (sub-)batch.
#[derive(Debug)]
pub struct BatchResult {
    pub entity_count: usize,
    pub outcome: Result<HttpResponse, DeliveryError>,
}

/// Everything the pipeline decided about one submitted batch: exactly one
/// entry unless oversized payloads forced splits, in which case each
/// sub-batch is tracked independently and appears in entity order.
#[derive(Debug)]
pub struct DeliveryReport {
    pub results: Vec<BatchResult>,
}

impl DeliveryReport {
    pub fn is_complete_success(&self) -> bool {
        self.results.iter().all(|result| result.outcome.is_ok())
    }

    pub fn was_split(&self) -> bool {
        self.results.len() > 1
    }

    pub fn first_error(&self) -> Option<&DeliveryError> {
        self.results
            .iter()
            .find_map(|result| result.outcome.as_ref().err())
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    pub endpoint: Url,
    pub user_agent: String,
    pub compress_payload: bool,
    pub retry: RetryConfig,
}

enum SubOutcome {
    Terminal(Result<HttpResponse, DeliveryError>),
    Split,
}

/// Orchestrates encode → send → classify → retry/backoff → split.
///
/// All retry state is local to a single `deliver` call, so one controller
/// can serve concurrent sends without locking; the shared poster is
/// internally synchronized.
pub struct DeliveryController<P, C> {
    poster: Arc<P>,
    clock: C,
    credentials: Arc<dyn CredentialProvider>,
    policy: RetryPolicy,
    endpoint: Url,
    user_agent: HeaderValue,
    compress_payload: bool,
}

impl<P: HttpPoster, C: Clock> DeliveryController<P, C> {
    pub fn new(
        poster: Arc<P>,
        clock: C,
        credentials: Arc<dyn CredentialProvider>,
        config: DeliveryConfig,
    ) -> Result<Self, TransportError> {
        let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|e| {
            TransportError::InvalidConfiguration(format!("Invalid user agent: {e}"))
        })?;

        Ok(Self {
            poster,
            clock,
            credentials,
            policy: RetryPolicy::new(config.retry),
            endpoint: config.endpoint,
            user_agent,
            compress_payload: config.compress_payload,
        })
    }

    /// Sends one batch through the pipeline, splitting on oversized
    /// payloads. Sub-sends are strictly sequential, depth-first in entity
    /// order.
    pub async fn deliver<B: TelemetryBatch>(
        &self,
        batch: &B,
        cancel: &CancellationToken,
    ) -> DeliveryReport {
        if batch.is_empty() {
            debug!(
                batch_id = batch.batch_id(),
                kind = batch.kind().block_key(),
                "ignoring empty batch"
            );
            return DeliveryReport {
                results: vec![BatchResult {
                    entity_count: 0,
                    outcome: Ok(empty_batch_response()),
                }],
            };
        }

        let mut queue = VecDeque::new();
        queue.push_back(batch.clone());
        let mut results = Vec::new();

        while let Some(current) = queue.pop_front() {
            match self.deliver_one(&current, cancel).await {
                SubOutcome::Terminal(outcome) => results.push(BatchResult {
                    entity_count: current.len(),
                    outcome,
                }),
                SubOutcome::Split => {
                    let (left, right) = current.split();
                    info!(
                        batch_id = current.batch_id(),
                        left = left.len(),
                        right = right.len(),
                        "payload too large, splitting batch"
                    );
                    queue.push_front(right);
                    queue.push_front(left);
                }
            }
        }

        DeliveryReport { results }
    }

    async fn deliver_one<B: TelemetryBatch>(
        &self,
        batch: &B,
        cancel: &CancellationToken,
    ) -> SubOutcome {
        let batch_id = batch.batch_id();
        let kind = batch.kind().block_key();

        // ENCODING
        let payload = match batch.encode() {
            Ok(payload) => payload,
            Err(error) => {
                warn!(batch_id, kind, %error, "encoding failed");
                return SubOutcome::Terminal(Err(DeliveryError::Encoding(error)));
            }
        };
        let body = if self.compress_payload {
            match gzip(&payload) {
                Ok(compressed) => compressed,
                Err(error) => {
                    warn!(batch_id, kind, %error, "payload compression failed");
                    return SubOutcome::Terminal(Err(DeliveryError::Encoding(error.into())));
                }
            }
        } else {
            payload
        };

        // Retries resend these exact bytes; only a split re-encodes.
        let started = self.clock.now();
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return SubOutcome::Terminal(Err(DeliveryError::Canceled));
            }

            attempt += 1;
            let request = PostRequest {
                url: self.endpoint.clone(),
                headers: self.request_headers(),
                body: body.clone(),
                media_type: JSON_MEDIA_TYPE.to_string(),
            };

            // SENDING; dropping the in-flight request aborts it.
            let post_result = tokio::select! {
                () = cancel.cancelled() => {
                    return SubOutcome::Terminal(Err(DeliveryError::Canceled));
                }
                result = self.poster.post(request) => result,
            };
            let cause = match post_result {
                Err(transport_error) => {
                    warn!(batch_id, kind, attempt, %transport_error, "transport failure");
                    RetryCause::Transport(transport_error)
                }
                Ok(response) => match classify(response.status) {
                    Disposition::Success => {
                        info!(
                            batch_id,
                            kind,
                            status = response.status,
                            attempts = attempt,
                            bytes = body.len(),
                            "batch delivered"
                        );
                        return SubOutcome::Terminal(Ok(response));
                    }
                    Disposition::Rejected => {
                        warn!(batch_id, kind, status = response.status, "batch rejected");
                        return SubOutcome::Terminal(Err(DeliveryError::Rejected { response }));
                    }
                    Disposition::Unexpected => {
                        warn!(
                            batch_id,
                            kind,
                            status = response.status,
                            "unexpected response status"
                        );
                        return SubOutcome::Terminal(Err(DeliveryError::UnexpectedResponse {
                            response,
                        }));
                    }
                    Disposition::Split => {
                        if batch.len() > 1 {
                            return SubOutcome::Split;
                        }
                        warn!(batch_id, kind, "single-entity batch rejected as oversized");
                        return SubOutcome::Terminal(Err(DeliveryError::Oversized { response }));
                    }
                    Disposition::Retry => {
                        warn!(
                            batch_id,
                            kind,
                            status = response.status,
                            attempt,
                            "transient backend failure"
                        );
                        if response.status == 429 {
                            RetryCause::RateLimited { response }
                        } else {
                            RetryCause::ServerError { response }
                        }
                    }
                },
            };

            // RETRYING
            let elapsed = self.clock.now().duration_since(started);
            let config = self.policy.config();
            if attempt >= config.max_attempts || elapsed >= config.max_elapsed {
                warn!(batch_id, kind, attempts = attempt, "retry budget exhausted");
                return SubOutcome::Terminal(Err(DeliveryError::RetriesExhausted {
                    attempts: attempt,
                    cause,
                }));
            }

            let delay = self.policy.delay_for(attempt - 1);
            debug!(batch_id, kind, ?delay, attempt, "backing off before retry");
            tokio::select! {
                () = cancel.cancelled() => {
                    return SubOutcome::Terminal(Err(DeliveryError::Canceled));
                }
                () = self.clock.sleep(delay) => {}
            }
        }
    }

    fn request_headers(&self) -> HeaderMap {
        let mut headers = self.credentials.auth_headers();
        headers.insert(USER_AGENT, self.user_agent.clone());
        if self.compress_payload {
            headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        }
        headers
    }
}

/// Sending an empty batch is a legal no-op; the caller gets a synthetic
/// accepted response without a network round trip.
fn empty_batch_response() -> HttpResponse {
    HttpResponse {
        status: 202,
        status_text: "Ignored".to_string(),
        body: "empty batch".to_string(),
        headers: HeaderMap::new(),
    }
}

fn gzip(payload: &[u8]) -> std::io::Result<Bytes> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(payload)?;
    Ok(Bytes::from(encoder.finish()?))
}
