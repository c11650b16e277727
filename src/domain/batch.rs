use super::{Attributes, Event, Metric, Span};
use crate::encoder::{self, EncodingError};
use bytes::Bytes;
use uuid::Uuid;

/// The three wire shapes a batch can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryKind {
    Metrics,
    Spans,
    Events,
}

impl TelemetryKind {
    /// Key of the kind-specific telemetry array in the wire envelope.
    pub fn block_key(self) -> &'static str {
        match self {
            Self::Metrics => "metrics",
            Self::Spans => "spans",
            Self::Events => "events",
        }
    }
}

/// Behavior shared by the three batch shapes.
///
/// Batches are immutable once constructed: the delivery pipeline only ever
/// reads them, and a retried send re-encodes the very same batch. `split`
/// produces two independent halves for oversized-payload handling; the
/// halves clone the common block and get fresh ids.
pub trait TelemetryBatch: Clone + Send + Sync {
    fn kind(&self) -> TelemetryKind;

    /// Correlation id for logs. Not part of the wire payload.
    fn batch_id(&self) -> &str;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders the full wire payload for this batch.
    fn encode(&self) -> Result<Bytes, EncodingError>;

    /// Divides the batch into two halves by entity count, first half
    /// `len() / 2` entities. Callers must not split a batch of fewer than
    /// two entities.
    fn split(&self) -> (Self, Self);
}

fn split_entities<T: Clone>(entities: &[T]) -> (Vec<T>, Vec<T>) {
    let mid = entities.len() / 2;
    (entities[..mid].to_vec(), entities[mid..].to_vec())
}

fn new_batch_id() -> String {
    Uuid::new_v4().to_string()
}

/// An immutable group of metrics plus batch-level common attributes.
#[derive(Debug, Clone)]
pub struct MetricBatch {
    id: String,
    metrics: Vec<Metric>,
    common_attributes: Attributes,
}

impl MetricBatch {
    pub fn new(metrics: Vec<Metric>, common_attributes: Attributes) -> Self {
        Self {
            id: new_batch_id(),
            metrics,
            common_attributes,
        }
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn common_attributes(&self) -> &Attributes {
        &self.common_attributes
    }
}

impl TelemetryBatch for MetricBatch {
    fn kind(&self) -> TelemetryKind {
        TelemetryKind::Metrics
    }

    fn batch_id(&self) -> &str {
        &self.id
    }

    fn len(&self) -> usize {
        self.metrics.len()
    }

    fn encode(&self) -> Result<Bytes, EncodingError> {
        encoder::encode_metric_batch(self)
    }

    fn split(&self) -> (Self, Self) {
        let (left, right) = split_entities(&self.metrics);
        (
            Self::new(left, self.common_attributes.clone()),
            Self::new(right, self.common_attributes.clone()),
        )
    }
}

/// An immutable group of spans, with common attributes and an optional
/// batch-wide trace id applied to spans that omit their own.
#[derive(Debug, Clone)]
pub struct SpanBatch {
    id: String,
    spans: Vec<Span>,
    common_attributes: Attributes,
    trace_id: Option<String>,
}

impl SpanBatch {
    pub fn new(spans: Vec<Span>, common_attributes: Attributes) -> Self {
        Self {
            id: new_batch_id(),
            spans,
            common_attributes,
            trace_id: None,
        }
    }

    pub fn with_trace_id(
        spans: Vec<Span>,
        common_attributes: Attributes,
        trace_id: impl Into<String>,
    ) -> Self {
        Self {
            id: new_batch_id(),
            spans,
            common_attributes,
            trace_id: Some(trace_id.into()),
        }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn common_attributes(&self) -> &Attributes {
        &self.common_attributes
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }
}

impl TelemetryBatch for SpanBatch {
    fn kind(&self) -> TelemetryKind {
        TelemetryKind::Spans
    }

    fn batch_id(&self) -> &str {
        &self.id
    }

    fn len(&self) -> usize {
        self.spans.len()
    }

    fn encode(&self) -> Result<Bytes, EncodingError> {
        encoder::encode_span_batch(self)
    }

    fn split(&self) -> (Self, Self) {
        let (left, right) = split_entities(&self.spans);
        let make = |spans: Vec<Span>| Self {
            id: new_batch_id(),
            spans,
            common_attributes: self.common_attributes.clone(),
            trace_id: self.trace_id.clone(),
        };
        (make(left), make(right))
    }
}

/// An immutable group of events plus batch-level common attributes.
#[derive(Debug, Clone)]
pub struct EventBatch {
    id: String,
    events: Vec<Event>,
    common_attributes: Attributes,
}

impl EventBatch {
    pub fn new(events: Vec<Event>, common_attributes: Attributes) -> Self {
        Self {
            id: new_batch_id(),
            events,
            common_attributes,
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn common_attributes(&self) -> &Attributes {
        &self.common_attributes
    }
}

impl TelemetryBatch for EventBatch {
    fn kind(&self) -> TelemetryKind {
        TelemetryKind::Events
    }

    fn batch_id(&self) -> &str {
        &self.id
    }

    fn len(&self) -> usize {
        self.events.len()
    }

    fn encode(&self) -> Result<Bytes, EncodingError> {
        encoder::encode_event_batch(self)
    }

    fn split(&self) -> (Self, Self) {
        let (left, right) = split_entities(&self.events);
        (
            Self::new(left, self.common_attributes.clone()),
            Self::new(right, self.common_attributes.clone()),
        )
    }
}
