//! Pure JSON encoding of telemetry batches.
//!
//! The wire envelope is a single JSON object: an optional `"common"` block
//! (shared context first, then hoisted batch attributes) followed by the
//! kind-keyed telemetry array. Key order is fixed; encoding the same batch
//! twice yields identical bytes.

mod event;
mod metric;
mod span;

use crate::domain::{Attributes, EventBatch, MetricBatch, SpanBatch};
use bytes::Bytes;
use thiserror::Error;

// Rough payload sizing, same approach as a preallocated serialization buffer
// with a fixed per-entry estimate.
const ESTIMATED_ENTITY_SIZE: usize = 256;
const ENVELOPE_OVERHEAD: usize = 128;

/// Entity or batch data violates a wire-format invariant. Terminal: the
/// delivery pipeline reports this as a bad payload and never retries it.
#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error during serialization: {0}")]
    Io(#[from] std::io::Error),
    #[error("metric name must not be empty")]
    EmptyMetricName,
    #[error("metric {name} has a non-finite value")]
    NonFiniteValue { name: String },
    #[error("span id must not be empty")]
    EmptySpanId,
    #[error("span {id} has no trace id and the batch provides none")]
    MissingTraceId { id: String },
    #[error("span {id} is its own parent")]
    SelfParent { id: String },
    #[error("event type must not be empty")]
    EmptyEventType,
}

pub fn encode_metric_batch(batch: &MetricBatch) -> Result<Bytes, EncodingError> {
    let mut buf = payload_buffer(batch.metrics().len());
    buf.push(b'{');
    if write_common_block(&mut buf, None, batch.common_attributes())? {
        buf.push(b',');
    }
    buf.extend_from_slice(b"\"metrics\":[");
    for (index, entry) in batch.metrics().iter().enumerate() {
        if index > 0 {
            buf.push(b',');
        }
        metric::write_metric(&mut buf, entry)?;
    }
    buf.extend_from_slice(b"]}");
    Ok(Bytes::from(buf))
}

pub fn encode_span_batch(batch: &SpanBatch) -> Result<Bytes, EncodingError> {
    // An empty shared trace id hoists nothing.
    let shared_trace_id = batch.trace_id().filter(|id| !id.is_empty());

    let mut buf = payload_buffer(batch.spans().len());
    buf.push(b'{');
    if write_common_block(&mut buf, shared_trace_id, batch.common_attributes())? {
        buf.push(b',');
    }
    buf.extend_from_slice(b"\"spans\":[");
    for (index, entry) in batch.spans().iter().enumerate() {
        if index > 0 {
            buf.push(b',');
        }
        span::write_span(&mut buf, entry, shared_trace_id)?;
    }
    buf.extend_from_slice(b"]}");
    Ok(Bytes::from(buf))
}

pub fn encode_event_batch(batch: &EventBatch) -> Result<Bytes, EncodingError> {
    let mut buf = payload_buffer(batch.events().len());
    buf.push(b'{');
    if write_common_block(&mut buf, None, batch.common_attributes())? {
        buf.push(b',');
    }
    buf.extend_from_slice(b"\"events\":[");
    for (index, entry) in batch.events().iter().enumerate() {
        if index > 0 {
            buf.push(b',');
        }
        event::write_event(&mut buf, entry)?;
    }
    buf.extend_from_slice(b"]}");
    Ok(Bytes::from(buf))
}

/// Writes the `"common"` block: shared context first, then the hoisted
/// attributes, a comma only when both are present. Returns whether anything
/// was written; with no shared context and empty attributes the key is
/// omitted entirely.
fn write_common_block(
    buf: &mut Vec<u8>,
    trace_id: Option<&str>,
    attributes: &Attributes,
) -> Result<bool, EncodingError> {
    if trace_id.is_none() && attributes.is_empty() {
        return Ok(false);
    }
    buf.extend_from_slice(b"\"common\":{");
    if let Some(id) = trace_id {
        buf.extend_from_slice(b"\"traceId\":");
        serde_json::to_writer(&mut *buf, id)?;
    }
    if !attributes.is_empty() {
        if trace_id.is_some() {
            buf.push(b',');
        }
        buf.extend_from_slice(b"\"attributes\":");
        serde_json::to_writer(&mut *buf, attributes)?;
    }
    buf.push(b'}');
    Ok(true)
}

fn payload_buffer(entity_count: usize) -> Vec<u8> {
    let estimated = entity_count
        .saturating_mul(ESTIMATED_ENTITY_SIZE)
        .saturating_add(ENVELOPE_OVERHEAD);
    Vec::with_capacity(estimated)
}

fn ensure_finite(name: &str, value: f64) -> Result<(), EncodingError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EncodingError::NonFiniteValue {
            name: name.to_string(),
        })
    }
}
