use super::{EncodingError, ensure_finite};
use crate::domain::Span;

/// Appends one span object. Key order: `id`, `trace.id` (own id only; spans
/// covered by the batch-shared trace id omit it), `parent.id`, `name`,
/// `timestamp`, `duration.ms`, `attributes` (always present, `{}` when
/// empty).
pub(crate) fn write_span(
    buf: &mut Vec<u8>,
    span: &Span,
    shared_trace_id: Option<&str>,
) -> Result<(), EncodingError> {
    if span.id.is_empty() {
        return Err(EncodingError::EmptySpanId);
    }
    let own_trace_id = span.trace_id.as_deref().filter(|id| !id.is_empty());
    if own_trace_id.is_none() && shared_trace_id.is_none() {
        return Err(EncodingError::MissingTraceId {
            id: span.id.clone(),
        });
    }
    if span.parent_id.as_deref() == Some(span.id.as_str()) {
        return Err(EncodingError::SelfParent {
            id: span.id.clone(),
        });
    }
    ensure_finite(&span.name, span.duration_ms)?;

    buf.extend_from_slice(b"{\"id\":");
    serde_json::to_writer(&mut *buf, &span.id)?;
    if let Some(trace_id) = own_trace_id {
        buf.extend_from_slice(b",\"trace.id\":");
        serde_json::to_writer(&mut *buf, trace_id)?;
    }
    if let Some(parent_id) = &span.parent_id {
        buf.extend_from_slice(b",\"parent.id\":");
        serde_json::to_writer(&mut *buf, parent_id)?;
    }
    buf.extend_from_slice(b",\"name\":");
    serde_json::to_writer(&mut *buf, &span.name)?;
    buf.extend_from_slice(b",\"timestamp\":");
    serde_json::to_writer(&mut *buf, &span.timestamp)?;
    buf.extend_from_slice(b",\"duration.ms\":");
    serde_json::to_writer(&mut *buf, &span.duration_ms)?;
    buf.extend_from_slice(b",\"attributes\":");
    serde_json::to_writer(&mut *buf, &span.attributes)?;
    buf.push(b'}');
    Ok(())
}
