use super::{EncodingError, ensure_finite};
use crate::domain::{Attributes, Metric};

/// Appends one metric object. Key order: `name`, `type`, `value`,
/// `timestamp`, `interval.ms` (count/summary only, when set), `attributes`
/// (omitted when empty).
pub(crate) fn write_metric(buf: &mut Vec<u8>, metric: &Metric) -> Result<(), EncodingError> {
    if metric.name().is_empty() {
        return Err(EncodingError::EmptyMetricName);
    }
    match metric {
        Metric::Count {
            name,
            value,
            timestamp,
            interval_ms,
            attributes,
        } => {
            ensure_finite(name, *value)?;
            write_head(buf, name, "count")?;
            buf.extend_from_slice(b",\"value\":");
            serde_json::to_writer(&mut *buf, value)?;
            write_tail(buf, *timestamp, *interval_ms, attributes)
        }
        Metric::Gauge {
            name,
            value,
            timestamp,
            attributes,
        } => {
            ensure_finite(name, *value)?;
            write_head(buf, name, "gauge")?;
            buf.extend_from_slice(b",\"value\":");
            serde_json::to_writer(&mut *buf, value)?;
            write_tail(buf, *timestamp, None, attributes)
        }
        Metric::Summary {
            name,
            count,
            sum,
            min,
            max,
            timestamp,
            interval_ms,
            attributes,
        } => {
            ensure_finite(name, *sum)?;
            ensure_finite(name, *min)?;
            ensure_finite(name, *max)?;
            write_head(buf, name, "summary")?;
            buf.extend_from_slice(b",\"value\":{\"count\":");
            serde_json::to_writer(&mut *buf, count)?;
            buf.extend_from_slice(b",\"sum\":");
            serde_json::to_writer(&mut *buf, sum)?;
            buf.extend_from_slice(b",\"min\":");
            serde_json::to_writer(&mut *buf, min)?;
            buf.extend_from_slice(b",\"max\":");
            serde_json::to_writer(&mut *buf, max)?;
            buf.push(b'}');
            write_tail(buf, *timestamp, *interval_ms, attributes)
        }
    }
}

fn write_head(buf: &mut Vec<u8>, name: &str, kind: &str) -> Result<(), EncodingError> {
    buf.extend_from_slice(b"{\"name\":");
    serde_json::to_writer(&mut *buf, name)?;
    buf.extend_from_slice(b",\"type\":\"");
    buf.extend_from_slice(kind.as_bytes());
    buf.push(b'"');
    Ok(())
}

fn write_tail(
    buf: &mut Vec<u8>,
    timestamp: u64,
    interval_ms: Option<u64>,
    attributes: &Attributes,
) -> Result<(), EncodingError> {
    buf.extend_from_slice(b",\"timestamp\":");
    serde_json::to_writer(&mut *buf, &timestamp)?;
    if let Some(interval) = interval_ms {
        buf.extend_from_slice(b",\"interval.ms\":");
        serde_json::to_writer(&mut *buf, &interval)?;
    }
    if !attributes.is_empty() {
        buf.extend_from_slice(b",\"attributes\":");
        serde_json::to_writer(&mut *buf, attributes)?;
    }
    buf.push(b'}');
    Ok(())
}
