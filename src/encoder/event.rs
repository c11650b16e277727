use super::EncodingError;
use crate::domain::Event;

/// Appends one event object. Key order: `eventType`, `timestamp`,
/// `attributes` (always present, `{}` when empty).
pub(crate) fn write_event(buf: &mut Vec<u8>, event: &Event) -> Result<(), EncodingError> {
    if event.event_type.is_empty() {
        return Err(EncodingError::EmptyEventType);
    }
    buf.extend_from_slice(b"{\"eventType\":");
    serde_json::to_writer(&mut *buf, &event.event_type)?;
    buf.extend_from_slice(b",\"timestamp\":");
    serde_json::to_writer(&mut *buf, &event.timestamp)?;
    buf.extend_from_slice(b",\"attributes\":");
    serde_json::to_writer(&mut *buf, &event.attributes)?;
    buf.push(b'}');
    Ok(())
}
