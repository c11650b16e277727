use super::Attributes;

/// One operation within a distributed trace.
///
/// `trace_id` may be left unset when the enclosing batch carries a shared
/// trace id; encoding fails if neither is present. `timestamp` is the span
/// start in epoch milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub id: String,
    pub trace_id: Option<String>,
    pub parent_id: Option<String>,
    pub name: String,
    pub timestamp: u64,
    pub duration_ms: f64,
    pub attributes: Attributes,
}

impl Span {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        timestamp: u64,
        duration_ms: f64,
    ) -> Self {
        Self {
            id: id.into(),
            trace_id: None,
            parent_id: None,
            name: name.into(),
            timestamp,
            duration_ms,
            attributes: Attributes::new(),
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_parent_id(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }
}
