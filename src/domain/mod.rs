pub mod attributes;
pub mod batch;
pub mod event;
pub mod metric;
pub mod span;

pub use attributes::{AttributeValue, Attributes};
pub use batch::{EventBatch, MetricBatch, SpanBatch, TelemetryBatch, TelemetryKind};
pub use event::Event;
pub use metric::Metric;
pub use span::Span;
