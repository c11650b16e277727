use super::Attributes;

/// A single metric observation.
///
/// Timestamps are epoch milliseconds. Count and Summary may carry an
/// aggregation interval; storing it as `u64` millis keeps the non-negative
/// invariant in the type. Name validity is checked at encode time so a bad
/// entity surfaces as a terminal bad-payload failure rather than a panic.
#[derive(Debug, Clone, PartialEq)]
pub enum Metric {
    /// A monotonically accumulated delta over an interval.
    Count {
        name: String,
        value: f64,
        timestamp: u64,
        interval_ms: Option<u64>,
        attributes: Attributes,
    },
    /// A point-in-time scalar reading.
    Gauge {
        name: String,
        value: f64,
        timestamp: u64,
        attributes: Attributes,
    },
    /// Pre-aggregated statistics over an interval.
    Summary {
        name: String,
        count: u64,
        sum: f64,
        min: f64,
        max: f64,
        timestamp: u64,
        interval_ms: Option<u64>,
        attributes: Attributes,
    },
}

impl Metric {
    pub fn count(name: impl Into<String>, value: f64, timestamp: u64, attributes: Attributes) -> Self {
        Self::Count {
            name: name.into(),
            value,
            timestamp,
            interval_ms: None,
            attributes,
        }
    }

    pub fn gauge(name: impl Into<String>, value: f64, timestamp: u64, attributes: Attributes) -> Self {
        Self::Gauge {
            name: name.into(),
            value,
            timestamp,
            attributes,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn summary(
        name: impl Into<String>,
        count: u64,
        sum: f64,
        min: f64,
        max: f64,
        timestamp: u64,
        attributes: Attributes,
    ) -> Self {
        Self::Summary {
            name: name.into(),
            count,
            sum,
            min,
            max,
            timestamp,
            interval_ms: None,
            attributes,
        }
    }

    /// Sets the aggregation interval. A no-op for gauges, which are
    /// instantaneous by definition.
    pub fn with_interval_ms(mut self, interval: u64) -> Self {
        match &mut self {
            Self::Count { interval_ms, .. } | Self::Summary { interval_ms, .. } => {
                *interval_ms = Some(interval);
            }
            Self::Gauge { .. } => {}
        }
        self
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Count { name, .. } | Self::Gauge { name, .. } | Self::Summary { name, .. } => name,
        }
    }

    pub fn timestamp(&self) -> u64 {
        match self {
            Self::Count { timestamp, .. }
            | Self::Gauge { timestamp, .. }
            | Self::Summary { timestamp, .. } => *timestamp,
        }
    }

    pub fn attributes(&self) -> &Attributes {
        match self {
            Self::Count { attributes, .. }
            | Self::Gauge { attributes, .. }
            | Self::Summary { attributes, .. } => attributes,
        }
    }
}
