//! Metric snapshot types consumed by the converter.
//!
//! These are the boundary shapes a metric registry must expose per
//! reporting cycle: one value object per metric kind, each carrying the
//! fixed set of named values the converter maps to record fields, plus
//! labeled item breakdowns where the kind supports them.

use chrono::{DateTime, Utc};

use crate::Tag;

/// Rate values shared by meters and the rate half of timers.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RateValues {
    /// Total number of observed events.
    pub count: i64,
    /// Mean rate since the metric was created.
    pub mean_rate: f64,
    /// One-minute exponentially weighted rate.
    pub one_min_rate: f64,
    /// Five-minute exponentially weighted rate.
    pub five_min_rate: f64,
    /// Fifteen-minute exponentially weighted rate.
    pub fifteen_min_rate: f64,
}

/// Distribution values shared by histograms and the duration half of
/// timers.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistributionValues {
    /// The most recent observed value.
    pub last: f64,
    /// Minimum observed value.
    pub min: f64,
    /// Mean observed value.
    pub mean: f64,
    /// Maximum observed value.
    pub max: f64,
    /// Standard deviation of observed values.
    pub std_dev: f64,
    /// Median observed value.
    pub median: f64,
    /// Number of samples backing the percentiles.
    pub sample_size: i64,
    /// 75th percentile.
    pub percentile_75: f64,
    /// 95th percentile.
    pub percentile_95: f64,
    /// 98th percentile.
    pub percentile_98: f64,
    /// 99th percentile.
    pub percentile_99: f64,
    /// 99.9th percentile.
    pub percentile_999: f64,
}

/// A point-in-time gauge reading.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaugeSnapshot {
    /// Metric name.
    pub name: String,
    /// Tags local to this metric.
    pub tags: Vec<Tag>,
    /// The gauge value.
    pub value: f64,
}

/// A labeled sub-bucket inside a counter.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CounterItem {
    /// Free-form item label; may contain `key=value` pairs.
    pub label: String,
    /// Count for this item.
    pub count: i64,
    /// Share of the total count, as a percentage.
    pub percent: f64,
}

/// A counter reading with optional item breakdowns.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CounterSnapshot {
    /// Metric name.
    pub name: String,
    /// Tags local to this metric.
    pub tags: Vec<Tag>,
    /// Total count.
    pub count: i64,
    /// Labeled sub-buckets.
    pub items: Vec<CounterItem>,
}

/// A labeled sub-bucket inside a meter, with its own recomputed rates.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeterItem {
    /// Free-form item label; may contain `key=value` pairs.
    pub label: String,
    /// Share of the total count, as a percentage.
    pub percent: f64,
    /// Rates recomputed for this item.
    pub rate: RateValues,
}

/// A meter reading with optional item breakdowns.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeterSnapshot {
    /// Metric name.
    pub name: String,
    /// Tags local to this metric.
    pub tags: Vec<Tag>,
    /// Rates for the whole meter.
    pub rate: RateValues,
    /// Labeled sub-buckets.
    pub items: Vec<MeterItem>,
}

/// A histogram reading.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistogramSnapshot {
    /// Metric name.
    pub name: String,
    /// Tags local to this metric.
    pub tags: Vec<Tag>,
    /// Total number of observations.
    pub count: i64,
    /// Distribution of observed values.
    pub values: DistributionValues,
}

/// A timer reading: a rate half, a duration half, and session counters.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimerSnapshot {
    /// Metric name.
    pub name: String,
    /// Tags local to this metric.
    pub tags: Vec<Tag>,
    /// Number of sessions currently in flight.
    pub active_sessions: i64,
    /// Total recorded time.
    pub total_time: f64,
    /// The rate half.
    pub rate: RateValues,
    /// Item breakdowns for the rate half. The duration half has no
    /// separate item breakdown on the wire.
    pub rate_items: Vec<MeterItem>,
    /// The duration half.
    pub duration: DistributionValues,
}

/// The outcome of one health check.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthCheckResult {
    /// Check identifier. May embed extra `key=value` tag pairs after
    /// commas.
    pub name: String,
    /// Whether the check passed.
    pub healthy: bool,
    /// Human-readable status message.
    pub message: String,
}

impl HealthCheckResult {
    /// Create a health check result.
    pub fn new(name: impl Into<String>, healthy: bool, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            healthy,
            message: message.into(),
        }
    }
}

/// Everything a registry produced for one reporting cycle.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use fluxline_types::{GaugeSnapshot, MetricsSnapshot};
///
/// let snapshot = MetricsSnapshot::builder()
///     .timestamp(Utc::now())
///     .gauge(GaugeSnapshot {
///         name: "Queue Depth".to_string(),
///         value: 17.0,
///         ..Default::default()
///     })
///     .build();
///
/// assert_eq!(snapshot.gauges.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsSnapshot {
    /// When the snapshot was taken. Every record produced from this
    /// snapshot carries this timestamp.
    pub timestamp: DateTime<Utc>,
    /// Gauge readings.
    pub gauges: Vec<GaugeSnapshot>,
    /// Counter readings.
    pub counters: Vec<CounterSnapshot>,
    /// Meter readings.
    pub meters: Vec<MeterSnapshot>,
    /// Histogram readings.
    pub histograms: Vec<HistogramSnapshot>,
    /// Timer readings.
    pub timers: Vec<TimerSnapshot>,
    /// Health check outcomes.
    pub health: Vec<HealthCheckResult>,
}

impl MetricsSnapshot {
    /// Create an empty snapshot taken now.
    pub fn new() -> Self {
        Self::with_timestamp(Utc::now())
    }

    /// Create an empty snapshot with a specific timestamp.
    pub fn with_timestamp(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            gauges: Vec::new(),
            counters: Vec::new(),
            meters: Vec::new(),
            histograms: Vec::new(),
            timers: Vec::new(),
            health: Vec::new(),
        }
    }

    /// Create a builder for constructing snapshots.
    pub fn builder() -> MetricsSnapshotBuilder {
        MetricsSnapshotBuilder::default()
    }

    /// Whether the snapshot carries no metrics at all.
    pub fn is_empty(&self) -> bool {
        self.gauges.is_empty()
            && self.counters.is_empty()
            && self.meters.is_empty()
            && self.histograms.is_empty()
            && self.timers.is_empty()
            && self.health.is_empty()
    }
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`MetricsSnapshot`].
#[derive(Debug, Default)]
pub struct MetricsSnapshotBuilder {
    timestamp: Option<DateTime<Utc>>,
    gauges: Vec<GaugeSnapshot>,
    counters: Vec<CounterSnapshot>,
    meters: Vec<MeterSnapshot>,
    histograms: Vec<HistogramSnapshot>,
    timers: Vec<TimerSnapshot>,
    health: Vec<HealthCheckResult>,
}

impl MetricsSnapshotBuilder {
    /// Set the snapshot timestamp. Defaults to now.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Add a gauge reading.
    pub fn gauge(mut self, gauge: GaugeSnapshot) -> Self {
        self.gauges.push(gauge);
        self
    }

    /// Add a counter reading.
    pub fn counter(mut self, counter: CounterSnapshot) -> Self {
        self.counters.push(counter);
        self
    }

    /// Add a meter reading.
    pub fn meter(mut self, meter: MeterSnapshot) -> Self {
        self.meters.push(meter);
        self
    }

    /// Add a histogram reading.
    pub fn histogram(mut self, histogram: HistogramSnapshot) -> Self {
        self.histograms.push(histogram);
        self
    }

    /// Add a timer reading.
    pub fn timer(mut self, timer: TimerSnapshot) -> Self {
        self.timers.push(timer);
        self
    }

    /// Add a health check outcome.
    pub fn health_check(mut self, result: HealthCheckResult) -> Self {
        self.health.push(result);
        self
    }

    /// Build the snapshot.
    pub fn build(self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            gauges: self.gauges,
            counters: self.counters,
            meters: self.meters,
            histograms: self.histograms,
            timers: self.timers,
            health: self.health,
        }
    }
}
